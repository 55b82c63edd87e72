//! Scripted search backend for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chess::{convert_cozy_castling_to_uci, parse_uci_move, Game, Move};
use engine::{AnalysisResult, EngineError, Score, SearchBackend};
use tokio::sync::Semaphore;

/// Backend that answers from a script instead of a real engine.
///
/// Moves come from a queue of UCI strings and fall back to the first legal
/// move. Every call is counted, and the number of calls running at once is
/// tracked per operation so tests can check that coordinators never overlap
/// their own jobs.
pub struct MockBackend {
    available: bool,
    refuse_moves: bool,
    delay: Duration,
    gate: Option<Arc<Semaphore>>,
    scripted_moves: Mutex<VecDeque<Move>>,
    analyze_calls: AtomicUsize,
    best_move_calls: AtomicUsize,
    analyze_gauge: Gauge,
    best_move_gauge: Gauge,
}

#[derive(Default)]
struct Gauge {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl Gauge {
    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            available: true,
            refuse_moves: false,
            delay: Duration::ZERO,
            gate: None,
            scripted_moves: Mutex::new(VecDeque::new()),
            analyze_calls: AtomicUsize::new(0),
            best_move_calls: AtomicUsize::new(0),
            analyze_gauge: Gauge::default(),
            best_move_gauge: Gauge::default(),
        }
    }

    /// A backend whose engine never started.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Answer every move request with "no move".
    pub fn refusing_moves(mut self) -> Self {
        self.refuse_moves = true;
        self
    }

    /// Sleep this long inside every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Queue UCI moves to hand out before falling back to the first legal move.
    ///
    /// # Panics
    /// Panics on malformed notation.
    pub fn with_moves(self, moves: &[&str]) -> Self {
        {
            let mut queue = self.scripted_moves.lock().unwrap();
            for uci in moves {
                queue.push_back(parse_uci_move(uci).unwrap());
            }
        }
        self
    }

    /// Hold every call until a permit is added to the returned semaphore.
    pub fn gated(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub fn analyze_calls(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }

    pub fn best_move_calls(&self) -> usize {
        self.best_move_calls.load(Ordering::SeqCst)
    }

    /// Most `analyze` calls ever running at the same time.
    pub fn peak_concurrent_analyses(&self) -> usize {
        self.analyze_gauge.peak.load(Ordering::SeqCst)
    }

    /// Most `best_move` calls ever running at the same time.
    pub fn peak_concurrent_moves(&self) -> usize {
        self.best_move_gauge.peak.load(Ordering::SeqCst)
    }

    async fn wait_turn(&self) {
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    fn pick_move(&self, fen: &str) -> Option<Move> {
        if let Some(mv) = self.scripted_moves.lock().unwrap().pop_front() {
            return Some(mv);
        }
        let game = Game::from_fen(fen).ok()?;
        let mv = game.legal_moves().into_iter().next()?;
        Some(convert_cozy_castling_to_uci(mv, game.position()))
    }
}

#[async_trait]
impl SearchBackend for MockBackend {
    async fn analyze(&self, fen: &str, _budget: Duration) -> Result<AnalysisResult, EngineError> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        self.analyze_gauge.enter();
        self.wait_turn().await;
        self.analyze_gauge.exit();

        if !self.is_available() {
            return Err(EngineError::Unavailable("mock engine offline".to_string()));
        }
        let game = Game::from_fen(fen).map_err(|e| EngineError::Protocol(e.to_string()))?;
        let mut result = AnalysisResult::empty(game.side_to_move());
        result.score = Some(Score::Centipawns(17));
        result.depth = Some(1);
        result.pv = game.legal_moves().into_iter().take(1).collect();
        Ok(result)
    }

    async fn best_move(&self, fen: &str, _budget: Duration) -> Option<Move> {
        self.best_move_calls.fetch_add(1, Ordering::SeqCst);
        self.best_move_gauge.enter();
        self.wait_turn().await;
        self.best_move_gauge.exit();

        if !self.is_available() || self.refuse_moves {
            return None;
        }
        self.pick_move(fen)
    }

    fn is_available(&self) -> bool {
        self.available
    }
}
