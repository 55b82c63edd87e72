use std::sync::Arc;
use std::time::Duration;

use chess::Move;
use engine::SearchBackend;
use tokio::runtime::Handle;

use super::JobSlot;

/// An engine move together with the position it was chosen for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveResult {
    pub position: String,
    pub mv: Move,
}

/// Asks the engine for moves in the background, one search at a time.
pub struct MoveCoordinator {
    backend: Arc<dyn SearchBackend>,
    runtime: Handle,
    slot: JobSlot<(String, Option<Move>)>,
}

impl MoveCoordinator {
    pub fn new(backend: Arc<dyn SearchBackend>, runtime: Handle) -> Self {
        Self {
            backend,
            runtime,
            slot: JobSlot::new(),
        }
    }

    /// Start a move search for `fen`. Returns `false` if a search was already
    /// running and the request was dropped.
    pub fn request(&mut self, fen: String, budget: Duration) -> bool {
        let backend = Arc::clone(&self.backend);
        let accepted = self.slot.spawn(&self.runtime, async move {
            let mv = backend.best_move(&fen, budget).await;
            if mv.is_none() {
                tracing::warn!("Engine returned no move for {}", fen);
            }
            (fen, mv)
        });

        if !accepted {
            tracing::debug!("Move search already running, request dropped");
        }
        accepted
    }

    /// Take the finished move, if any. Each move is handed out once.
    pub fn poll(&mut self) -> Option<MoveResult> {
        let (position, mv) = self.slot.take()?;
        mv.map(|mv| MoveResult { position, mv })
    }

    pub fn is_busy(&self) -> bool {
        self.slot.is_busy()
    }

    pub fn jobs_spawned(&self) -> usize {
        self.slot.spawned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;
    use chess::format_uci_move;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    async fn wait_idle(coordinator: &MoveCoordinator) {
        for _ in 0..200 {
            if !coordinator.is_busy() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("move search never finished");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_move_is_handed_out_once() {
        let backend = Arc::new(MockBackend::new().with_moves(&["e2e4"]));
        let mut coordinator = MoveCoordinator::new(backend, Handle::current());

        assert!(coordinator.request(START.to_string(), Duration::from_millis(10)));
        wait_idle(&coordinator).await;

        let result = coordinator.poll().unwrap();
        assert_eq!(result.position, START);
        assert_eq!(format_uci_move(result.mv), "e2e4");
        assert_eq!(coordinator.poll(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_overlapping_requests_never_run_concurrently() {
        let backend = Arc::new(MockBackend::new().with_delay(Duration::from_millis(20)));
        let mut coordinator = MoveCoordinator::new(backend.clone(), Handle::current());

        for _ in 0..50 {
            coordinator.request(START.to_string(), Duration::from_millis(10));
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        wait_idle(&coordinator).await;

        assert_eq!(backend.best_move_calls(), coordinator.jobs_spawned());
        assert!(coordinator.jobs_spawned() < 50);
        assert_eq!(backend.peak_concurrent_moves(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_no_move_polls_as_none() {
        let backend = Arc::new(MockBackend::new().refusing_moves());
        let mut coordinator = MoveCoordinator::new(backend, Handle::current());

        coordinator.request(START.to_string(), Duration::from_millis(10));
        wait_idle(&coordinator).await;
        assert_eq!(coordinator.poll(), None);
        assert!(!coordinator.is_busy());
    }
}
