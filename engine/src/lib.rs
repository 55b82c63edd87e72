pub mod adapter;
pub mod config;
pub mod uci;

pub use adapter::EngineAdapter;
pub use config::{find_stockfish_path, EngineConfig};
pub use uci::{UciError, UciMessage};

use async_trait::async_trait;
use chess::PlayerSide;
use cozy_chess::Move;
use std::time::Duration;

/// Errors surfaced by the engine adapter. Coordinators absorb these at their
/// boundary and report "no result" instead.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("Engine unavailable: {0}")]
    Unavailable(String),
    #[error("Engine terminated: {0}")]
    Terminated(String),
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Anything that can evaluate a position or pick a move for it.
///
/// Positions travel as FEN strings so callers only ever hand over snapshots.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Search `fen` for `budget` and report the final primary line.
    async fn analyze(&self, fen: &str, budget: Duration) -> Result<AnalysisResult, EngineError>;

    /// Ask for a move. `None` on failure or when the position has no moves.
    async fn best_move(&self, fen: &str, budget: Duration) -> Option<Move>;

    /// Non-blocking availability check for display purposes.
    fn is_available(&self) -> bool;
}

/// Raw contents of one "info" line.
#[derive(Debug, Clone, Default)]
pub struct EngineInfo {
    pub depth: Option<u8>,
    pub score: Option<Score>,
    pub pv: Vec<Move>, // Principal variation
    pub multipv: Option<u8>,
}

/// Engine evaluation from the side to move's point of view.
///
/// Mate: positive N = side to move mates in N, negative N = gets mated in N.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    Centipawns(i32),
    Mate(i32),
}

impl Score {
    pub fn display(&self) -> String {
        match self {
            Self::Centipawns(cp) => format!("{:+.2}", *cp as f64 / 100.0),
            Self::Mate(m) => {
                if *m > 0 {
                    format!("+M{}", m)
                } else {
                    format!("-M{}", m.abs())
                }
            }
        }
    }

    /// Negate the score (flip perspective).
    pub fn negate(&self) -> Self {
        match self {
            Self::Centipawns(cp) => Self::Centipawns(-cp),
            Self::Mate(m) => Self::Mate(-m),
        }
    }

    /// Re-express a score given for `side_to_move` from white's side.
    pub fn for_white(&self, side_to_move: PlayerSide) -> Self {
        match side_to_move {
            PlayerSide::White => *self,
            PlayerSide::Black => self.negate(),
        }
    }

    /// Share of an evaluation bar that belongs to white, in `0.0..=1.0`.
    /// Expects a white-relative score.
    pub fn white_ratio(&self) -> f64 {
        match self {
            Self::Mate(m) if *m > 0 => 1.0,
            Self::Mate(_) => 0.0,
            Self::Centipawns(cp) => ((f64::from(*cp) * 0.0025).tanh() + 1.0) / 2.0,
        }
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Final verdict of one analysis search. Superseded wholesale by the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub score: Option<Score>,
    pub pv: Vec<Move>,
    pub depth: Option<u32>,
    /// Side to move in the analysed position; `score` is relative to it.
    pub side_to_move: PlayerSide,
}

impl AnalysisResult {
    pub fn empty(side_to_move: PlayerSide) -> Self {
        Self {
            score: None,
            pv: Vec::new(),
            depth: None,
            side_to_move,
        }
    }

    /// Fold one info line into the result. Secondary lines are ignored.
    pub fn absorb(&mut self, info: &EngineInfo) {
        if info.multipv.is_some_and(|n| n > 1) {
            return;
        }
        if let Some(depth) = info.depth {
            self.depth = Some(u32::from(depth));
        }
        if let Some(score) = info.score {
            self.score = Some(score);
        }
        if !info.pv.is_empty() {
            self.pv = info.pv.clone();
        }
    }

    pub fn white_score(&self) -> Option<Score> {
        self.score.map(|s| s.for_white(self.side_to_move))
    }

    pub fn best_move(&self) -> Option<Move> {
        self.pv.first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_display() {
        assert_eq!(Score::Centipawns(35).display(), "+0.35");
        assert_eq!(Score::Centipawns(-120).display(), "-1.20");
        assert_eq!(Score::Mate(3).display(), "+M3");
        assert_eq!(Score::Mate(-2).display(), "-M2");
    }

    #[test]
    fn test_for_white_flips_black_scores() {
        assert_eq!(
            Score::Centipawns(50).for_white(PlayerSide::Black),
            Score::Centipawns(-50)
        );
        assert_eq!(Score::Mate(2).for_white(PlayerSide::White), Score::Mate(2));
    }

    #[test]
    fn test_white_ratio() {
        assert_eq!(Score::Centipawns(0).white_ratio(), 0.5);
        assert_eq!(Score::Mate(1).white_ratio(), 1.0);
        assert_eq!(Score::Mate(-4).white_ratio(), 0.0);
        let ahead = Score::Centipawns(200).white_ratio();
        assert!(ahead > 0.7 && ahead < 0.8, "got {ahead}");
    }

    #[test]
    fn test_absorb_keeps_latest_primary_line() {
        let mut result = AnalysisResult::empty(PlayerSide::White);
        result.absorb(&EngineInfo {
            depth: Some(10),
            score: Some(Score::Centipawns(20)),
            pv: vec![chess::parse_uci_move("e2e4").unwrap()],
            ..Default::default()
        });
        result.absorb(&EngineInfo {
            depth: Some(11),
            multipv: Some(2),
            score: Some(Score::Centipawns(-300)),
            ..Default::default()
        });
        result.absorb(&EngineInfo {
            depth: Some(12),
            ..Default::default()
        });

        assert_eq!(result.depth, Some(12));
        assert_eq!(result.score, Some(Score::Centipawns(20)));
        assert_eq!(result.pv.len(), 1);
    }
}
