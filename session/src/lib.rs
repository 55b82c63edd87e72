//! Turn-based game session and the background engine coordination behind it.
//!
//! [`GameSession`] owns the authoritative position and runs on the caller's
//! frame loop. It never waits on the engine: analysis and move requests go to
//! [`AnalysisCoordinator`] and [`MoveCoordinator`], which run at most one job
//! each on a tokio runtime and are polled once per frame.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod player;
pub mod state;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use config::{PlayerConfig, PlayerKind, SessionConfig};
pub use coordinator::{AnalysisCoordinator, MoveCoordinator, MoveResult};
pub use error::SessionError;
pub use player::Player;
pub use state::{EngineStatus, GameSession};
