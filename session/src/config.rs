use std::time::Duration;

/// Default clock per player.
pub const DEFAULT_TIME_CONTROL: Duration = Duration::from_secs(5 * 60);

/// Default search time for each background analysis.
pub const DEFAULT_ANALYSIS_BUDGET: Duration = Duration::from_millis(1000);

/// Default thinking time for engine-controlled sides.
pub const DEFAULT_MOVE_BUDGET: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerKind {
    Human,
    Engine,
}

#[derive(Debug, Clone)]
pub struct PlayerConfig {
    pub name: String,
    pub kind: PlayerKind,
}

impl PlayerConfig {
    pub fn human(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PlayerKind::Human,
        }
    }

    pub fn engine(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PlayerKind::Engine,
        }
    }
}

/// Everything a session needs, handed over at construction.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub white: PlayerConfig,
    pub black: PlayerConfig,
    /// Time per player. `None` means unbounded clocks.
    pub time_control: Option<Duration>,
    pub analysis_enabled: bool,
    pub analysis_budget: Duration,
    pub move_budget: Duration,
    /// Custom starting position; the standard one when `None`.
    pub start_fen: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            white: PlayerConfig::human("White"),
            black: PlayerConfig::human("Black"),
            time_control: Some(DEFAULT_TIME_CONTROL),
            analysis_enabled: true,
            analysis_budget: DEFAULT_ANALYSIS_BUDGET,
            move_budget: DEFAULT_MOVE_BUDGET,
            start_fen: None,
        }
    }
}
