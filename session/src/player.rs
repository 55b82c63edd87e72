use std::time::Duration;

use chess::PlayerSide;

use crate::config::{PlayerConfig, PlayerKind};

/// One side of the board: who plays it and how much time it has left.
#[derive(Debug, Clone)]
pub struct Player {
    side: PlayerSide,
    name: String,
    kind: PlayerKind,
    /// `None` when the clock is unbounded.
    remaining: Option<Duration>,
    timed_out: bool,
}

impl Player {
    pub fn new(side: PlayerSide, config: &PlayerConfig, time_control: Option<Duration>) -> Self {
        Self {
            side,
            name: config.name.clone(),
            kind: config.kind,
            remaining: time_control,
            timed_out: false,
        }
    }

    pub fn side(&self) -> PlayerSide {
        self.side
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> PlayerKind {
        self.kind
    }

    pub fn is_engine(&self) -> bool {
        self.kind == PlayerKind::Engine
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.remaining
    }

    pub fn is_timed_out(&self) -> bool {
        self.timed_out
    }

    /// Deducts `elapsed` from the clock, saturating at zero.
    ///
    /// Returns `true` only on the call that runs the clock out; later calls
    /// are no-ops.
    pub fn decrease_time(&mut self, elapsed: Duration) -> bool {
        if self.timed_out {
            return false;
        }
        let Some(remaining) = self.remaining.as_mut() else {
            return false;
        };
        *remaining = remaining.saturating_sub(elapsed);
        if remaining.is_zero() {
            self.timed_out = true;
            return true;
        }
        false
    }

    /// Clock text for display: `M:SS`, `M:SS.t` under ten seconds, `--:--`
    /// when unbounded.
    pub fn formatted_time(&self) -> String {
        match self.remaining {
            Some(remaining) => format_time(remaining),
            None => "--:--".to_string(),
        }
    }
}

pub fn format_time(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;

    if total_secs < 10 {
        let tenths = duration.subsec_millis() / 100;
        format!("{}:{:02}.{}", minutes, seconds, tenths)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(time: Option<Duration>) -> Player {
        Player::new(PlayerSide::White, &PlayerConfig::human("Alice"), time)
    }

    #[test]
    fn test_new_player() {
        let p = player(Some(Duration::from_secs(180)));
        assert_eq!(p.name(), "Alice");
        assert_eq!(p.side(), PlayerSide::White);
        assert!(!p.is_engine());
        assert_eq!(p.remaining(), Some(Duration::from_secs(180)));
        assert!(!p.is_timed_out());
    }

    #[test]
    fn test_decrease_time() {
        let mut p = player(Some(Duration::from_secs(180)));
        assert!(!p.decrease_time(Duration::from_secs(1)));
        assert_eq!(p.remaining(), Some(Duration::from_secs(179)));
    }

    #[test]
    fn test_timeout_reported_once() {
        let mut p = player(Some(Duration::from_millis(50)));
        assert!(p.decrease_time(Duration::from_millis(60)));
        assert!(p.is_timed_out());
        assert_eq!(p.remaining(), Some(Duration::ZERO));
        assert!(!p.decrease_time(Duration::from_millis(60)));
        assert_eq!(p.remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn test_exact_expiry_times_out() {
        let mut p = player(Some(Duration::from_secs(5)));
        assert!(p.decrease_time(Duration::from_secs(5)));
    }

    #[test]
    fn test_unbounded_clock_never_expires() {
        let mut p = player(None);
        assert!(!p.decrease_time(Duration::from_secs(3600)));
        assert!(!p.is_timed_out());
        assert_eq!(p.formatted_time(), "--:--");
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(Duration::from_secs(300)), "5:00");
        assert_eq!(format_time(Duration::from_secs(65)), "1:05");
        assert_eq!(format_time(Duration::from_secs(10)), "0:10");
        assert_eq!(format_time(Duration::from_millis(9_500)), "0:09.5");
        assert_eq!(format_time(Duration::ZERO), "0:00.0");
    }

    #[test]
    fn test_engine_player() {
        let p = Player::new(PlayerSide::Black, &PlayerConfig::engine("Stockfish"), None);
        assert!(p.is_engine());
        assert_eq!(p.kind(), PlayerKind::Engine);
    }
}
