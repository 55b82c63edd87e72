//! Runtime defaults for the ChessTTY binary.
//!
//! Every value has a compile-time default and can be overridden through a
//! dedicated environment variable. Command-line flags take precedence over
//! both.

use std::path::PathBuf;
use std::time::Duration;

use session::config::{DEFAULT_ANALYSIS_BUDGET, DEFAULT_MOVE_BUDGET};

/// Default directory for the rolling log files.
const DEFAULT_LOG_DIR: &str = "logs";

/// Executable tried when no engine path is configured or discovered.
const FALLBACK_ENGINE: &str = "stockfish";

/// Get the engine executable path.
///
/// Priority:
/// 1. `CHESSTTY_ENGINE_PATH` env variable if set
/// 2. a Stockfish found in a common location or on `PATH`
/// 3. plain `stockfish`, left for the OS to resolve
pub fn get_engine_path() -> PathBuf {
    if let Ok(path) = std::env::var("CHESSTTY_ENGINE_PATH") {
        return PathBuf::from(path);
    }

    engine::find_stockfish_path().unwrap_or_else(|| PathBuf::from(FALLBACK_ENGINE))
}

/// Get the directory log files are written to.
///
/// Priority:
/// 1. `CHESSTTY_LOG_DIR` env variable if set
/// 2. `logs` in the working directory
pub fn get_log_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CHESSTTY_LOG_DIR") {
        return PathBuf::from(dir);
    }

    PathBuf::from(DEFAULT_LOG_DIR)
}

/// Get the time budget for each background analysis.
///
/// Reads `CHESSTTY_ANALYSIS_MS`, falling back to the session default when
/// unset or unparseable.
pub fn get_analysis_budget() -> Duration {
    millis_from_env("CHESSTTY_ANALYSIS_MS").unwrap_or(DEFAULT_ANALYSIS_BUDGET)
}

/// Get the thinking time for engine-controlled sides.
///
/// Reads `CHESSTTY_MOVE_MS`, falling back to the session default when unset
/// or unparseable.
pub fn get_move_budget() -> Duration {
    millis_from_env("CHESSTTY_MOVE_MS").unwrap_or(DEFAULT_MOVE_BUDGET)
}

fn millis_from_env(var: &str) -> Option<Duration> {
    let value = std::env::var(var).ok()?;
    value.trim().parse().ok().map(Duration::from_millis)
}
