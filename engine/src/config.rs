use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default time allowed for each handshake step (`uciok`, `readyok`).
const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// How to launch and tune the engine subprocess.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub path: PathBuf,
    pub skill_level: Option<u8>,
    pub threads: Option<u32>,
    pub hash_mb: Option<u32>,
    pub handshake_timeout: Duration,
}

impl EngineConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            skill_level: None,
            threads: None,
            hash_mb: None,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }
}

impl Default for EngineConfig {
    /// Uses the first Stockfish found on this machine, or plain `stockfish`.
    fn default() -> Self {
        Self::new(find_stockfish_path().unwrap_or_else(|| PathBuf::from("stockfish")))
    }
}

/// Find Stockfish executable in common locations, then on `PATH`.
pub fn find_stockfish_path() -> Option<PathBuf> {
    let paths = [
        "/usr/local/bin/stockfish",
        "/usr/bin/stockfish",
        "/opt/homebrew/bin/stockfish",
        "/usr/games/stockfish",
    ];

    if let Some(found) = paths.iter().map(Path::new).find(|p| p.is_file()) {
        return Some(found.to_path_buf());
    }

    let search_path = std::env::var_os("PATH")?;
    std::env::split_paths(&search_path)
        .map(|dir| dir.join("stockfish"))
        .find(|candidate| candidate.is_file())
}
