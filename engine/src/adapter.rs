//! Owner of the single external engine subprocess.
//!
//! Every exchange with the process (handshake, search, quit) runs while
//! holding one async mutex, so analysis and move requests coming from
//! different background jobs never interleave on the stdin/stdout stream.

use crate::uci::{parse_uci_message, UciMessage};
use crate::{AnalysisResult, EngineConfig, EngineError, SearchBackend};
use async_trait::async_trait;
use cozy_chess::Move;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout};
use tokio::sync::Mutex;

/// How long `shutdown` waits for the process to exit after `quit`.
const QUIT_GRACE: Duration = Duration::from_secs(1);

enum AdapterState {
    /// Not started yet.
    Idle,
    Running(EngineProcess),
    /// Start failed, the process died, or shutdown ran. Permanent.
    Disabled,
}

pub struct EngineAdapter {
    config: EngineConfig,
    state: Mutex<AdapterState>,
    available: AtomicBool,
}

impl EngineAdapter {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            state: Mutex::new(AdapterState::Idle),
            available: AtomicBool::new(false),
        }
    }

    /// Launch the subprocess and run the UCI handshake.
    ///
    /// On failure the adapter is disabled for good; every later call reports
    /// `EngineError::Unavailable` instead of trying again.
    #[tracing::instrument(level = "info", skip(self), fields(path = %self.config.path.display()))]
    pub async fn start(&self) -> Result<(), EngineError> {
        let mut state = self.state.lock().await;
        match &*state {
            AdapterState::Running(_) => return Ok(()),
            AdapterState::Disabled => {
                return Err(EngineError::Unavailable("engine adapter is disabled".to_string()))
            }
            AdapterState::Idle => {}
        }

        match EngineProcess::spawn(&self.config).await {
            Ok(process) => {
                tracing::info!(name = ?process.name, "Engine started");
                *state = AdapterState::Running(process);
                self.available.store(true, Ordering::Release);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Engine failed to start: {}", e);
                *state = AdapterState::Disabled;
                Err(e)
            }
        }
    }

    /// Evaluate `fen` for `budget` and return the final primary line.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn analyze(&self, fen: &str, budget: Duration) -> Result<AnalysisResult, EngineError> {
        self.search(fen, budget).await.map(|outcome| outcome.analysis)
    }

    /// Ask the engine to choose a move for `fen`.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn best_move(&self, fen: &str, budget: Duration) -> Option<Move> {
        match self.search(fen, budget).await {
            Ok(outcome) => outcome.best_move,
            Err(e) => {
                tracing::warn!("Engine could not pick a move: {}", e);
                None
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    /// Send `quit`, give the process a moment to exit, then kill it.
    /// Safe to call any number of times and on a disabled adapter.
    pub async fn shutdown(&self) {
        let mut state = self.state.lock().await;
        self.available.store(false, Ordering::Release);
        if let AdapterState::Running(process) = std::mem::replace(&mut *state, AdapterState::Disabled) {
            tracing::info!("Shutting down engine");
            process.quit().await;
        }
    }

    async fn search(&self, fen: &str, budget: Duration) -> Result<SearchOutcome, EngineError> {
        let mut state = self.state.lock().await;
        let AdapterState::Running(process) = &mut *state else {
            return Err(EngineError::Unavailable("engine is not running".to_string()));
        };

        match process.search(fen, budget).await {
            Err(EngineError::Terminated(reason)) => {
                tracing::error!("Engine terminated mid-search: {}", reason);
                self.available.store(false, Ordering::Release);
                *state = AdapterState::Disabled;
                Err(EngineError::Terminated(reason))
            }
            other => other,
        }
    }
}

#[async_trait]
impl SearchBackend for EngineAdapter {
    async fn analyze(&self, fen: &str, budget: Duration) -> Result<AnalysisResult, EngineError> {
        EngineAdapter::analyze(self, fen, budget).await
    }

    async fn best_move(&self, fen: &str, budget: Duration) -> Option<Move> {
        EngineAdapter::best_move(self, fen, budget).await
    }

    fn is_available(&self) -> bool {
        EngineAdapter::is_available(self)
    }
}

struct SearchOutcome {
    analysis: AnalysisResult,
    best_move: Option<Move>,
}

/// A live engine process speaking UCI over its stdin/stdout.
struct EngineProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    name: Option<String>,
}

impl EngineProcess {
    async fn spawn(config: &EngineConfig) -> Result<Self, EngineError> {
        tracing::debug!("Spawning engine process");
        let mut child = tokio::process::Command::new(&config.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                EngineError::Unavailable(format!(
                    "Failed to spawn {}: {}",
                    config.path.display(),
                    e
                ))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::Unavailable("Failed to get stdin".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::Unavailable("Failed to get stdout".to_string()))?;

        let mut process = Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            name: None,
        };

        // Anything going wrong before the engine is ready means it is unusable.
        process.handshake(config).await.map_err(|e| match e {
            EngineError::Unavailable(msg) => EngineError::Unavailable(msg),
            other => EngineError::Unavailable(format!("Handshake failed: {}", other)),
        })?;
        Ok(process)
    }

    async fn handshake(&mut self, config: &EngineConfig) -> Result<(), EngineError> {
        let limit = config.handshake_timeout;

        self.send("uci").await?;
        tokio::time::timeout(limit, self.wait_for_uciok())
            .await
            .map_err(|_| EngineError::Unavailable("Timeout waiting for uciok".to_string()))??;

        if let Some(level) = config.skill_level {
            let level = level.min(20);
            tracing::info!("Setting skill level to {}", level);
            self.send(&format!("setoption name Skill Level value {}", level))
                .await?;
        }
        if let Some(threads) = config.threads {
            let threads = threads.clamp(1, 16);
            tracing::info!("Setting Threads to {}", threads);
            self.send(&format!("setoption name Threads value {}", threads))
                .await?;
        }
        if let Some(hash_mb) = config.hash_mb {
            let hash_mb = hash_mb.clamp(1, 2048);
            tracing::info!("Setting Hash to {} MB", hash_mb);
            self.send(&format!("setoption name Hash value {}", hash_mb))
                .await?;
        }

        self.send("isready").await?;
        tokio::time::timeout(limit, self.wait_for_readyok())
            .await
            .map_err(|_| EngineError::Unavailable("Timeout waiting for readyok".to_string()))?
    }

    async fn wait_for_uciok(&mut self) -> Result<(), EngineError> {
        loop {
            match self.read_message().await? {
                Some(UciMessage::Id { name, value }) if name == "name" => self.name = Some(value),
                Some(UciMessage::UciOk) => return Ok(()),
                _ => {}
            }
        }
    }

    async fn wait_for_readyok(&mut self) -> Result<(), EngineError> {
        loop {
            if let Some(UciMessage::ReadyOk) = self.read_message().await? {
                return Ok(());
            }
        }
    }

    /// One search: set the position, `go`, collect info lines until `bestmove`.
    async fn search(&mut self, fen: &str, budget: Duration) -> Result<SearchOutcome, EngineError> {
        // Never hand the engine a position it could choke on.
        chess::fen::parse_fen(fen).map_err(|e| EngineError::Protocol(e.to_string()))?;
        let side = chess::fen::side_to_move(fen)
            .ok_or_else(|| EngineError::Protocol(format!("No side to move in {}", fen)))?;

        let movetime = u64::try_from(budget.as_millis()).unwrap_or(u64::MAX).max(1);
        self.send(&format!("position fen {}", fen)).await?;
        self.send(&go_command(movetime)).await?;

        let mut analysis = AnalysisResult::empty(side);
        loop {
            match self.read_message().await? {
                Some(UciMessage::Info(info)) => analysis.absorb(&info),
                Some(UciMessage::BestMove { mv }) => {
                    tracing::debug!(best_move = ?mv, depth = ?analysis.depth, "Search finished");
                    return Ok(SearchOutcome {
                        analysis,
                        best_move: mv,
                    });
                }
                _ => {}
            }
        }
    }

    /// Read one line. Lines that do not parse come back as `None`.
    async fn read_message(&mut self) -> Result<Option<UciMessage>, EngineError> {
        let mut line = String::new();
        let read = self
            .stdout
            .read_line(&mut line)
            .await
            .map_err(|e| EngineError::Terminated(format!("Error reading engine output: {}", e)))?;
        if read == 0 {
            return Err(EngineError::Terminated("engine closed its output".to_string()));
        }

        let trimmed = line.trim();
        tracing::trace!("UCI << {}", trimmed);
        match parse_uci_message(trimmed) {
            Ok(msg) => Ok(Some(msg)),
            Err(e) => {
                tracing::trace!("Ignoring UCI line: {}", e);
                Ok(None)
            }
        }
    }

    async fn send(&mut self, cmd: &str) -> Result<(), EngineError> {
        tracing::trace!("UCI >> {}", cmd);
        let line = format!("{}\n", cmd);
        self.stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| EngineError::Terminated(format!("Failed to write to stdin: {}", e)))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| EngineError::Terminated(format!("Failed to flush stdin: {}", e)))
    }

    async fn quit(mut self) {
        if let Err(e) = self.send("quit").await {
            tracing::debug!("Engine gone before quit: {}", e);
        }
        if tokio::time::timeout(QUIT_GRACE, self.child.wait()).await.is_err() {
            tracing::warn!("Engine ignored quit, killing it");
            if let Err(e) = self.child.kill().await {
                tracing::error!("Failed to kill engine: {}", e);
            }
        }
    }
}

fn go_command(movetime_ms: u64) -> String {
    format!("go movetime {}", movetime_ms)
}
