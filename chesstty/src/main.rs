//! ChessTTY: play chess in the terminal against a friend or a UCI engine.
//!
//! The game runs on a fixed-rate frame loop on the main thread. Engine work
//! (analysis and engine moves) runs on a background tokio runtime and is
//! picked up by the session without ever blocking a frame. Input comes from a
//! stdin reader thread over a channel so the loop never waits on the keyboard.

mod command;
mod config;
mod render;

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use engine::{EngineAdapter, EngineConfig};
use session::{GameSession, PlayerConfig, SessionConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::command::Command;
use crate::render::Snapshot;

/// Roughly 60 frames per second.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Controller {
    Human,
    Engine,
}

#[derive(Parser)]
#[command(name = "chesstty", about = "Terminal chess with integrated engine analysis")]
struct Cli {
    /// Who plays white.
    #[arg(long, value_enum, default_value = "human")]
    white: Controller,

    /// Who plays black.
    #[arg(long, value_enum, default_value = "engine")]
    black: Controller,

    /// Minutes on each clock. 0 disables the clocks.
    #[arg(long, default_value_t = 5)]
    minutes: u64,

    /// Engine executable. Defaults to $CHESSTTY_ENGINE_PATH or a discovered Stockfish.
    #[arg(long)]
    engine_path: Option<PathBuf>,

    /// Engine skill level (0-20).
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=20))]
    skill: Option<u8>,

    /// Milliseconds per background analysis. Defaults to $CHESSTTY_ANALYSIS_MS or 1000.
    #[arg(long)]
    analysis_ms: Option<u64>,

    /// Milliseconds of engine thinking per move. Defaults to $CHESSTTY_MOVE_MS or 500.
    #[arg(long)]
    move_ms: Option<u64>,

    /// Start from this position instead of the standard one.
    #[arg(long)]
    fen: Option<String>,

    /// Do not run background analysis.
    #[arg(long)]
    no_analysis: bool,
}

impl Cli {
    fn player(controller: Controller, default_name: &str) -> PlayerConfig {
        match controller {
            Controller::Human => PlayerConfig::human(default_name),
            Controller::Engine => PlayerConfig::engine("Engine"),
        }
    }

    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            white: Self::player(self.white, "White"),
            black: Self::player(self.black, "Black"),
            time_control: (self.minutes > 0).then(|| Duration::from_secs(self.minutes * 60)),
            analysis_enabled: !self.no_analysis,
            analysis_budget: self
                .analysis_ms
                .map(Duration::from_millis)
                .unwrap_or_else(config::get_analysis_budget),
            move_budget: self
                .move_ms
                .map(Duration::from_millis)
                .unwrap_or_else(config::get_move_budget),
            start_fen: self.fen.clone(),
        }
    }

    fn engine_config(&self) -> EngineConfig {
        let path = self.engine_path.clone().unwrap_or_else(config::get_engine_path);
        let mut engine_config = EngineConfig::new(path);
        engine_config.skill_level = self.skill;
        engine_config
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_dir = config::get_log_dir();
    std::fs::create_dir_all(&log_dir).ok();
    let file_appender = tracing_appender::rolling::daily(&log_dir, "chesstty");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("ChessTTY starting up");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build async runtime")?;

    let adapter = Arc::new(EngineAdapter::new(cli.engine_config()));
    if let Err(e) = runtime.block_on(adapter.start()) {
        println!("{} (playing without engine)", e);
    }

    let session_config = cli.session_config();
    let mut session = GameSession::new(session_config, adapter.clone(), runtime.handle().clone())
        .context("failed to start game")?;

    println!("ChessTTY - type 'help' for commands");
    println!("Debug logs: {}/chesstty.YYYY-MM-DD", log_dir.display());
    println!();

    let result = run(&mut session, spawn_input_reader());

    runtime.block_on(adapter.shutdown());
    tracing::info!("ChessTTY shutting down");
    result
}

/// Read stdin lines on a plain thread. The channel closes on EOF.
fn spawn_input_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn run(session: &mut GameSession, input: Receiver<String>) -> anyhow::Result<()> {
    let mut shown: Option<Snapshot> = None;
    let mut last_frame = Instant::now();

    loop {
        let now = Instant::now();
        session.update(now - last_frame);
        last_frame = now;

        loop {
            match input.try_recv() {
                Ok(line) => {
                    if let Some(Command::Quit) = handle_line(session, &line) {
                        return Ok(());
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            }
        }

        let snapshot = Snapshot::of(session);
        if shown.as_ref() != Some(&snapshot) {
            print!("{}", render::session(session));
            std::io::stdout().flush().context("failed to write to stdout")?;
            shown = Some(snapshot);
        }

        if let Some(message) = session.termination_message() {
            println!("{}", message);
            return Ok(());
        }

        std::thread::sleep(FRAME_INTERVAL);
    }
}

/// Apply one input line. Returns the parsed command so the loop can exit.
fn handle_line(session: &mut GameSession, line: &str) -> Option<Command> {
    let command = Command::parse(line)?;
    let result = match &command {
        Command::Move(mv) => session.submit_uci(mv),
        Command::Undo => session.undo(),
        Command::Resign => session.resign(),
        Command::Draw => session.agree_draw(),
        Command::Help => {
            println!("{}", command::HELP);
            Ok(())
        }
        Command::Quit => Ok(()),
    };
    if let Err(e) = result {
        tracing::debug!("Rejected input {:?}: {}", line, e);
        println!("{}", e);
    }
    Some(command)
}
