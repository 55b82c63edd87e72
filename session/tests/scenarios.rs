//! End-to-end scenarios against the real engine adapter with no engine
//! installed at the configured path.

use std::sync::Arc;
use std::time::Duration;

use chess::{PlayerSide, Termination};
use engine::{EngineAdapter, EngineConfig, EngineError};
use session::{EngineStatus, GameSession, PlayerConfig, SessionConfig};
use tokio::runtime::Handle;

async fn offline_adapter() -> Arc<EngineAdapter> {
    let adapter = Arc::new(EngineAdapter::new(EngineConfig::new(
        "/nonexistent/chesstty-test-engine",
    )));
    assert!(matches!(
        adapter.start().await,
        Err(EngineError::Unavailable(_))
    ));
    adapter
}

fn config(black: PlayerConfig) -> SessionConfig {
    SessionConfig {
        white: PlayerConfig::human("Alice"),
        black,
        time_control: Some(Duration::from_millis(50)),
        analysis_enabled: true,
        analysis_budget: Duration::from_millis(10),
        move_budget: Duration::from_millis(10),
        start_fen: None,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_clock_runs_out_without_engine() {
    let adapter = offline_adapter().await;
    let mut session =
        GameSession::new(config(PlayerConfig::human("Bob")), adapter, Handle::current()).unwrap();

    session.update(Duration::from_millis(60));

    let outcome = session.termination().unwrap();
    assert_eq!(outcome.termination, Termination::Timeout);
    assert_eq!(outcome.winner, Some(PlayerSide::Black));
    assert_eq!(
        session.termination_message().as_deref(),
        Some("white ran out of time, black wins")
    );
    assert!(session.latest_analysis().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_scholars_mate_without_engine() {
    let adapter = offline_adapter().await;
    let mut cfg = config(PlayerConfig::human("Bob"));
    cfg.time_control = None;
    let mut session = GameSession::new(cfg, adapter, Handle::current()).unwrap();

    for mv in ["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g8f6", "h5f7"] {
        session.submit_uci(mv).unwrap();
    }

    let outcome = session.termination().unwrap();
    assert_eq!(outcome.termination, Termination::Checkmate);
    assert_eq!(outcome.winner, Some(PlayerSide::White));
    assert_eq!(session.formatted_time(PlayerSide::White), "--:--");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_engine_side_shows_unavailable() {
    let adapter = offline_adapter().await;
    let mut cfg = config(PlayerConfig::engine("Stockfish"));
    cfg.time_control = None;
    let mut session = GameSession::new(cfg, adapter, Handle::current()).unwrap();

    session.submit_uci("e2e4").unwrap();
    for _ in 0..20 {
        session.update(Duration::from_millis(16));
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    assert_eq!(session.engine_status(), EngineStatus::Unavailable);
    assert_eq!(session.game().history().len(), 1);
    assert!(!session.is_terminated());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_human_plays_engine_side_without_engine() {
    let adapter = offline_adapter().await;
    let mut cfg = config(PlayerConfig::engine("Stockfish"));
    cfg.time_control = None;
    let mut session = GameSession::new(cfg, adapter, Handle::current()).unwrap();

    session.submit_uci("e2e4").unwrap();
    for _ in 0..50 {
        session.update(Duration::from_millis(16));
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    session.submit_uci("e7e5").unwrap();
    session.submit_uci("g1f3").unwrap();
    session.submit_uci("b8c6").unwrap();

    assert_eq!(session.game().history().len(), 4);
    assert_eq!(session.last_move().as_deref(), Some("b8c6"));
    assert_eq!(session.active_side(), PlayerSide::White);
}
