//! The game session state machine.
//!
//! A session is either awaiting a move from the side to move or terminated.
//! Everything here runs on the caller's frame loop and never blocks: engine
//! work happens in the coordinators and is picked up by [`GameSession::update`].

use std::sync::Arc;
use std::time::Duration;

use chess::{
    convert_uci_castling_to_cozy, parse_uci_move, Game, Move, Outcome, PlayerSide, Termination,
};
use engine::{AnalysisResult, SearchBackend};
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn};

use crate::config::SessionConfig;
use crate::coordinator::{AnalysisCoordinator, MoveCoordinator};
use crate::error::SessionError;
use crate::player::Player;

/// What the engine side of the session is doing, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    Idle,
    /// An engine-controlled side is to move.
    Thinking,
    /// The engine answered without a usable move for the current position.
    Stalled,
    /// The engine process is not running.
    Unavailable,
}

pub struct GameSession {
    config: SessionConfig,
    game: Game,
    white: Player,
    black: Player,
    termination: Option<Outcome>,
    backend: Arc<dyn SearchBackend>,
    analysis: AnalysisCoordinator,
    mover: MoveCoordinator,
    /// Position the last engine move was requested for.
    engine_request: Option<String>,
    engine_stalled: bool,
}

impl GameSession {
    /// Build a session and issue the first analysis and engine requests.
    ///
    /// Background jobs are spawned on `runtime`.
    pub fn new(
        config: SessionConfig,
        backend: Arc<dyn SearchBackend>,
        runtime: Handle,
    ) -> Result<Self, SessionError> {
        let game = match &config.start_fen {
            Some(fen) => Game::from_fen(fen).map_err(|e| SessionError::InvalidFen(e.to_string()))?,
            None => Game::new(),
        };
        let white = Player::new(PlayerSide::White, &config.white, config.time_control);
        let black = Player::new(PlayerSide::Black, &config.black, config.time_control);
        let analysis = AnalysisCoordinator::new(
            Arc::clone(&backend),
            runtime.clone(),
            config.analysis_budget,
        );
        let mover = MoveCoordinator::new(Arc::clone(&backend), runtime);

        let mut session = Self {
            config,
            game,
            white,
            black,
            termination: None,
            backend,
            analysis,
            mover,
            engine_request: None,
            engine_stalled: false,
        };

        info!(
            "New game: {} ({:?}) vs {} ({:?})",
            session.white.name(),
            session.white.kind(),
            session.black.name(),
            session.black.kind()
        );

        match session.game.outcome() {
            Some(outcome) => session.terminate(outcome),
            None => session.on_position_changed(),
        }
        Ok(session)
    }

    // -- Inputs -------------------------------------------------------------

    /// Apply a human move. Castling may be given in either notation.
    ///
    /// An engine-controlled side accepts human moves once the engine is
    /// unavailable or has stalled on the current position.
    pub fn submit_move(&mut self, mv: Move) -> Result<(), SessionError> {
        if self.is_terminated() {
            return Err(SessionError::GameOver);
        }
        let side = self.active_side();
        if self.player(side).is_engine() && !self.human_may_take_over() {
            return Err(SessionError::EngineTurn(side));
        }
        let mv = convert_uci_castling_to_cozy(mv, &self.game.legal_moves());
        self.apply_move(mv)
    }

    /// Apply a human move given in UCI notation, e.g. `e2e4` or `e7e8q`.
    pub fn submit_uci(&mut self, notation: &str) -> Result<(), SessionError> {
        let mv = parse_uci_move(notation).map_err(|e| SessionError::IllegalMove(e.to_string()))?;
        self.submit_move(mv)
    }

    /// Per-frame entry point: run the clock, pick up analysis, and drive an
    /// engine-controlled side.
    pub fn update(&mut self, elapsed: Duration) {
        self.tick(elapsed);
        self.analysis.poll();
        if self.is_terminated() {
            return;
        }
        self.drive_engine_turn();
    }

    /// Charge `elapsed` to the side to move. Running out ends the game.
    pub fn tick(&mut self, elapsed: Duration) {
        if self.is_terminated() {
            return;
        }
        let side = self.active_side();
        if self.player_mut(side).decrease_time(elapsed) {
            info!("{} ran out of time", side);
            self.terminate(Outcome::win(Termination::Timeout, side.opponent()));
        }
    }

    /// Take back the last move. Clocks are left as they are.
    pub fn undo(&mut self) -> Result<(), SessionError> {
        if self
            .termination
            .is_some_and(|o| o.termination == Termination::Timeout)
        {
            return Err(SessionError::UndoAfterTimeout);
        }
        let entry = self.game.undo().map_err(|_| SessionError::NothingToUndo)?;
        info!("Undid {} {}", entry.side, entry.uci());

        self.termination = None;
        self.engine_request = None;
        self.engine_stalled = false;
        self.on_position_changed();
        Ok(())
    }

    /// The side to move resigns.
    pub fn resign(&mut self) -> Result<(), SessionError> {
        if self.is_terminated() {
            return Err(SessionError::GameOver);
        }
        let side = self.active_side();
        self.terminate(Outcome::win(Termination::Resignation, side.opponent()));
        Ok(())
    }

    pub fn agree_draw(&mut self) -> Result<(), SessionError> {
        if self.is_terminated() {
            return Err(SessionError::GameOver);
        }
        self.terminate(Outcome::draw(Termination::Agreement));
        Ok(())
    }

    // -- Outputs ------------------------------------------------------------

    pub fn fen(&self) -> String {
        self.game.to_fen()
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Most recent finished analysis. May trail the board by a move.
    pub fn latest_analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.latest()
    }

    /// Last applied move in UCI notation.
    pub fn last_move(&self) -> Option<String> {
        self.game.last_move().map(|entry| entry.uci())
    }

    pub fn player(&self, side: PlayerSide) -> &Player {
        match side {
            PlayerSide::White => &self.white,
            PlayerSide::Black => &self.black,
        }
    }

    pub fn active_side(&self) -> PlayerSide {
        self.game.side_to_move()
    }

    pub fn formatted_time(&self, side: PlayerSide) -> String {
        self.player(side).formatted_time()
    }

    pub fn termination(&self) -> Option<Outcome> {
        self.termination
    }

    pub fn termination_message(&self) -> Option<String> {
        self.termination.map(|o| o.to_string())
    }

    pub fn is_terminated(&self) -> bool {
        self.termination.is_some()
    }

    pub fn is_check(&self) -> bool {
        self.game.is_check()
    }

    pub fn engine_status(&self) -> EngineStatus {
        if !self.backend.is_available() {
            return EngineStatus::Unavailable;
        }
        if self.engine_stalled {
            return EngineStatus::Stalled;
        }
        if !self.is_terminated() && self.player(self.active_side()).is_engine() {
            return EngineStatus::Thinking;
        }
        EngineStatus::Idle
    }

    // -- Internals ----------------------------------------------------------

    fn human_may_take_over(&self) -> bool {
        self.engine_stalled || !self.backend.is_available()
    }

    fn player_mut(&mut self, side: PlayerSide) -> &mut Player {
        match side {
            PlayerSide::White => &mut self.white,
            PlayerSide::Black => &mut self.black,
        }
    }

    fn apply_move(&mut self, mv: Move) -> Result<(), SessionError> {
        let entry = self
            .game
            .make_move(mv)
            .map_err(|e| SessionError::IllegalMove(e.to_string()))?;
        info!("{} played {}", entry.side, entry.uci());

        self.engine_stalled = false;
        match self.game.outcome() {
            Some(outcome) => self.terminate(outcome),
            None => self.on_position_changed(),
        }
        Ok(())
    }

    fn terminate(&mut self, outcome: Outcome) {
        if self.termination.is_some() {
            return;
        }
        info!("Game over: {}", outcome);
        self.termination = Some(outcome);
    }

    fn on_position_changed(&mut self) {
        if self.config.analysis_enabled {
            self.analysis.request(self.game.to_fen());
        }
        self.request_engine_move();
    }

    /// Ask for an engine move if an engine is to move and nothing has been
    /// requested for this position yet.
    fn request_engine_move(&mut self) {
        if self.is_terminated() || !self.player(self.active_side()).is_engine() {
            return;
        }
        let fen = self.game.to_fen();
        if self.engine_request.as_deref() == Some(fen.as_str()) || self.mover.is_busy() {
            return;
        }
        if self.mover.request(fen.clone(), self.config.move_budget) {
            debug!("Requested engine move for {}", fen);
            self.engine_request = Some(fen);
        }
    }

    fn drive_engine_turn(&mut self) {
        if !self.player(self.active_side()).is_engine() {
            return;
        }
        let fen = self.game.to_fen();
        // Sampled before polling: a job's result reaches the mailbox before
        // the job counts as finished, so idle with nothing to poll means no move.
        let idle = !self.mover.is_busy();

        if let Some(result) = self.mover.poll() {
            if result.position == fen {
                self.apply_engine_move(result.mv);
                return;
            }
            debug!("Discarding engine move for a previous position");
        }

        if self.engine_request.as_deref() == Some(fen.as_str()) {
            if idle && !self.engine_stalled {
                warn!("Engine produced no move for {}", fen);
                self.engine_stalled = true;
            }
            return;
        }
        self.request_engine_move();
    }

    fn apply_engine_move(&mut self, mv: Move) {
        let mv = convert_uci_castling_to_cozy(mv, &self.game.legal_moves());
        if let Err(e) = self.apply_move(mv) {
            error!("Engine move rejected: {}", e);
            self.engine_stalled = true;
        }
    }
}
