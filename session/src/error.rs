use chess::PlayerSide;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Illegal move: {0}")]
    IllegalMove(String),
    #[error("Invalid FEN: {0}")]
    InvalidFen(String),
    #[error("Game is over")]
    GameOver,
    #[error("It is {0}'s turn and {0} is engine-controlled")]
    EngineTurn(PlayerSide),
    #[error("Nothing to undo")]
    NothingToUndo,
    #[error("Cannot undo after a timeout")]
    UndoAfterTimeout,
}
