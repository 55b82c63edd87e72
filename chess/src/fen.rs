use cozy_chess::Board;

use crate::types::PlayerSide;

/// Parse a FEN string into a Board
pub fn parse_fen(fen: &str) -> Result<Board, FenError> {
    if fen.split_whitespace().next().is_none() {
        return Err(FenError::Empty);
    }

    fen.parse()
        .map_err(|_| FenError::InvalidFormat(fen.to_string()))
}

/// Format a Board as a FEN string
pub fn format_fen(board: &Board) -> String {
    board.to_string()
}

/// Read the side-to-move field without parsing the whole position.
pub fn side_to_move(fen: &str) -> Option<PlayerSide> {
    match fen.split_whitespace().nth(1)? {
        "w" => Some(PlayerSide::White),
        "b" => Some(PlayerSide::Black),
        _ => None,
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum FenError {
    #[error("Empty FEN")]
    Empty,
    #[error("Invalid FEN: {0}")]
    InvalidFormat(String),
}
