//! Rules oracle for ChessTTY.
//!
//! Thin layer over `cozy-chess` that owns move history, undo, and the
//! termination rules the session needs (checkmate, stalemate, insufficient
//! material, 75-move rule, fivefold repetition).

pub mod fen;
pub mod game;
pub mod outcome;
pub mod types;
pub mod uci;

pub use fen::FenError;
pub use game::{Game, GameError, HistoryEntry};
pub use outcome::{Outcome, Termination};
pub use types::PlayerSide;
pub use uci::{convert_cozy_castling_to_uci, convert_uci_castling_to_cozy, format_uci_move, parse_uci_move};

pub use cozy_chess::Move;
