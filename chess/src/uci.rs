//! UCI (Universal Chess Interface) move notation

use cozy_chess::{Board, File, Move, Piece, Rank, Square};

use crate::game::GameError;

/// Convert UCI castling notation to cozy_chess notation
///
/// UCI uses standard notation (king moves 2 squares): e1g1, e1c1, e8g8, e8c8
/// cozy_chess uses king-to-rook notation: e1h1, e1a1, e8h8, e8a8
///
/// The converted move is only returned if it is in `legal_moves`; anything else
/// comes back unchanged.
pub fn convert_uci_castling_to_cozy(mv: Move, legal_moves: &[Move]) -> Move {
    let is_rank_1_or_8 = matches!(mv.from.rank(), Rank::First | Rank::Eighth);
    let is_e_file = matches!(mv.from.file(), File::E);
    let is_g_or_c_file = matches!(mv.to.file(), File::G | File::C);

    if is_rank_1_or_8 && is_e_file && is_g_or_c_file && mv.promotion.is_none() {
        let rook_file = match mv.to.file() {
            File::G => File::H,
            _ => File::A,
        };
        let converted = Move {
            from: mv.from,
            to: Square::new(rook_file, mv.from.rank()),
            promotion: None,
        };

        if legal_moves.contains(&converted) {
            return converted;
        }
    }

    mv
}

/// Convert a cozy_chess castling move (king takes own rook) back to UCI
/// notation. `board` is the position the move is played from.
pub fn convert_cozy_castling_to_uci(mv: Move, board: &Board) -> Move {
    let is_king = board.piece_on(mv.from) == Some(Piece::King);
    let onto_own_piece = board.color_on(mv.to).is_some() && board.color_on(mv.to) == board.color_on(mv.from);

    if !(is_king && onto_own_piece) {
        return mv;
    }

    let king_file = mv.from.file() as usize;
    let rook_file = mv.to.file() as usize;
    let to_file = if rook_file > king_file { File::G } else { File::C };
    Move {
        from: mv.from,
        to: Square::new(to_file, mv.from.rank()),
        promotion: None,
    }
}

/// Parse UCI move format (e2e4, e7e8q)
pub fn parse_uci_move(s: &str) -> Result<Move, GameError> {
    let invalid = || GameError::InvalidNotation(s.to_string());
    if !s.is_ascii() || !(4..=5).contains(&s.len()) {
        return Err(invalid());
    }

    let from: Square = s[0..2].parse().map_err(|_| invalid())?;
    let to: Square = s[2..4].parse().map_err(|_| invalid())?;

    let promotion = match s.get(4..5) {
        None => None,
        Some("q") => Some(Piece::Queen),
        Some("r") => Some(Piece::Rook),
        Some("b") => Some(Piece::Bishop),
        Some("n") => Some(Piece::Knight),
        Some(_) => return Err(invalid()),
    };

    Ok(Move {
        from,
        to,
        promotion,
    })
}

/// Format a move in UCI notation (e.g., "e2e4", "e7e8q")
pub fn format_uci_move(mv: Move) -> String {
    let mut s = format!("{}{}", mv.from, mv.to);
    if let Some(promo) = mv.promotion {
        s.push(match promo {
            Piece::Queen => 'q',
            Piece::Rook => 'r',
            Piece::Bishop => 'b',
            Piece::Knight => 'n',
            Piece::Pawn | Piece::King => '?',
        });
    }
    s
}
