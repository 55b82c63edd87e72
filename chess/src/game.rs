use cozy_chess::{Board, Move, Piece};

use crate::fen::{format_fen, parse_fen, FenError};
use crate::outcome::{Outcome, Termination};
use crate::types::PlayerSide;
use crate::uci::{convert_cozy_castling_to_uci, format_uci_move};

/// Plies without a capture or pawn move that end the game outright.
const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;

/// Occurrences of one position that end the game outright.
const FIVEFOLD: usize = 5;

/// Main game state wrapper around cozy-chess Board
#[derive(Debug, Clone)]
pub struct Game {
    position: Board,
    history: Vec<HistoryEntry>,
    /// Positions before each history entry, for undo.
    previous: Vec<Board>,
    start_halfmove_clock: u32,
}

/// One applied move plus the bookkeeping the termination rules need.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// The move in cozy-chess notation (castling is king-takes-rook).
    pub mv: Move,
    /// The same move in standard UCI notation.
    pub uci_move: Move,
    pub side: PlayerSide,
    pub piece: Piece,
    pub captured: Option<Piece>,
    /// FEN after this move
    pub fen: String,
    /// Plies since the last capture or pawn move, after this move
    pub halfmove_clock: u32,
}

impl HistoryEntry {
    pub fn uci(&self) -> String {
        format_uci_move(self.uci_move)
    }
}

impl Game {
    /// Create a new game from the standard starting position
    pub fn new() -> Self {
        Self::from_board(Board::default())
    }

    /// Create a game from a FEN string
    pub fn from_fen(fen: &str) -> Result<Self, GameError> {
        Ok(Self::from_board(parse_fen(fen)?))
    }

    fn from_board(position: Board) -> Self {
        let start_halfmove_clock = u32::from(position.halfmove_clock());
        Self {
            position,
            history: Vec::new(),
            previous: Vec::new(),
            start_halfmove_clock,
        }
    }

    /// Get the current board position
    pub fn position(&self) -> &Board {
        &self.position
    }

    /// Get the move history
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn last_move(&self) -> Option<&HistoryEntry> {
        self.history.last()
    }

    /// Make a move on the board. Anything outside the legal set is rejected.
    pub fn make_move(&mut self, mv: Move) -> Result<&HistoryEntry, GameError> {
        if !self.legal_moves().contains(&mv) {
            return Err(GameError::IllegalMove(format_uci_move(mv)));
        }

        let side = self.side_to_move();
        let piece = self
            .position
            .piece_on(mv.from)
            .ok_or_else(|| GameError::IllegalMove(format_uci_move(mv)))?;
        let uci_move = convert_cozy_castling_to_uci(mv, &self.position);
        let is_castle = uci_move != mv;
        let captured = if is_castle {
            None
        } else {
            self.position.piece_on(mv.to)
        };

        let before = self.position.clone();
        self.position.play_unchecked(mv);

        let halfmove_clock = if piece == Piece::Pawn || captured.is_some() {
            0
        } else {
            self.halfmove_clock() + 1
        };

        self.previous.push(before);
        self.history.push(HistoryEntry {
            mv,
            uci_move,
            side,
            piece,
            captured,
            fen: format_fen(&self.position),
            halfmove_clock,
        });

        Ok(&self.history[self.history.len() - 1])
    }

    /// Undo the last move
    pub fn undo(&mut self) -> Result<HistoryEntry, GameError> {
        let board = self.previous.pop().ok_or(GameError::NothingToUndo)?;
        let entry = self.history.pop().ok_or(GameError::NothingToUndo)?;
        self.position = board;
        Ok(entry)
    }

    /// Get all legal moves for the current position
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        self.position.generate_moves(|mvs| {
            moves.extend(mvs);
            false
        });
        moves
    }

    pub fn has_legal_moves(&self) -> bool {
        self.position.generate_moves(|_| true)
    }

    /// Get the side to move
    pub fn side_to_move(&self) -> PlayerSide {
        self.position.side_to_move().into()
    }

    pub fn is_check(&self) -> bool {
        !self.position.checkers().is_empty()
    }

    /// Plies since the last capture or pawn move.
    pub fn halfmove_clock(&self) -> u32 {
        self.history
            .last()
            .map_or(self.start_halfmove_clock, |e| e.halfmove_clock)
    }

    /// How many times the current position has occurred, this one included.
    pub fn repetition_count(&self) -> usize {
        let current = self.position.hash();
        let earlier = self
            .previous
            .iter()
            .filter(|board| board.hash() == current)
            .count();
        earlier + 1
    }

    /// Export position to FEN string
    pub fn to_fen(&self) -> String {
        format_fen(&self.position)
    }

    /// Terminal state of the current position, if any. Only rules that end
    /// the game without a claim are applied.
    pub fn outcome(&self) -> Option<Outcome> {
        if !self.has_legal_moves() {
            return Some(if self.is_check() {
                Outcome::win(Termination::Checkmate, self.side_to_move().opponent())
            } else {
                Outcome::draw(Termination::Stalemate)
            });
        }
        if has_insufficient_material(&self.position) {
            return Some(Outcome::draw(Termination::InsufficientMaterial));
        }
        if self.halfmove_clock() >= SEVENTY_FIVE_MOVE_PLIES {
            return Some(Outcome::draw(Termination::SeventyFiveMoves));
        }
        if self.repetition_count() >= FIVEFOLD {
            return Some(Outcome::draw(Termination::FivefoldRepetition));
        }
        None
    }

    pub fn is_game_over(&self) -> bool {
        self.outcome().is_some()
    }
}

/// Neither side can mate: bare kings, a single minor piece, or bishops that
/// all stand on one square color.
fn has_insufficient_material(board: &Board) -> bool {
    let heavy = board.pieces(Piece::Pawn) | board.pieces(Piece::Rook) | board.pieces(Piece::Queen);
    if !heavy.is_empty() {
        return false;
    }

    let knights = board.pieces(Piece::Knight);
    let bishops = board.pieces(Piece::Bishop);
    if knights.len() + bishops.len() <= 1 {
        return true;
    }
    if !knights.is_empty() {
        return false;
    }

    let mut colors = bishops
        .into_iter()
        .map(|sq| (sq.file() as usize + sq.rank() as usize) % 2);
    match colors.next() {
        Some(first) => colors.all(|c| c == first),
        None => true,
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum GameError {
    #[error("Illegal move: {0}")]
    IllegalMove(String),
    #[error("Invalid move notation: {0}")]
    InvalidNotation(String),
    #[error("Nothing to undo")]
    NothingToUndo,
    #[error("FEN parse error: {0}")]
    FenError(#[from] FenError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uci::parse_uci_move;

    fn play(game: &mut Game, moves: &[&str]) {
        for m in moves {
            let mv = parse_uci_move(m).unwrap();
            game.make_move(mv)
                .unwrap_or_else(|e| panic!("{m} rejected: {e}"));
        }
    }

    #[test]
    fn test_new_game() {
        let game = Game::new();
        assert_eq!(game.legal_moves().len(), 20);
        assert_eq!(game.side_to_move(), PlayerSide::White);
        assert!(game.outcome().is_none());
    }

    #[test]
    fn test_illegal_move_rejected() {
        let mut game = Game::new();
        let mv = parse_uci_move("e2e5").unwrap();
        assert!(matches!(game.make_move(mv), Err(GameError::IllegalMove(_))));
        assert!(game.history().is_empty());
    }

    #[test]
    fn test_undo_restores_position() {
        let mut game = Game::new();
        let start = game.to_fen();
        play(&mut game, &["e2e4", "c7c5"]);
        game.undo().unwrap();
        game.undo().unwrap();
        assert_eq!(game.to_fen(), start);
        assert!(matches!(game.undo(), Err(GameError::NothingToUndo)));
    }

    #[test]
    fn test_scholars_mate() {
        let mut game = Game::new();
        play(&mut game, &["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g8f6"]);
        assert!(!game.is_game_over());

        play(&mut game, &["h5f7"]);
        assert_eq!(
            game.outcome(),
            Some(Outcome::win(Termination::Checkmate, PlayerSide::White))
        );
    }

    #[test]
    fn test_fools_mate_black_wins() {
        let mut game = Game::new();
        play(&mut game, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        let outcome = game.outcome().unwrap();
        assert_eq!(outcome.termination, Termination::Checkmate);
        assert_eq!(outcome.winner, Some(PlayerSide::Black));
    }

    #[test]
    fn test_stalemate() {
        let mut game = Game::from_fen("k7/8/8/2Q5/8/8/8/7K w - - 0 1").unwrap();
        play(&mut game, &["c5c7"]);
        assert_eq!(game.outcome(), Some(Outcome::draw(Termination::Stalemate)));
    }

    #[test]
    fn test_insufficient_material_after_capture() {
        let mut game = Game::from_fen("8/8/8/4k3/8/8/3p4/4K3 w - - 0 1").unwrap();
        assert!(game.outcome().is_none());
        play(&mut game, &["e1d2"]);
        assert_eq!(
            game.outcome(),
            Some(Outcome::draw(Termination::InsufficientMaterial))
        );
    }

    #[test]
    fn test_same_color_bishops_are_insufficient() {
        let board: Board = "4k3/8/8/8/3b4/8/8/B3K3 w - - 0 1".parse().unwrap();
        assert!(has_insufficient_material(&board));
        let board: Board = "4k3/8/8/8/2b5/8/8/B3K3 w - - 0 1".parse().unwrap();
        assert!(!has_insufficient_material(&board));
    }

    #[test]
    fn test_fivefold_repetition() {
        let mut game = Game::new();
        for _ in 0..3 {
            play(&mut game, &["g1f3", "g8f6", "f3g1", "f6g8"]);
        }
        // Threefold is claimable only; the game goes on.
        assert_eq!(game.repetition_count(), 4);
        assert!(!game.is_game_over());

        play(&mut game, &["g1f3", "g8f6", "f3g1", "f6g8"]);
        assert_eq!(game.repetition_count(), 5);
        assert_eq!(
            game.outcome(),
            Some(Outcome::draw(Termination::FivefoldRepetition))
        );
    }

    #[test]
    fn test_seventy_five_move_rule() {
        let mut game = Game::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        game.start_halfmove_clock = 149;
        assert!(game.outcome().is_none());
        play(&mut game, &["a1a2"]);
        assert_eq!(game.halfmove_clock(), 150);
        assert_eq!(
            game.outcome(),
            Some(Outcome::draw(Termination::SeventyFiveMoves))
        );
    }

    #[test]
    fn test_pawn_move_resets_halfmove_clock() {
        let mut game = Game::new();
        play(&mut game, &["g1f3", "g8f6"]);
        assert_eq!(game.halfmove_clock(), 2);
        play(&mut game, &["e2e4"]);
        assert_eq!(game.halfmove_clock(), 0);
    }

    #[test]
    fn test_castling_history_reports_uci() {
        let mut game = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let castle = crate::uci::convert_uci_castling_to_cozy(
            parse_uci_move("e1g1").unwrap(),
            &game.legal_moves(),
        );
        let entry = game.make_move(castle).unwrap();
        assert_eq!(entry.uci(), "e1g1");
        assert_eq!(entry.captured, None);
        assert_eq!(entry.halfmove_clock, 1);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_undo_unwinds_random_playouts(
                choices in proptest::collection::vec(any::<usize>(), 0..40)
            ) {
                let mut game = Game::new();
                let start = game.to_fen();
                let mut fens = vec![start.clone()];
                for c in choices {
                    let legal = game.legal_moves();
                    if legal.is_empty() {
                        break;
                    }
                    game.make_move(legal[c % legal.len()]).unwrap();
                    fens.push(game.to_fen());
                }
                while let Some(expected) = fens.pop() {
                    prop_assert_eq!(game.to_fen(), expected);
                    if game.undo().is_err() {
                        break;
                    }
                }
                prop_assert_eq!(game.to_fen(), start);
            }
        }
    }
}
