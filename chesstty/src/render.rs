//! Plain-text rendering of a session for the terminal.

use chess::{format_uci_move, PlayerSide};
use cozy_chess::{Board, Color, File, Piece, Rank, Square};
use engine::AnalysisResult;
use session::{EngineStatus, GameSession};

const EVAL_BAR_WIDTH: usize = 20;

/// Everything that, when changed, warrants printing the board again.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    fen: String,
    analysis: Option<AnalysisResult>,
    engine_status: EngineStatus,
    terminated: bool,
}

impl Snapshot {
    pub fn of(session: &GameSession) -> Self {
        Self {
            fen: session.fen(),
            analysis: session.latest_analysis().cloned(),
            engine_status: session.engine_status(),
            terminated: session.is_terminated(),
        }
    }
}

pub fn session(session: &GameSession) -> String {
    let mut out = board(session.game().position());
    out.push('\n');

    for side in [PlayerSide::Black, PlayerSide::White] {
        let player = session.player(side);
        let marker = if side == session.active_side() && !session.is_terminated() {
            '>'
        } else {
            ' '
        };
        out.push_str(&format!(
            "{} {:<5} {:<16} {}\n",
            marker,
            side,
            player.name(),
            player.formatted_time()
        ));
    }

    if let Some(mv) = session.last_move() {
        out.push_str(&format!("Last move: {}\n", mv));
    }
    if session.is_check() && !session.is_terminated() {
        out.push_str("Check!\n");
    }
    if let Some(analysis) = session.latest_analysis() {
        out.push_str(&evaluation(analysis));
        out.push('\n');
    }
    match session.engine_status() {
        EngineStatus::Unavailable => out.push_str("Engine: unavailable, enter moves for both sides\n"),
        EngineStatus::Stalled => out.push_str("Engine: no move, enter one to play on\n"),
        EngineStatus::Thinking => out.push_str("Engine: thinking...\n"),
        EngineStatus::Idle => {}
    }
    out
}

/// Board diagram from white's side, uppercase for white pieces.
pub fn board(board: &Board) -> String {
    let mut out = String::new();
    for rank in Rank::ALL.iter().rev() {
        out.push_str(&format!("{} ", *rank as usize + 1));
        for file in File::ALL {
            let square = Square::new(file, *rank);
            out.push(' ');
            out.push(piece_char(board, square));
        }
        out.push('\n');
    }
    out.push_str("   a b c d e f g h\n");
    out
}

fn piece_char(board: &Board, square: Square) -> char {
    let Some(piece) = board.piece_on(square) else {
        return '.';
    };
    let c = match piece {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
    };
    match board.color_on(square) {
        Some(Color::White) => c.to_ascii_uppercase(),
        _ => c,
    }
}

/// One line: white-relative score, bar, depth and best move.
pub fn evaluation(analysis: &AnalysisResult) -> String {
    let Some(score) = analysis.white_score() else {
        return "Eval: --".to_string();
    };
    let mut line = format!("Eval: {:>6} {}", score.display(), eval_bar(score.white_ratio()));
    if let Some(depth) = analysis.depth {
        line.push_str(&format!(" depth {}", depth));
    }
    if let Some(mv) = analysis.best_move() {
        line.push_str(&format!(" best {}", format_uci_move(mv)));
    }
    line
}

fn eval_bar(white_ratio: f64) -> String {
    let filled = (white_ratio.clamp(0.0, 1.0) * EVAL_BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(EVAL_BAR_WIDTH - filled)
    )
}
