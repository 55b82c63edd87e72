//! Line commands typed at the prompt.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A move in UCI notation, checked by the session.
    Move(String),
    Undo,
    Resign,
    Draw,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let word = line.trim();
        if word.is_empty() {
            return None;
        }
        let command = match word.to_ascii_lowercase().as_str() {
            "undo" | "u" => Self::Undo,
            "resign" => Self::Resign,
            "draw" => Self::Draw,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            mv => Self::Move(mv.to_string()),
        };
        Some(command)
    }
}

pub const HELP: &str = "\
Commands:
  <move>   play a move in UCI notation, e.g. e2e4 or e7e8q
  undo     take back the last move
  resign   the side to move resigns
  draw     agree to a draw
  quit     leave the game";
