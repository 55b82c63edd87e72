use crate::types::PlayerSide;

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    SeventyFiveMoves,
    FivefoldRepetition,
    Timeout,
    Resignation,
    Agreement,
}

/// Final result of a game. `winner` is `None` for draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub termination: Termination,
    pub winner: Option<PlayerSide>,
}

impl Outcome {
    pub fn win(termination: Termination, winner: PlayerSide) -> Self {
        Self {
            termination,
            winner: Some(winner),
        }
    }

    pub fn draw(termination: Termination) -> Self {
        Self {
            termination,
            winner: None,
        }
    }

    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.termination, self.winner) {
            (Termination::Checkmate, Some(w)) => write!(f, "Checkmate, {} wins", w),
            (Termination::Timeout, Some(w)) => write!(f, "{} ran out of time, {} wins", w.opponent(), w),
            (Termination::Resignation, Some(w)) => write!(f, "{} resigned, {} wins", w.opponent(), w),
            (Termination::Stalemate, _) => write!(f, "Draw by stalemate"),
            (Termination::InsufficientMaterial, _) => write!(f, "Draw by insufficient material"),
            (Termination::SeventyFiveMoves, _) => write!(f, "Draw by the 75-move rule"),
            (Termination::FivefoldRepetition, _) => write!(f, "Draw by fivefold repetition"),
            (Termination::Agreement, _) => write!(f, "Draw by agreement"),
            (termination, Some(w)) => write!(f, "{} wins ({:?})", w, termination),
            (termination, None) => write!(f, "Draw ({:?})", termination),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            Outcome::win(Termination::Checkmate, PlayerSide::White).to_string(),
            "Checkmate, white wins"
        );
        assert_eq!(
            Outcome::win(Termination::Timeout, PlayerSide::Black).to_string(),
            "white ran out of time, black wins"
        );
        assert_eq!(
            Outcome::draw(Termination::Agreement).to_string(),
            "Draw by agreement"
        );
        assert!(Outcome::draw(Termination::Stalemate).is_draw());
    }
}
