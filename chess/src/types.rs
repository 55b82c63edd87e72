//! Project-owned side type. cozy-chess colors stay an implementation detail.

/// The two sides of a game. White is the first mover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerSide {
    White,
    Black,
}

impl PlayerSide {
    pub fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }
}

impl From<cozy_chess::Color> for PlayerSide {
    fn from(c: cozy_chess::Color) -> Self {
        match c {
            cozy_chess::Color::White => Self::White,
            cozy_chess::Color::Black => Self::Black,
        }
    }
}

impl From<PlayerSide> for cozy_chess::Color {
    fn from(side: PlayerSide) -> Self {
        match side {
            PlayerSide::White => Self::White,
            PlayerSide::Black => Self::Black,
        }
    }
}

impl std::fmt::Display for PlayerSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent() {
        assert_eq!(PlayerSide::White.opponent(), PlayerSide::Black);
        assert_eq!(PlayerSide::Black.opponent(), PlayerSide::White);
    }

    #[test]
    fn test_color_conversion() {
        let color: cozy_chess::Color = PlayerSide::Black.into();
        assert_eq!(color, cozy_chess::Color::Black);
        assert_eq!(PlayerSide::from(cozy_chess::Color::White), PlayerSide::White);
    }
}
