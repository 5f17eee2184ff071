use crate::ParseLevelError;

/// A single cell of a decoded level.
///
/// Each variant maps to exactly one character of the persisted text grid
/// format (see [`Level`](super::level::Level)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    /// Ground and non-moving blocks.
    Solid,
    /// Breakable brick; also used for moving blocks.
    Breakable,
    Question,
    /// Question block holding a power-up.
    PowerUp,
    Coin,
    Enemy,
    PipeBody,
    PipeTop,
    Start,
    FlagTop,
    Flag,
}

impl Cell {
    pub const ALL: [Self; 12] = [
        Self::Empty,
        Self::Solid,
        Self::Breakable,
        Self::Question,
        Self::PowerUp,
        Self::Coin,
        Self::Enemy,
        Self::PipeBody,
        Self::PipeTop,
        Self::Start,
        Self::FlagTop,
        Self::Flag,
    ];

    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Empty => '-',
            Self::Solid => 'X',
            Self::Breakable => 'B',
            Self::Question => '?',
            Self::PowerUp => 'M',
            Self::Coin => 'o',
            Self::Enemy => 'E',
            Self::PipeBody => '|',
            Self::PipeTop => 'T',
            Self::Start => 'm',
            Self::FlagTop => 'v',
            Self::Flag => 'f',
        }
    }

    pub fn from_char(ch: char) -> Result<Self, ParseLevelError> {
        Self::ALL
            .into_iter()
            .find(|cell| cell.as_char() == ch)
            .ok_or(ParseLevelError::UnknownSymbol { symbol: ch })
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Whether the player can stand on top of this cell.
    #[must_use]
    pub const fn is_solid(self) -> bool {
        matches!(
            self,
            Self::Solid
                | Self::Breakable
                | Self::Question
                | Self::PowerUp
                | Self::PipeBody
                | Self::PipeTop
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols_are_unique() {
        for (i, a) in Cell::ALL.iter().enumerate() {
            for b in &Cell::ALL[i + 1..] {
                assert_ne!(a.as_char(), b.as_char(), "{a:?} and {b:?} share a symbol");
            }
        }
    }

    #[test]
    fn test_from_char() {
        for cell in Cell::ALL {
            assert_eq!(Cell::from_char(cell.as_char()).unwrap(), cell);
        }
        assert!(matches!(
            Cell::from_char('#'),
            Err(ParseLevelError::UnknownSymbol { symbol: '#' })
        ));
    }

    #[test]
    fn test_passable_cells() {
        assert!(!Cell::Empty.is_solid());
        assert!(!Cell::Coin.is_solid());
        assert!(!Cell::Enemy.is_solid());
        assert!(!Cell::Flag.is_solid());
        assert!(Cell::Solid.is_solid());
        assert!(Cell::PipeTop.is_solid());
    }
}
