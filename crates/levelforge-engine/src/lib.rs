//! Level representation for the evolutionary platformer level search.
//!
//! - [`core`]: level dimensions ([`LevelConfig`]), cell symbols ([`Cell`]) and
//!   the decoded grid ([`Level`]) with its row-major text format
//! - [`element`]: the catalog of placeable design elements, their parameter
//!   ranges and how each one paints itself onto a level
//! - [`genome`]: ordered element collections and the deterministic decoding
//!   of a genome into a level

pub use self::{core::*, element::*, genome::*};

pub mod core;
pub mod element;
pub mod genome;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("level width {width} is below the minimum of {min}")]
    TooNarrow { width: usize, min: usize },
    #[display("level height {height} is below the minimum of {min}")]
    TooShort { height: usize, min: usize },
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ParseLevelError {
    #[display("unknown level symbol {symbol:?}")]
    UnknownSymbol { symbol: char },
    #[display("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[display("invalid level dimensions")]
    Dimensions(ConfigError),
}

impl From<ConfigError> for ParseLevelError {
    fn from(err: ConfigError) -> Self {
        Self::Dimensions(err)
    }
}
