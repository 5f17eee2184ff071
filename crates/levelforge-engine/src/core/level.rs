use std::{fmt, str::FromStr};

use super::{cell::Cell, config::LevelConfig};
use crate::ParseLevelError;

/// Number of flag pole rows between the flag top and the goal base.
const FLAG_POLE_ROWS: usize = 6;

/// A decoded level: a fixed-size grid of [`Cell`]s.
///
/// Rows are indexed from the top (`0`) to the ground row (`height - 1`),
/// columns from the left (`0`, start marker) to the right
/// (`width - 1`, goal structure).
///
/// # Text format
///
/// [`Display`](fmt::Display) renders the grid row-major, one row per line and
/// one character per cell with no separators. [`FromStr`] parses the same
/// format back.
///
/// ```
/// use levelforge_engine::{Level, LevelConfig};
///
/// let level = Level::template(LevelConfig::default());
/// let text = level.to_string();
/// assert_eq!(text.lines().count(), 16);
/// assert!(text.lines().all(|row| row.chars().count() == 200));
/// assert_eq!(text.parse::<Level>().unwrap(), level);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    config: LevelConfig,
    cells: Vec<Cell>,
}

impl Level {
    /// Returns a level with only the border template painted.
    ///
    /// - ground row solid across the whole width
    /// - start marker one row above the ground in column 0
    /// - goal structure in the last column: flag top, six flag pole cells,
    ///   two solid base cells
    #[must_use]
    pub fn template(config: LevelConfig) -> Self {
        let mut level = Self {
            config,
            cells: vec![Cell::Empty; config.width() * config.height()],
        };
        let ground = config.ground_row();
        let goal = config.width() - 1;
        for x in 0..config.width() {
            level.set(x, ground, Cell::Solid);
        }
        level.set(0, ground - 1, Cell::Start);

        let flag_top = ground - FLAG_POLE_ROWS - 2;
        level.set(goal, flag_top, Cell::FlagTop);
        for y in flag_top + 1..=flag_top + FLAG_POLE_ROWS {
            level.set(goal, y, Cell::Flag);
        }
        level.set(goal, ground - 1, Cell::Solid);
        level
    }

    #[must_use]
    pub const fn config(&self) -> LevelConfig {
        self.config
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.config.width()
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.config.height()
    }

    /// Returns the cell at column `x`, row `y`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the grid.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Cell {
        self.cells[self.index(x, y)]
    }

    /// Like [`Self::get`], but returns `None` outside the grid.
    #[must_use]
    pub fn try_get(&self, x: isize, y: isize) -> Option<Cell> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        (x < self.width() && y < self.height()).then(|| self.get(x, y))
    }

    /// Overwrites the cell at column `x`, row `y`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the grid.
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        let index = self.index(x, y);
        self.cells[index] = cell;
    }

    /// Iterates over rows from top to bottom.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[Cell]> + '_ {
        self.cells.chunks_exact(self.width())
    }

    /// Iterates over every cell in row-major order.
    pub fn cells(&self) -> impl ExactSizeIterator<Item = Cell> + '_ {
        self.cells.iter().copied()
    }

    fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width() && y < self.height(),
            "cell ({x}, {y}) out of bounds for {}x{} level",
            self.width(),
            self.height()
        );
        y * self.width() + x
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write as _;
        for row in self.rows() {
            for cell in row {
                f.write_char(cell.as_char())?;
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut width = None;
        let mut cells = vec![];
        let mut height = 0;
        for (row, line) in s.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            let len = line.chars().count();
            match width {
                None => width = Some(len),
                Some(expected) if expected != len => {
                    return Err(ParseLevelError::RaggedRow {
                        row,
                        expected,
                        found: len,
                    });
                }
                Some(_) => {}
            }
            for ch in line.chars() {
                cells.push(Cell::from_char(ch)?);
            }
            height += 1;
        }
        let config = LevelConfig::new(width.unwrap_or(0), height)?;
        Ok(Self { config, cells })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_layout() {
        let config = LevelConfig::default();
        let level = Level::template(config);

        for x in 0..config.width() {
            assert_eq!(level.get(x, 15), Cell::Solid, "ground at column {x}");
        }
        assert_eq!(level.get(0, 14), Cell::Start);
        assert_eq!(level.get(199, 7), Cell::FlagTop);
        for y in 8..14 {
            assert_eq!(level.get(199, y), Cell::Flag, "flag at row {y}");
        }
        assert_eq!(level.get(199, 14), Cell::Solid);
        assert_eq!(level.get(199, 6), Cell::Empty);

        let painted = level.cells().filter(|c| !c.is_empty()).count();
        assert_eq!(painted, 200 + 1 + 1 + 6 + 1);
    }

    #[test]
    fn test_template_on_minimum_height() {
        let config = LevelConfig::new(4, 10).unwrap();
        let level = Level::template(config);
        assert_eq!(level.get(3, 1), Cell::FlagTop);
        assert_eq!(level.get(3, 8), Cell::Solid);
    }

    #[test]
    fn test_try_get_outside() {
        let level = Level::template(LevelConfig::default());
        assert_eq!(level.try_get(-1, 0), None);
        assert_eq!(level.try_get(0, 16), None);
        assert_eq!(level.try_get(200, 0), None);
        assert_eq!(level.try_get(0, 15), Some(Cell::Solid));
    }

    #[test]
    fn test_parse_rejects_ragged_rows() {
        let mut text = Level::template(LevelConfig::new(5, 10).unwrap()).to_string();
        text.push_str("---\n");
        assert!(matches!(
            text.parse::<Level>(),
            Err(ParseLevelError::RaggedRow {
                row: 10,
                expected: 5,
                found: 3
            })
        ));
    }

    #[test]
    fn test_parse_rejects_unknown_symbol() {
        let text = Level::template(LevelConfig::new(5, 10).unwrap())
            .to_string()
            .replacen('-', "#", 1);
        assert!(matches!(
            text.parse::<Level>(),
            Err(ParseLevelError::UnknownSymbol { symbol: '#' })
        ));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_set_out_of_bounds_panics() {
        let mut level = Level::template(LevelConfig::default());
        level.set(200, 0, Cell::Coin);
    }
}
