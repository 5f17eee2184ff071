use std::ops::RangeInclusive;

use rand::{Rng, seq::IndexedRandom as _};
use serde::{Deserialize, Serialize};

use crate::core::{Cell, Level, LevelConfig};

/// Surface material of a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    Solid,
    Breakable,
    Question,
}

impl Material {
    pub const ALL: [Self; 3] = [Self::Solid, Self::Breakable, Self::Question];

    #[must_use]
    pub const fn cell(self) -> Cell {
        match self {
            Self::Solid => Cell::Solid,
            Self::Breakable => Cell::Breakable,
            Self::Question => Cell::Question,
        }
    }
}

/// Horizontal direction a staircase climbs towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    #[must_use]
    pub const fn step(self) -> isize {
        match self {
            Self::Left => -1,
            Self::Right => 1,
        }
    }

    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Kind-specific parameters of a design element.
///
/// Variant order is the tie-break order used when two elements share a
/// position during decoding: holes are painted first, pipes last.
///
/// Heights of coins and (question) blocks are row indices counted from the
/// top of the level; platform offsets are counted upwards from the ground row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementKind {
    Hole {
        width: usize,
    },
    Platform {
        width: usize,
        height_offset: usize,
        material: Material,
    },
    Enemy,
    Coin {
        height: usize,
    },
    Block {
        height: usize,
        moving: bool,
    },
    QuestionBlock {
        height: usize,
        powerup: bool,
    },
    Stairs {
        height: usize,
        direction: Direction,
    },
    Pipe {
        height: usize,
    },
}

impl ElementKind {
    pub const HOLE_WIDTH: RangeInclusive<usize> = 1..=6;
    pub const PLATFORM_WIDTH: RangeInclusive<usize> = 1..=8;
    pub const STAIRS_HEIGHT: RangeInclusive<usize> = 2..=6;
    pub const PIPE_HEIGHT: RangeInclusive<usize> = 2..=6;

    /// Position of this kind in the decoding tie-break order.
    #[must_use]
    pub const fn order(&self) -> u8 {
        match self {
            Self::Hole { .. } => 0,
            Self::Platform { .. } => 1,
            Self::Enemy => 2,
            Self::Coin { .. } => 3,
            Self::Block { .. } => 4,
            Self::QuestionBlock { .. } => 5,
            Self::Stairs { .. } => 6,
            Self::Pipe { .. } => 7,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Hole { .. } => "hole",
            Self::Platform { .. } => "platform",
            Self::Enemy => "enemy",
            Self::Coin { .. } => "coin",
            Self::Block { .. } => "block",
            Self::QuestionBlock { .. } => "qblock",
            Self::Stairs { .. } => "stairs",
            Self::Pipe { .. } => "pipe",
        }
    }

    /// Clamps every numeric parameter into its documented range.
    #[must_use]
    pub fn clamped(self, config: &LevelConfig) -> Self {
        let clamp = |value: usize, range: RangeInclusive<usize>| {
            value.clamp(*range.start(), *range.end())
        };
        match self {
            Self::Hole { width } => Self::Hole {
                width: clamp(width, Self::HOLE_WIDTH),
            },
            Self::Platform {
                width,
                height_offset,
                material,
            } => Self::Platform {
                width: clamp(width, Self::PLATFORM_WIDTH),
                height_offset: clamp(height_offset, config.platform_offset_range()),
                material,
            },
            Self::Enemy => Self::Enemy,
            Self::Coin { height } => Self::Coin {
                height: clamp(height, config.item_row_range()),
            },
            Self::Block { height, moving } => Self::Block {
                height: clamp(height, config.item_row_range()),
                moving,
            },
            Self::QuestionBlock { height, powerup } => Self::QuestionBlock {
                height: clamp(height, config.item_row_range()),
                powerup,
            },
            Self::Stairs { height, direction } => Self::Stairs {
                height: clamp(height, Self::STAIRS_HEIGHT),
                direction,
            },
            Self::Pipe { height } => Self::Pipe {
                height: clamp(height, Self::PIPE_HEIGHT),
            },
        }
    }

    /// Whether every numeric parameter lies in its documented range.
    #[must_use]
    pub fn is_within_bounds(&self, config: &LevelConfig) -> bool {
        *self == self.clamped(config)
    }
}

/// One placeable level feature: a column plus kind-specific parameters.
///
/// The derived ordering compares the position first, then the kind order,
/// then the parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DesignElement {
    position: usize,
    #[serde(flatten)]
    kind: ElementKind,
}

impl DesignElement {
    #[must_use]
    pub const fn new(position: usize, kind: ElementKind) -> Self {
        Self { position, kind }
    }

    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub const fn kind(&self) -> &ElementKind {
        &self.kind
    }

    /// Returns the same element at the same position with different parameters.
    #[must_use]
    pub const fn with_kind(self, kind: ElementKind) -> Self {
        Self { kind, ..self }
    }

    /// Key used to order elements for decoding.
    #[must_use]
    pub const fn paint_order(&self) -> (usize, u8) {
        (self.position, self.kind.order())
    }

    /// Clamps the position and every parameter into range.
    #[must_use]
    pub fn clamped(self, config: &LevelConfig) -> Self {
        let positions = config.position_range();
        Self {
            position: self.position.clamp(*positions.start(), *positions.end()),
            kind: self.kind.clamped(config),
        }
    }

    #[must_use]
    pub fn is_within_bounds(&self, config: &LevelConfig) -> bool {
        config.position_range().contains(&self.position) && self.kind.is_within_bounds(config)
    }

    /// Creates a random element in an interior column.
    pub fn random<R>(rng: &mut R, config: &LevelConfig) -> Self
    where
        R: Rng + ?Sized,
    {
        let position = rng.random_range(config.interior_columns());
        let choice: f64 = rng.random();
        let kind = if choice < 0.1 {
            ElementKind::Hole {
                width: rng.random_range(1..=4),
            }
        } else if choice < 0.2 {
            ElementKind::Platform {
                width: rng.random_range(3..=7),
                height_offset: rng.random_range(3..=10),
                material: *Material::ALL.choose(rng).unwrap_or(&Material::Solid),
            }
        } else if choice < 0.35 {
            ElementKind::Enemy
        } else if choice < 0.5 {
            ElementKind::Coin {
                height: rng.random_range(3..=10),
            }
        } else if choice < 0.65 {
            ElementKind::Block {
                height: rng.random_range(3..=10),
                moving: rng.random(),
            }
        } else if choice < 0.8 {
            ElementKind::QuestionBlock {
                height: rng.random_range(3..=10),
                powerup: rng.random(),
            }
        } else if choice < 0.9 {
            ElementKind::Stairs {
                height: rng.random_range(ElementKind::STAIRS_HEIGHT),
                direction: if rng.random() {
                    Direction::Right
                } else {
                    Direction::Left
                },
            }
        } else {
            ElementKind::Pipe {
                height: rng.random_range(ElementKind::PIPE_HEIGHT),
            }
        };
        Self::new(position, kind).clamped(config)
    }

    /// Paints this element onto `level`.
    ///
    /// The anchor column is clamped into the interior first and every other
    /// column is offset from it, then clamped again, so the start and goal
    /// columns are never overwritten. Rows are clamped into the grid.
    pub fn paint(&self, level: &mut Level) {
        let config = level.config();
        let x = self.position.clamp(1, config.width() - 2);
        #[expect(clippy::cast_possible_wrap)]
        let column = |offset: isize| config.clamp_column(x as isize + offset);
        let ground = config.ground_row();
        let row = |y: usize| y.min(ground);

        match self.kind {
            ElementKind::Hole { width } => {
                for dx in 0..width {
                    #[expect(clippy::cast_possible_wrap)]
                    level.set(column(dx as isize), ground, Cell::Empty);
                }
            }
            ElementKind::Platform {
                width,
                height_offset,
                material,
            } => {
                let y = ground.saturating_sub(height_offset);
                for dx in 0..width {
                    #[expect(clippy::cast_possible_wrap)]
                    level.set(column(dx as isize), y, material.cell());
                }
            }
            ElementKind::Enemy => level.set(x, ground - 1, Cell::Enemy),
            ElementKind::Coin { height } => level.set(x, row(height), Cell::Coin),
            ElementKind::Block { height, moving } => {
                let cell = if moving { Cell::Breakable } else { Cell::Solid };
                level.set(x, row(height), cell);
            }
            ElementKind::QuestionBlock { height, powerup } => {
                let cell = if powerup { Cell::PowerUp } else { Cell::Question };
                level.set(x, row(height), cell);
            }
            ElementKind::Stairs { height, direction } => {
                for step in 0..height {
                    #[expect(clippy::cast_possible_wrap)]
                    let bx = column(step as isize * direction.step());
                    for dy in 0..=step.min(ground) {
                        level.set(bx, ground - dy, Cell::Solid);
                    }
                }
            }
            ElementKind::Pipe { height } => {
                let height = height.min(ground);
                for dy in 0..height {
                    level.set(x, ground - dy, Cell::PipeBody);
                }
                level.set(x, ground - height, Cell::PipeTop);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_ordering_by_position_then_kind() {
        let coin = DesignElement::new(5, ElementKind::Coin { height: 3 });
        let hole = DesignElement::new(5, ElementKind::Hole { width: 2 });
        let pipe = DesignElement::new(4, ElementKind::Pipe { height: 3 });
        let mut elements = vec![coin, hole, pipe];
        elements.sort();
        assert_eq!(elements, vec![pipe, hole, coin]);
        assert!(hole.paint_order() < coin.paint_order());
    }

    #[test]
    fn test_clamped_parameters() {
        let config = LevelConfig::default();
        let element = DesignElement::new(
            500,
            ElementKind::Platform {
                width: 0,
                height_offset: 99,
                material: Material::Question,
            },
        )
        .clamped(&config);
        assert_eq!(element.position(), 199);
        assert_eq!(
            *element.kind(),
            ElementKind::Platform {
                width: 1,
                height_offset: 12,
                material: Material::Question,
            }
        );
        assert!(element.is_within_bounds(&config));
        assert!(!ElementKind::Coin { height: 0 }.is_within_bounds(&config));
    }

    #[test]
    fn test_random_elements_are_within_bounds() {
        let mut rng = Pcg32::seed_from_u64(7);
        for config in [
            LevelConfig::default(),
            LevelConfig::new(12, 10).unwrap(),
        ] {
            for _ in 0..2000 {
                let element = DesignElement::random(&mut rng, &config);
                assert!(element.is_within_bounds(&config), "{element:?}");
                assert!(config.interior_columns().contains(&element.position()));
            }
        }
    }

    #[test]
    fn test_random_platforms_use_every_material() {
        let config = LevelConfig::default();
        let mut rng = Pcg32::seed_from_u64(19);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..2000 {
            if let ElementKind::Platform { material, .. } =
                *DesignElement::random(&mut rng, &config).kind()
            {
                seen.insert(material);
            }
        }
        assert_eq!(seen.len(), Material::ALL.len());
    }

    #[test]
    fn test_serde_layout() {
        let element = DesignElement::new(
            12,
            ElementKind::Stairs {
                height: 4,
                direction: Direction::Left,
            },
        );
        let json = serde_json::to_string(&element).unwrap();
        assert_eq!(
            json,
            r#"{"position":12,"kind":"stairs","height":4,"direction":"left"}"#
        );
        let enemy: DesignElement =
            serde_json::from_str(r#"{"position":3,"kind":"enemy"}"#).unwrap();
        assert_eq!(enemy, DesignElement::new(3, ElementKind::Enemy));
    }

    #[test]
    fn test_pipe_paints_body_and_top() {
        let config = LevelConfig::default();
        let mut level = Level::template(config);
        DesignElement::new(10, ElementKind::Pipe { height: 3 }).paint(&mut level);
        assert_eq!(level.get(10, 15), Cell::PipeBody);
        assert_eq!(level.get(10, 14), Cell::PipeBody);
        assert_eq!(level.get(10, 13), Cell::PipeBody);
        assert_eq!(level.get(10, 12), Cell::PipeTop);
        assert_eq!(level.get(10, 11), Cell::Empty);
    }

    #[test]
    fn test_stairs_climb_in_direction() {
        let config = LevelConfig::default();
        let mut level = Level::template(config);
        DesignElement::new(
            20,
            ElementKind::Stairs {
                height: 3,
                direction: Direction::Left,
            },
        )
        .paint(&mut level);
        // step i occupies i + 1 cells at column 20 - i
        for (x, steps) in [(20, 1), (19, 2), (18, 3)] {
            for dy in 0..steps {
                assert_eq!(level.get(x, 15 - dy), Cell::Solid, "({x}, {dy})");
            }
            assert_eq!(level.get(x, 15 - steps), Cell::Empty, "above ({x})");
        }
    }

    #[test]
    fn test_border_columns_are_never_painted() {
        let config = LevelConfig::default();
        let mut level = Level::template(config);
        DesignElement::new(0, ElementKind::Coin { height: 14 }).paint(&mut level);
        DesignElement::new(199, ElementKind::Enemy).paint(&mut level);
        DesignElement::new(
            198,
            ElementKind::Platform {
                width: 5,
                height_offset: 8,
                material: Material::Solid,
            },
        )
        .paint(&mut level);
        assert_eq!(level.get(0, 14), Cell::Start);
        assert_eq!(level.get(1, 14), Cell::Coin);
        assert_eq!(level.get(198, 14), Cell::Enemy);
        assert_eq!(level.get(199, 14), Cell::Solid);
        assert_eq!(level.get(198, 7), Cell::Solid);
        assert_eq!(level.get(199, 7), Cell::FlagTop);
    }
}
