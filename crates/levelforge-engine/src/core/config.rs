use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Dimensions of a decoded level.
///
/// Every operation that depends on the level size (decoding, random genome
/// generation, parameter clamping) takes a `LevelConfig` explicitly, so levels
/// of different sizes can coexist in the same process.
///
/// # Example
///
/// ```
/// use levelforge_engine::LevelConfig;
///
/// let config = LevelConfig::default();
/// assert_eq!((config.width(), config.height()), (200, 16));
///
/// assert!(LevelConfig::new(3, 16).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLevelConfig", into = "RawLevelConfig")]
pub struct LevelConfig {
    width: usize,
    height: usize,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl LevelConfig {
    pub const DEFAULT: Self = Self {
        width: 200,
        height: 16,
    };

    /// Smallest width that leaves at least two interior columns.
    pub const MIN_WIDTH: usize = 4;
    /// Smallest height that fits the goal structure (flag top, pole, base).
    pub const MIN_HEIGHT: usize = 10;

    /// Creates a validated configuration.
    pub fn new(width: usize, height: usize) -> Result<Self, ConfigError> {
        if width < Self::MIN_WIDTH {
            return Err(ConfigError::TooNarrow {
                width,
                min: Self::MIN_WIDTH,
            });
        }
        if height < Self::MIN_HEIGHT {
            return Err(ConfigError::TooShort {
                height,
                min: Self::MIN_HEIGHT,
            });
        }
        Ok(Self { width, height })
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Row index of the ground row.
    #[must_use]
    pub const fn ground_row(&self) -> usize {
        self.height - 1
    }

    /// Columns an element may write to. The outermost columns hold the
    /// start and goal markers.
    #[must_use]
    pub const fn interior_columns(&self) -> RangeInclusive<usize> {
        1..=self.width - 2
    }

    #[must_use]
    pub fn clamp_column(&self, x: isize) -> usize {
        let x = usize::try_from(x).unwrap_or(0);
        x.clamp(1, self.width - 2)
    }

    /// Valid range of element positions.
    #[must_use]
    pub const fn position_range(&self) -> RangeInclusive<usize> {
        0..=self.width - 1
    }

    /// Valid rows (counted from the top) for coins and blocks.
    #[must_use]
    pub const fn item_row_range(&self) -> RangeInclusive<usize> {
        1..=self.height - 3
    }

    /// Valid platform offsets (counted upwards from the ground row).
    #[must_use]
    pub const fn platform_offset_range(&self) -> RangeInclusive<usize> {
        2..=self.height - 4
    }
}

#[derive(Serialize, Deserialize)]
struct RawLevelConfig {
    width: usize,
    height: usize,
}

impl TryFrom<RawLevelConfig> for LevelConfig {
    type Error = ConfigError;

    fn try_from(raw: RawLevelConfig) -> Result<Self, Self::Error> {
        Self::new(raw.width, raw.height)
    }
}

impl From<LevelConfig> for RawLevelConfig {
    fn from(config: LevelConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_degenerate_sizes() {
        assert!(matches!(
            LevelConfig::new(3, 16),
            Err(ConfigError::TooNarrow { width: 3, .. })
        ));
        assert!(matches!(
            LevelConfig::new(20, 9),
            Err(ConfigError::TooShort { height: 9, .. })
        ));
        assert!(LevelConfig::new(4, 10).is_ok());
    }

    #[test]
    fn test_clamp_column_keeps_border_free() {
        let config = LevelConfig::new(10, 16).unwrap();
        assert_eq!(config.clamp_column(-3), 1);
        assert_eq!(config.clamp_column(0), 1);
        assert_eq!(config.clamp_column(5), 5);
        assert_eq!(config.clamp_column(9), 8);
        assert_eq!(config.clamp_column(42), 8);
    }

    #[test]
    fn test_parameter_ranges_follow_height() {
        let config = LevelConfig::default();
        assert_eq!(config.item_row_range(), 1..=13);
        assert_eq!(config.platform_offset_range(), 2..=12);
        assert_eq!(config.position_range(), 0..=199);
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: LevelConfig = serde_json::from_str(r#"{"width":30,"height":12}"#).unwrap();
        assert_eq!(ok.width(), 30);
        assert!(serde_json::from_str::<LevelConfig>(r#"{"width":30,"height":2}"#).is_err());
    }
}
