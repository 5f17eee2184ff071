//! Structural level analyzer built on a simple movement model.
//!
//! The player occupies one passable cell directly above a solid cell
//! ("standing"). From a standing cell the player can:
//!
//! - walk one column left or right, falling straight down if there is no
//!   floor
//! - jump: rise up to [`StructuralAnalyzer::jump_height`] rows, travel up to
//!   [`StructuralAnalyzer::jump_distance`] columns at the apex, then fall
//!
//! Falling below the bottom row loses the player. All six metrics are derived
//! from the standing cells reachable from the start marker.
//!
//! | metric | definition |
//! |---|---|
//! | `solvability` | `1` if the goal area (last two columns) is reachable, else `0` |
//! | `pathPercentage` | columns with a reachable standing cell / width |
//! | `emptyPercentage` | empty cells / all cells |
//! | `negativeSpace` | empty cells within jump height above a reachable standing cell / empty cells |
//! | `linearity` | mean absolute residual of a line fitted to the column surface heights / height |
//! | `meaningfulJumpVariance` | variance of meaningful jumps per 10-column window |
//!
//! A jump is meaningful when a column it passes over has no ground or holds
//! an enemy.

use std::collections::VecDeque;

use levelforge_engine::{Cell, Level};

use crate::{
    EvaluationError,
    evaluator::LevelEvaluator,
    metric::{Measurements, MetricName},
};

/// Evaluates levels by exploring them with a movement model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuralAnalyzer {
    jump_height: usize,
    jump_distance: usize,
    window: usize,
}

impl Default for StructuralAnalyzer {
    fn default() -> Self {
        Self {
            jump_height: 4,
            jump_distance: 4,
            window: 10,
        }
    }
}

impl StructuralAnalyzer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn jump_height(&self) -> usize {
        self.jump_height
    }

    #[must_use]
    pub const fn jump_distance(&self) -> usize {
        self.jump_distance
    }
}

impl LevelEvaluator for StructuralAnalyzer {
    fn evaluate(&self, level: &Level) -> Result<Measurements, EvaluationError> {
        let reach = Reachability::explore(level, self);
        let measurements = [
            (
                MetricName::MeaningfulJumpVariance,
                meaningful_jump_variance(level, &reach, self.window),
            ),
            (MetricName::NegativeSpace, negative_space(level, &reach, self)),
            (MetricName::PathPercentage, path_percentage(level, &reach)),
            (MetricName::EmptyPercentage, empty_percentage(level)),
            (MetricName::Linearity, linearity(level)),
            (MetricName::Solvability, solvability(level, &reach)),
        ];
        Ok(measurements.into_iter().collect())
    }
}

type Position = (usize, usize);

#[derive(Debug, Clone, Copy)]
struct Jump {
    from: Position,
    to: Position,
}

/// Standing cells reachable from the start, plus the jumps that first
/// discovered them.
#[derive(Debug)]
struct Reachability {
    standing: Vec<Position>,
    jumps: Vec<Jump>,
}

impl Reachability {
    fn explore(level: &Level, analyzer: &StructuralAnalyzer) -> Self {
        let width = level.width();
        let mut visited = vec![false; width * level.height()];
        let mut standing = vec![];
        let mut jumps = vec![];
        let mut queue = VecDeque::new();

        if let Some(start) = start_position(level) {
            visited[start.1 * width + start.0] = true;
            queue.push_back(start);
        }

        while let Some(pos) = queue.pop_front() {
            standing.push(pos);
            let moves = walk_targets(level, pos)
                .map(|to| (to, false))
                .chain(jump_targets(level, pos, analyzer).into_iter().map(|to| (to, true)));
            for (to, is_jump) in moves {
                let index = to.1 * width + to.0;
                if visited[index] {
                    continue;
                }
                visited[index] = true;
                if is_jump {
                    jumps.push(Jump { from: pos, to });
                }
                queue.push_back(to);
            }
        }

        Self { standing, jumps }
    }
}

#[expect(clippy::cast_possible_wrap)]
fn to_signed(pos: Position) -> (isize, isize) {
    (pos.0 as isize, pos.1 as isize)
}

fn is_passable(level: &Level, x: isize, y: isize) -> bool {
    level.try_get(x, y).is_some_and(|cell| !cell.is_solid())
}

/// Drops from `(x, y)` until the player stands on something.
///
/// Returns `None` when `(x, y)` is blocked or the fall leaves the level.
fn land(level: &Level, x: isize, mut y: isize) -> Option<Position> {
    if !is_passable(level, x, y) {
        return None;
    }
    loop {
        match level.try_get(x, y + 1) {
            None => return None,
            Some(below) if below.is_solid() => {
                return Some((usize::try_from(x).ok()?, usize::try_from(y).ok()?));
            }
            Some(_) => y += 1,
        }
    }
}

fn start_position(level: &Level) -> Option<Position> {
    let marker = level
        .rows()
        .enumerate()
        .find_map(|(y, row)| row.iter().position(|c| *c == Cell::Start).map(|x| (x, y)));
    let (x, y) = to_signed(marker.unwrap_or((0, 0)));
    land(level, x, y)
}

fn walk_targets(level: &Level, pos: Position) -> impl Iterator<Item = Position> + '_ {
    let (x, y) = to_signed(pos);
    [-1, 1]
        .into_iter()
        .filter_map(move |dx| land(level, x + dx, y))
}

#[expect(clippy::cast_possible_wrap)]
fn jump_targets(level: &Level, pos: Position, analyzer: &StructuralAnalyzer) -> Vec<Position> {
    let (x, y) = to_signed(pos);
    let mut targets = vec![];
    for rise in 1..=analyzer.jump_height {
        let apex = y - rise as isize;
        if !is_passable(level, x, apex) {
            break;
        }
        for dir in [-1, 1] {
            for distance in 1..=analyzer.jump_distance {
                let tx = x + dir * distance as isize;
                if !is_passable(level, tx, apex) {
                    break;
                }
                targets.extend(land(level, tx, apex));
            }
        }
    }
    targets
}

fn is_obstacle_column(level: &Level, x: usize) -> bool {
    let ground = level.height() - 1;
    !level.get(x, ground).is_solid() || (0..ground).any(|y| level.get(x, y) == Cell::Enemy)
}

#[expect(clippy::cast_precision_loss)]
fn meaningful_jump_variance(level: &Level, reach: &Reachability, window: usize) -> f32 {
    let mut counts = vec![0_usize; level.width().div_ceil(window)];
    for jump in &reach.jumps {
        let lo = jump.from.0.min(jump.to.0);
        let hi = jump.from.0.max(jump.to.0);
        if (lo + 1..hi).any(|x| is_obstacle_column(level, x)) {
            counts[jump.from.0 / window] += 1;
        }
    }
    let n = counts.len() as f32;
    let mean = counts.iter().sum::<usize>() as f32 / n;
    counts
        .iter()
        .map(|&c| (c as f32 - mean).powi(2))
        .sum::<f32>()
        / n
}

#[expect(clippy::cast_precision_loss)]
fn negative_space(level: &Level, reach: &Reachability, analyzer: &StructuralAnalyzer) -> f32 {
    let empty = level.cells().filter(|c| c.is_empty()).count();
    if empty == 0 {
        return 0.0;
    }
    let width = level.width();
    let mut covered = vec![false; width * level.height()];
    for &(x, y) in &reach.standing {
        for dy in 0..=analyzer.jump_height.min(y) {
            let y = y - dy;
            if level.get(x, y).is_empty() {
                covered[y * width + x] = true;
            }
        }
    }
    covered.iter().filter(|c| **c).count() as f32 / empty as f32
}

#[expect(clippy::cast_precision_loss)]
fn path_percentage(level: &Level, reach: &Reachability) -> f32 {
    let mut columns = vec![false; level.width()];
    for &(x, _) in &reach.standing {
        columns[x] = true;
    }
    columns.iter().filter(|c| **c).count() as f32 / level.width() as f32
}

#[expect(clippy::cast_precision_loss)]
fn empty_percentage(level: &Level) -> f32 {
    let total = level.width() * level.height();
    level.cells().filter(|c| c.is_empty()).count() as f32 / total as f32
}

fn solvability(level: &Level, reach: &Reachability) -> f32 {
    let goal_area = level.width() - 2;
    if reach.standing.iter().any(|&(x, _)| x >= goal_area) {
        1.0
    } else {
        0.0
    }
}

/// Height of the highest solid cell in each column (`0` for bottomless columns).
fn surface_heights(level: &Level) -> Vec<usize> {
    (0..level.width())
        .map(|x| {
            (0..level.height())
                .find(|&y| level.get(x, y).is_solid())
                .map_or(0, |y| level.height() - y)
        })
        .collect()
}

#[expect(clippy::cast_precision_loss)]
fn linearity(level: &Level) -> f32 {
    let heights = surface_heights(level);
    let n = heights.len() as f32;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = heights.iter().sum::<usize>() as f32 / n;
    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (x, &h) in heights.iter().enumerate() {
        let dx = x as f32 - mean_x;
        sxy += dx * (h as f32 - mean_y);
        sxx += dx * dx;
    }
    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
    let intercept = mean_y - slope * mean_x;
    let residual = heights
        .iter()
        .enumerate()
        .map(|(x, &h)| (h as f32 - (slope * x as f32 + intercept)).abs())
        .sum::<f32>()
        / n;
    residual / level.height() as f32
}

#[cfg(test)]
mod tests {
    use levelforge_engine::{DesignElement, ElementKind, Genome, LevelConfig};

    use super::*;

    fn measure(level: &Level) -> Measurements {
        StructuralAnalyzer::new().evaluate(level).unwrap()
    }

    fn level_with(elements: Vec<DesignElement>) -> Level {
        Genome::new(elements).decode(&LevelConfig::default())
    }

    #[test]
    fn test_flat_level() {
        let level = Level::template(LevelConfig::default());
        let m = measure(&level);

        assert_eq!(m.get(MetricName::Solvability), Some(1.0));
        assert_eq!(m.get(MetricName::PathPercentage), Some(1.0));
        assert_eq!(m.get(MetricName::MeaningfulJumpVariance), Some(0.0));
        let expected_empty = (3200.0 - 209.0) / 3200.0;
        assert!((m.get(MetricName::EmptyPercentage).unwrap() - expected_empty).abs() < 1e-6);
        assert!(m.get(MetricName::Linearity).unwrap() < 0.05);
        let negative = m.get(MetricName::NegativeSpace).unwrap();
        assert!(negative > 0.0 && negative <= 1.0);
        assert_eq!(m.iter().count(), MetricName::ALL.len());
    }

    #[test]
    fn test_wide_hole_is_unsolvable() {
        let level = level_with(vec![DesignElement::new(20, ElementKind::Hole { width: 6 })]);
        let m = measure(&level);
        assert_eq!(m.get(MetricName::Solvability), Some(0.0));
        let path = m.get(MetricName::PathPercentage).unwrap();
        assert!((path - 20.0 / 200.0).abs() < 1e-6, "path = {path}");
    }

    #[test]
    fn test_jumpable_hole_is_meaningful() {
        let level = level_with(vec![DesignElement::new(20, ElementKind::Hole { width: 3 })]);
        let m = measure(&level);
        assert_eq!(m.get(MetricName::Solvability), Some(1.0));
        assert!(m.get(MetricName::MeaningfulJumpVariance).unwrap() > 0.0);
        let path = m.get(MetricName::PathPercentage).unwrap();
        assert!((path - 197.0 / 200.0).abs() < 1e-6, "path = {path}");
    }

    #[test]
    fn test_tall_wall_blocks_goal() {
        // two pipes of height 6 stacked side by side cannot be jumped over
        let level = level_with(vec![
            DesignElement::new(30, ElementKind::Pipe { height: 6 }),
            DesignElement::new(31, ElementKind::Pipe { height: 6 }),
        ]);
        let m = measure(&level);
        assert_eq!(m.get(MetricName::Solvability), Some(0.0));
    }

    #[test]
    fn test_pipes_raise_nonlinearity() {
        let flat = measure(&Level::template(LevelConfig::default()));
        let bumpy = measure(&level_with(
            (0..10)
                .map(|i| DesignElement::new(10 + i * 18, ElementKind::Pipe { height: 2 + i % 4 }))
                .collect(),
        ));
        assert!(
            bumpy.get(MetricName::Linearity).unwrap() > flat.get(MetricName::Linearity).unwrap()
        );
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let level = level_with(vec![
            DesignElement::new(20, ElementKind::Hole { width: 3 }),
            DesignElement::new(40, ElementKind::Enemy),
            DesignElement::new(60, ElementKind::Pipe { height: 4 }),
        ]);
        assert_eq!(measure(&level), measure(&level));
    }

    #[test]
    fn test_level_without_start_marker() {
        let text = Level::template(LevelConfig::new(6, 10).unwrap())
            .to_string()
            .replace('m', "-");
        let level = text.parse::<Level>().unwrap();
        let m = measure(&level);
        assert_eq!(m.get(MetricName::Solvability), Some(1.0));
    }
}
