//! Genome variation operators.
//!
//! - [`mutate`]: perturbs one parameter of one element by a single discrete
//!   step, or flips one boolean flag
//! - [`crossover`]: cut-and-splice recombination of two genomes with
//!   independent cut points
//!
//! Both are pure: the inputs are left untouched and new genomes are returned.
//! All randomness comes from the caller's generator, so a seeded generator
//! reproduces the same sequence of offspring.

use std::ops::RangeInclusive;

use levelforge_engine::{ElementKind, Genome, LevelConfig};
use rand::Rng;

/// Returns a copy of `genome` with exactly one parameter of one randomly
/// chosen element changed.
///
/// Numeric parameters move by `±1` and stay inside their range (a step past a
/// bound leaves the value at the bound). Boolean flags and the stairs
/// direction are flipped. Platform materials are fixed and enemies carry no
/// parameter, so mutating an enemy leaves the genome unchanged.
///
/// Element kinds and positions never change, and the result has the same
/// length as the input. An empty genome is returned as is.
///
/// ```
/// use levelforge_engine::{DesignElement, ElementKind, Genome, LevelConfig};
/// use levelforge_training::operators;
///
/// let config = LevelConfig::default();
/// let genome = Genome::new(vec![DesignElement::new(10, ElementKind::Pipe { height: 4 })]);
/// let mutated = operators::mutate(&genome, &mut rand::rng(), &config);
///
/// let ElementKind::Pipe { height } = *mutated.elements()[0].kind() else {
///     unreachable!();
/// };
/// assert!(height == 3 || height == 5);
/// ```
pub fn mutate<R>(genome: &Genome, rng: &mut R, config: &LevelConfig) -> Genome
where
    R: Rng + ?Sized,
{
    let mut mutated = genome.clone();
    if genome.is_empty() {
        return mutated;
    }
    let index = rng.random_range(0..genome.len());
    let element = genome.elements()[index];
    let kind = mutate_kind(*element.kind(), rng, config);
    mutated.replace(index, element.with_kind(kind));
    mutated
}

fn mutate_kind<R>(kind: ElementKind, rng: &mut R, config: &LevelConfig) -> ElementKind
where
    R: Rng + ?Sized,
{
    match kind {
        ElementKind::Hole { width } => ElementKind::Hole {
            width: step(width, ElementKind::HOLE_WIDTH, rng),
        },
        ElementKind::Platform {
            width,
            height_offset,
            material,
        } => {
            if rng.random_bool(0.5) {
                ElementKind::Platform {
                    width: step(width, ElementKind::PLATFORM_WIDTH, rng),
                    height_offset,
                    material,
                }
            } else {
                ElementKind::Platform {
                    width,
                    height_offset: step(height_offset, config.platform_offset_range(), rng),
                    material,
                }
            }
        }
        ElementKind::Enemy => ElementKind::Enemy,
        ElementKind::Coin { height } => ElementKind::Coin {
            height: step(height, config.item_row_range(), rng),
        },
        ElementKind::Block { height, moving } => {
            if rng.random_bool(0.5) {
                ElementKind::Block {
                    height: step(height, config.item_row_range(), rng),
                    moving,
                }
            } else {
                ElementKind::Block {
                    height,
                    moving: !moving,
                }
            }
        }
        ElementKind::QuestionBlock { height, powerup } => {
            if rng.random_bool(0.5) {
                ElementKind::QuestionBlock {
                    height: step(height, config.item_row_range(), rng),
                    powerup,
                }
            } else {
                ElementKind::QuestionBlock {
                    height,
                    powerup: !powerup,
                }
            }
        }
        ElementKind::Stairs { height, direction } => {
            if rng.random_bool(0.5) {
                ElementKind::Stairs {
                    height: step(height, ElementKind::STAIRS_HEIGHT, rng),
                    direction,
                }
            } else {
                ElementKind::Stairs {
                    height,
                    direction: direction.reversed(),
                }
            }
        }
        ElementKind::Pipe { height } => ElementKind::Pipe {
            height: step(height, ElementKind::PIPE_HEIGHT, rng),
        },
    }
}

fn step<R>(value: usize, range: RangeInclusive<usize>, rng: &mut R) -> usize
where
    R: Rng + ?Sized,
{
    let value = if rng.random_bool(0.5) {
        value.saturating_add(1)
    } else {
        value.saturating_sub(1)
    };
    value.clamp(*range.start(), *range.end())
}

/// Recombines two genomes at independently drawn cut points.
///
/// With `pa` drawn from `0..=a.len()` and `pb` from `0..=b.len()`, the
/// children are `a[..pa] ++ b[pb..]` and `b[..pb] ++ a[pa..]`. Together they
/// hold every element of both parents exactly once, so their lengths sum to
/// `a.len() + b.len()`. Empty parents are allowed.
pub fn crossover<R>(a: &Genome, b: &Genome, rng: &mut R) -> (Genome, Genome)
where
    R: Rng + ?Sized,
{
    let pa = rng.random_range(0..=a.len());
    let pb = rng.random_range(0..=b.len());
    let (a_head, a_tail) = a.elements().split_at(pa);
    let (b_head, b_tail) = b.elements().split_at(pb);
    let first = a_head.iter().chain(b_tail).copied().collect();
    let second = b_head.iter().chain(a_tail).copied().collect();
    (first, second)
}
