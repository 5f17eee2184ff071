use std::{cmp::Reverse, collections::BinaryHeap};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    core::{Level, LevelConfig},
    element::DesignElement,
};

/// Ordered collection of design elements describing one candidate level.
///
/// Sequence order matters to crossover (split points cut the sequence) but
/// not to decoding, which re-sorts elements by `(position, kind order)`.
/// Elements tied on that key are painted in sequence order, so the later one
/// wins any shared cell.
///
/// # Example
///
/// ```
/// use levelforge_engine::{Cell, DesignElement, ElementKind, Genome, LevelConfig};
///
/// let config = LevelConfig::default();
/// let genome = Genome::new(vec![DesignElement::new(5, ElementKind::Hole { width: 3 })]);
/// let level = genome.decode(&config);
///
/// assert_eq!(level.get(4, 15), Cell::Solid);
/// assert!((5..8).all(|x| level.get(x, 15) == Cell::Empty));
/// assert_eq!(level.get(8, 15), Cell::Solid);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genome {
    elements: Vec<DesignElement>,
}

impl Genome {
    /// Smallest and largest element count of a random genome.
    pub const RANDOM_LEN: std::ops::RangeInclusive<usize> = 20..=60;

    #[must_use]
    pub const fn new(elements: Vec<DesignElement>) -> Self {
        Self { elements }
    }

    #[must_use]
    pub const fn empty() -> Self {
        Self { elements: vec![] }
    }

    /// Creates a genome of 20 to 60 random elements.
    pub fn random<R>(rng: &mut R, config: &LevelConfig) -> Self
    where
        R: Rng + ?Sized,
    {
        let count = rng.random_range(Self::RANDOM_LEN);
        (0..count)
            .map(|_| DesignElement::random(rng, config))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[must_use]
    pub fn elements(&self) -> &[DesignElement] {
        &self.elements
    }

    #[must_use]
    pub fn into_elements(self) -> Vec<DesignElement> {
        self.elements
    }

    /// Replaces the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn replace(&mut self, index: usize, element: DesignElement) {
        self.elements[index] = element;
    }

    /// Clamps every element into range (e.g. after loading from a file).
    #[must_use]
    pub fn clamped(self, config: &LevelConfig) -> Self {
        self.elements
            .into_iter()
            .map(|e| e.clamped(config))
            .collect()
    }

    /// Rearranges the elements into binary min-heap order.
    ///
    /// After the call `elements[i] <= elements[2i + 1]` and
    /// `elements[i] <= elements[2i + 2]` hold under the element ordering.
    #[must_use]
    pub fn into_heap_order(self) -> Self {
        let heap = self
            .elements
            .into_iter()
            .map(Reverse)
            .collect::<BinaryHeap<_>>();
        heap.into_vec().into_iter().map(|Reverse(e)| e).collect()
    }

    /// Decodes the genome into a level.
    ///
    /// Starts from [`Level::template`] and paints every element in
    /// `(position, kind order)` order; later writes overwrite earlier ones.
    #[must_use]
    pub fn decode(&self, config: &LevelConfig) -> Level {
        let mut level = Level::template(*config);
        let mut sorted = self.elements.iter().collect::<Vec<_>>();
        sorted.sort_by_key(|e| e.paint_order());
        for element in sorted {
            element.paint(&mut level);
        }
        level
    }
}

impl From<Vec<DesignElement>> for Genome {
    fn from(elements: Vec<DesignElement>) -> Self {
        Self::new(elements)
    }
}

impl FromIterator<DesignElement> for Genome {
    fn from_iter<T: IntoIterator<Item = DesignElement>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
