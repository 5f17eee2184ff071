//! Population management and generational replacement.
//!
//! Each generation is built from the previous one in three steps:
//!
//! 1. **Ranking** - individuals are sorted by cached fitness, best first
//! 2. **Elitism** - the top `⌈elite_percent · N / 100⌉` individuals move into
//!    the next generation untouched, keeping their cached fitness and level
//! 3. **Breeding** - the rest is filled with children of tournament winners
//!    (see [`Individual::generate_children`]); each child additionally
//!    receives one more mutation with probability `mutation_rate`
//!
//! Fitness is never computed here. Evaluating a population is the job of
//! [`EvaluationPool`](crate::pool::EvaluationPool); breeding an unevaluated
//! population is reported as an [`UnevaluatedIndividualError`].

use levelforge_engine::LevelConfig;
use rand::{Rng, seq::IndexedRandom as _};

use crate::{UnevaluatedIndividualError, individual::Individual};

/// An ordered collection of individuals sharing one level configuration.
#[derive(Debug, Clone, Default)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    /// Probability that an initial individual starts from a random genome
    /// rather than an empty one.
    pub const RANDOM_RATIO: f64 = 0.9;

    #[must_use]
    pub fn new(individuals: Vec<Individual>) -> Self {
        Self { individuals }
    }

    /// Creates the initial population: each individual is random with
    /// probability [`Self::RANDOM_RATIO`], otherwise empty.
    pub fn random<R>(count: usize, rng: &mut R, config: &LevelConfig) -> Self
    where
        R: Rng + ?Sized,
    {
        let individuals = (0..count)
            .map(|_| {
                if rng.random_bool(Self::RANDOM_RATIO) {
                    Individual::random(rng, config)
                } else {
                    Individual::empty()
                }
            })
            .collect();
        Self { individuals }
    }

    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    #[must_use]
    pub fn into_individuals(self) -> Vec<Individual> {
        self.individuals
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Returns the first individual; the best one once the population is ranked.
    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        self.individuals.first()
    }

    /// Sorts individuals by fitness in descending order.
    ///
    /// The sort is stable, so individuals with equal fitness keep their
    /// relative order.
    pub fn rank(&mut self) -> Result<(), UnevaluatedIndividualError> {
        if let Some(index) = self.individuals.iter().position(|ind| !ind.is_evaluated()) {
            return Err(UnevaluatedIndividualError { index });
        }
        self.individuals
            .sort_by(|a, b| ranked_fitness(b).total_cmp(&ranked_fitness(a)));
        Ok(())
    }

    /// Computes statistics of the cached fitness values.
    ///
    /// Returns `None` if no individual has been evaluated.
    #[must_use]
    pub fn fitness_stats(&self) -> Option<FitnessStats> {
        FitnessStats::new(self.individuals.iter().filter_map(Individual::fitness))
    }
}

impl FromIterator<Individual> for Population {
    fn from_iter<T: IntoIterator<Item = Individual>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

fn ranked_fitness(individual: &Individual) -> f32 {
    individual.fitness().unwrap_or(f32::NEG_INFINITY)
}

/// Summary of the fitness distribution of a population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessStats {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
}

impl FitnessStats {
    /// Returns `None` for an empty input.
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f32>,
    {
        let mut count = 0_u32;
        let mut sum = 0.0_f64;
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for value in values {
            count += 1;
            sum += f64::from(value);
            min = min.min(value);
            max = max.max(value);
        }
        if count == 0 {
            return None;
        }
        #[expect(clippy::cast_possible_truncation)]
        let mean = (sum / f64::from(count)) as f32;
        Some(Self { min, max, mean })
    }
}

/// Parameters of generational replacement.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationEvolver {
    /// Share of the population carried over unchanged, in percent (rounded up)
    pub elite_percent: usize,
    /// Number of individuals sampled per tournament
    pub tournament_size: usize,
    /// Probability of one extra mutation per child
    pub mutation_rate: f64,
}

impl Default for PopulationEvolver {
    fn default() -> Self {
        Self {
            elite_percent: 10,
            tournament_size: 5,
            mutation_rate: 0.1,
        }
    }
}

impl PopulationEvolver {
    /// Number of elites kept for a population of `size`.
    ///
    /// ```
    /// use levelforge_training::genetic::PopulationEvolver;
    ///
    /// let evolver = PopulationEvolver::default();
    /// assert_eq!(evolver.elite_count(10), 1);
    /// assert_eq!(evolver.elite_count(15), 2);
    /// assert_eq!(evolver.elite_count(480), 48);
    /// ```
    #[must_use]
    pub fn elite_count(&self, size: usize) -> usize {
        (size * self.elite_percent).div_ceil(100).min(size)
    }

    /// Builds the next generation from a fully evaluated population.
    ///
    /// The result has the same size as the input and starts with the elites
    /// in rank order. Elites are moved, not copied, so their caches survive.
    pub fn generate_successors<R>(
        &self,
        mut population: Population,
        rng: &mut R,
        config: &LevelConfig,
    ) -> Result<Population, UnevaluatedIndividualError>
    where
        R: Rng + ?Sized,
    {
        population.rank()?;
        let size = population.len();
        let elite_count = self.elite_count(size);

        let mut children = Vec::with_capacity(size - elite_count + 1);
        while elite_count + children.len() < size {
            let p1 = tournament_select(&population.individuals, self.tournament_size, rng);
            let p2 = tournament_select(&population.individuals, self.tournament_size, rng);
            let (first, second) = p1.generate_children(p2, rng, config);
            for mut child in [first, second] {
                if rng.random_bool(self.mutation_rate) {
                    child.mutate(rng, config);
                }
                children.push(child);
            }
        }
        children.truncate(size - elite_count);

        let mut individuals = population.into_individuals();
        individuals.truncate(elite_count);
        individuals.extend(children);
        Ok(Population::new(individuals))
    }
}

/// Samples `tournament_size` distinct individuals and returns the fittest.
fn tournament_select<'a, R>(
    individuals: &'a [Individual],
    tournament_size: usize,
    rng: &mut R,
) -> &'a Individual
where
    R: Rng + ?Sized,
{
    assert!(tournament_size > 0);
    individuals
        .choose_multiple(rng, tournament_size)
        .max_by(|a, b| ranked_fitness(a).total_cmp(&ranked_fitness(b)))
        .unwrap()
}
