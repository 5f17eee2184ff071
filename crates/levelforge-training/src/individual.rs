use std::{borrow::Cow, sync::OnceLock};

use levelforge_engine::{Genome, Level, LevelConfig};
use levelforge_evaluator::{EvaluationError, evaluator::FitnessEvaluator};
use rand::Rng;

use crate::operators;

/// One candidate level: a genome plus its cached decoded level and fitness.
///
/// Both caches are filled on first use and cleared whenever the genome
/// changes, so the evaluator runs at most once per distinct genome. The level
/// cache holds the decoding for the first [`LevelConfig`] asked for; other
/// configurations are decoded on every call.
#[derive(Debug, Clone, Default)]
pub struct Individual {
    genome: Genome,
    fitness: Option<f32>,
    level: OnceLock<Level>,
}

impl Individual {
    /// Wraps a genome, rearranging it into min-heap order by
    /// `(position, kind)`.
    #[must_use]
    pub fn new(genome: Genome) -> Self {
        Self {
            genome: genome.into_heap_order(),
            fitness: None,
            level: OnceLock::new(),
        }
    }

    pub fn random<R>(rng: &mut R, config: &LevelConfig) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::new(Genome::random(rng, config))
    }

    /// An individual whose level is the bare template.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    /// Cached fitness, if it has been computed since the last change.
    #[must_use]
    pub fn fitness(&self) -> Option<f32> {
        self.fitness
    }

    #[must_use]
    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// Returns the decoded level, decoding on first access.
    ///
    /// A request for a configuration other than the cached one is decoded
    /// afresh and returned owned; the cache is left untouched.
    pub fn level(&self, config: &LevelConfig) -> Cow<'_, Level> {
        let level = self.level.get_or_init(|| self.genome.decode(config));
        if level.config() == *config {
            Cow::Borrowed(level)
        } else {
            Cow::Owned(self.genome.decode(config))
        }
    }

    /// Returns the cached fitness or computes and caches it.
    pub fn calculate_fitness<E>(
        &mut self,
        evaluator: &E,
        config: &LevelConfig,
    ) -> Result<f32, EvaluationError>
    where
        E: FitnessEvaluator + ?Sized,
    {
        if let Some(fitness) = self.fitness {
            return Ok(fitness);
        }
        let fitness = evaluator.fitness(&self.level(config))?;
        self.fitness = Some(fitness);
        Ok(fitness)
    }

    /// Applies one [`operators::mutate`] step and clears both caches.
    pub fn mutate<R>(&mut self, rng: &mut R, config: &LevelConfig)
    where
        R: Rng + ?Sized,
    {
        self.genome = operators::mutate(&self.genome, rng, config);
        self.fitness = None;
        self.level = OnceLock::new();
    }

    /// Breeds two children by [`operators::crossover`], mutating each child
    /// once before wrapping it.
    pub fn generate_children<R>(
        &self,
        other: &Self,
        rng: &mut R,
        config: &LevelConfig,
    ) -> (Self, Self)
    where
        R: Rng + ?Sized,
    {
        let (first, second) = operators::crossover(&self.genome, &other.genome, rng);
        let first = operators::mutate(&first, rng, config);
        let second = operators::mutate(&second, rng, config);
        (Self::new(first), Self::new(second))
    }
}
