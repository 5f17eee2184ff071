//! Evaluator traits connecting decoded levels to fitness scores.

use levelforge_engine::Level;

use crate::{
    EvaluationError,
    metric::{FitnessWeights, Measurements},
};

/// Computes named measurements for a decoded level.
///
/// Implementations must be deterministic: the same level always yields the
/// same measurements, so that fitness values can be cached.
pub trait LevelEvaluator: Send + Sync {
    fn evaluate(&self, level: &Level) -> Result<Measurements, EvaluationError>;
}

impl<E> LevelEvaluator for &E
where
    E: LevelEvaluator + ?Sized,
{
    fn evaluate(&self, level: &Level) -> Result<Measurements, EvaluationError> {
        (**self).evaluate(level)
    }
}

/// Computes the scalar fitness of a decoded level.
///
/// Higher is better.
pub trait FitnessEvaluator: Send + Sync {
    fn fitness(&self, level: &Level) -> Result<f32, EvaluationError>;
}

impl<E> FitnessEvaluator for &E
where
    E: FitnessEvaluator + ?Sized,
{
    fn fitness(&self, level: &Level) -> Result<f32, EvaluationError> {
        (**self).fitness(level)
    }
}

/// Fitness as a weighted sum of the measurements of a [`LevelEvaluator`].
#[derive(Debug, Clone, Default)]
pub struct WeightedFitness<E> {
    evaluator: E,
    weights: FitnessWeights,
}

impl<E> WeightedFitness<E> {
    #[must_use]
    pub fn new(evaluator: E, weights: FitnessWeights) -> Self {
        Self { evaluator, weights }
    }

    #[must_use]
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    #[must_use]
    pub fn weights(&self) -> &FitnessWeights {
        &self.weights
    }
}

impl<E> WeightedFitness<E>
where
    E: LevelEvaluator,
{
    /// Returns the measurements together with the fitness derived from them.
    pub fn evaluate(&self, level: &Level) -> Result<(Measurements, f32), EvaluationError> {
        let measurements = self.evaluator.evaluate(level)?;
        let fitness = self.weights.combine(&measurements)?;
        if !fitness.is_finite() {
            return Err(EvaluationError::NonFinite { fitness });
        }
        Ok((measurements, fitness))
    }
}

impl<E> FitnessEvaluator for WeightedFitness<E>
where
    E: LevelEvaluator,
{
    fn fitness(&self, level: &Level) -> Result<f32, EvaluationError> {
        self.evaluate(level).map(|(_, fitness)| fitness)
    }
}
