use std::{any::Any, num::NonZeroUsize, thread};

use levelforge_engine::LevelConfig;
use levelforge_evaluator::{EvaluationError, evaluator::FitnessEvaluator};

use crate::genetic::Population;

/// Fixed-size worker pool computing fitness for disjoint batches in parallel.
///
/// A population of `N` individuals is cut into consecutive batches of
/// `⌈N / workers⌉`. Each batch is moved into its own scoped thread and handed
/// back with fitness filled in; the batches are reassembled in input order.
/// Individuals that already carry a fitness are not sent to the evaluator
/// again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationPool {
    workers: NonZeroUsize,
}

impl Default for EvaluationPool {
    fn default() -> Self {
        Self::new(thread::available_parallelism().unwrap_or(NonZeroUsize::MIN))
    }
}

impl EvaluationPool {
    #[must_use]
    pub const fn new(workers: NonZeroUsize) -> Self {
        Self { workers }
    }

    #[must_use]
    pub const fn workers(&self) -> usize {
        self.workers.get()
    }

    /// Number of individuals per batch for a population of `count`.
    #[must_use]
    pub const fn batch_size(&self, count: usize) -> usize {
        let size = count.div_ceil(self.workers.get());
        if size == 0 { 1 } else { size }
    }

    /// Evaluates every individual, blocking until all batches have returned.
    ///
    /// The first evaluation error in batch order is returned. A panicking
    /// worker is reported as [`EvaluationError::Failed`].
    pub fn evaluate<E>(
        &self,
        population: Population,
        evaluator: &E,
        config: &LevelConfig,
    ) -> Result<Population, EvaluationError>
    where
        E: FitnessEvaluator + ?Sized,
    {
        let count = population.len();
        let batch_size = self.batch_size(count);
        let mut individuals = population.into_individuals().into_iter();
        let mut batches = vec![];
        loop {
            let batch = individuals.by_ref().take(batch_size).collect::<Vec<_>>();
            if batch.is_empty() {
                break;
            }
            batches.push(batch);
        }

        let results = thread::scope(|s| {
            let handles = batches
                .into_iter()
                .map(|mut batch| {
                    s.spawn(move || -> Result<_, EvaluationError> {
                        for individual in &mut batch {
                            individual.calculate_fitness(evaluator, config)?;
                        }
                        Ok(batch)
                    })
                })
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(thread::ScopedJoinHandle::join)
                .collect::<Vec<_>>()
        });

        let mut evaluated = Vec::with_capacity(count);
        for result in results {
            let batch = result.map_err(|payload| EvaluationError::Failed {
                reason: panic_message(payload.as_ref()),
            })??;
            evaluated.extend(batch);
        }
        Ok(Population::new(evaluated))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("evaluation worker panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("evaluation worker panicked: {message}")
    } else {
        "evaluation worker panicked".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use levelforge_engine::{Cell, DesignElement, ElementKind, Genome, Level};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::individual::Individual;

    /// Fitness is the number of coins in the level.
    #[derive(Default)]
    struct CoinCount {
        calls: AtomicUsize,
    }

    impl FitnessEvaluator for CoinCount {
        fn fitness(&self, level: &Level) -> Result<f32, EvaluationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(level
                .cells()
                .filter(|c| *c == Cell::Coin)
                .map(|_| 1.0)
                .sum())
        }
    }

    struct Panicking;

    impl FitnessEvaluator for Panicking {
        fn fitness(&self, _level: &Level) -> Result<f32, EvaluationError> {
            panic!("analysis blew up");
        }
    }

    fn coins(count: usize) -> Individual {
        Individual::new(
            (0..count)
                .map(|i| DesignElement::new(5 + i, ElementKind::Coin { height: 6 }))
                .collect::<Genome>(),
        )
    }

    fn workers(n: usize) -> EvaluationPool {
        EvaluationPool::new(NonZeroUsize::new(n).unwrap())
    }

    #[test]
    fn test_batch_size_rounds_up() {
        assert_eq!(workers(4).batch_size(480), 120);
        assert_eq!(workers(7).batch_size(480), 69);
        assert_eq!(workers(4).batch_size(3), 1);
        assert_eq!(workers(4).batch_size(0), 1);
    }

    #[test]
    fn test_order_is_preserved() {
        let config = LevelConfig::default();
        let evaluator = CoinCount::default();
        let population = (0..13).map(coins).collect::<Population>();
        let evaluated = workers(4).evaluate(population, &evaluator, &config).unwrap();

        let fitness = evaluated
            .individuals()
            .iter()
            .map(|ind| ind.fitness().unwrap())
            .collect::<Vec<_>>();
        let expected = (0..13_u8).map(f32::from).collect::<Vec<_>>();
        assert_eq!(fitness, expected);
    }

    #[test]
    fn test_batch_size_does_not_change_results() {
        let config = LevelConfig::default();
        let evaluator = CoinCount::default();
        let mut rng = Pcg32::seed_from_u64(9);
        let population = Population::random(17, &mut rng, &config);

        let fitness = |pool: EvaluationPool| {
            pool.evaluate(population.clone(), &evaluator, &config)
                .unwrap()
                .individuals()
                .iter()
                .map(|ind| ind.fitness().unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(fitness(workers(1)), fitness(workers(5)));
    }

    #[test]
    fn test_cached_fitness_is_reused() {
        let config = LevelConfig::default();
        let evaluator = CoinCount::default();
        let population = (0..6).map(coins).collect::<Population>();
        let pool = workers(3);
        let evaluated = pool.evaluate(population, &evaluator, &config).unwrap();
        pool.evaluate(evaluated, &evaluator, &config).unwrap();
        assert_eq!(evaluator.calls.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn test_worker_panic_becomes_error() {
        let config = LevelConfig::default();
        let population = (0..4).map(coins).collect::<Population>();
        let result = workers(2).evaluate(population, &Panicking, &config);
        let Err(EvaluationError::Failed { reason }) = result else {
            panic!("expected a failure");
        };
        assert!(reason.contains("analysis blew up"), "{reason}");
    }
}
