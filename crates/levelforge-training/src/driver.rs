//! Generational loop tying population, evaluation and reporting together.
//!
//! ```text
//! Init ─▶ Evaluating ─▶ Ready ─▶ Breeding ─▶ Evaluating ─▶ …
//!                         │
//!                         └─ stop requested ─▶ Terminated
//! ```
//!
//! Stop requests (the cancellation flag or the optional generation limit) are
//! only checked in `Ready`, after the report for a fully evaluated generation
//! has been delivered. A flag raised while a generation is being evaluated
//! therefore takes effect once that generation is complete.

use std::{
    io,
    sync::atomic::{AtomicBool, Ordering},
    time::{Duration, Instant},
};

use levelforge_engine::LevelConfig;
use levelforge_evaluator::evaluator::FitnessEvaluator;
use rand::Rng;

use crate::{
    DriverError,
    genetic::{Population, PopulationEvolver},
    individual::Individual,
    pool::EvaluationPool,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverState {
    #[default]
    Init,
    Evaluating,
    Ready,
    Breeding,
    Terminated,
}

/// Run-level parameters of the driver.
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionParams {
    pub population_size: usize,
    /// Stop after this many generations even without cancellation.
    pub max_generations: Option<usize>,
}

impl Default for EvolutionParams {
    fn default() -> Self {
        Self {
            population_size: 480,
            max_generations: None,
        }
    }
}

/// Snapshot handed to the [`Reporter`] once per generation.
#[derive(Debug)]
pub struct GenerationReport<'a> {
    /// Number of generations evaluated so far, starting at 1.
    pub generation: usize,
    /// The evaluated population, best first.
    pub population: &'a Population,
    pub config: &'a LevelConfig,
    /// Time since the driver started.
    pub elapsed: Duration,
    pub average_generation_time: Duration,
}

impl GenerationReport<'_> {
    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        self.population.best()
    }
}

/// Receives the ranked population after every generation.
pub trait Reporter {
    fn report(&mut self, report: &GenerationReport<'_>) -> io::Result<()>;
}

impl<F> Reporter for F
where
    F: FnMut(&GenerationReport<'_>) -> io::Result<()>,
{
    fn report(&mut self, report: &GenerationReport<'_>) -> io::Result<()> {
        self(report)
    }
}

/// Drives the search until stopped.
#[derive(Debug)]
pub struct EvolutionDriver<E> {
    config: LevelConfig,
    params: EvolutionParams,
    evolver: PopulationEvolver,
    pool: EvaluationPool,
    evaluator: E,
    state: DriverState,
}

impl<E> EvolutionDriver<E>
where
    E: FitnessEvaluator,
{
    #[must_use]
    pub fn new(
        config: LevelConfig,
        params: EvolutionParams,
        evolver: PopulationEvolver,
        pool: EvaluationPool,
        evaluator: E,
    ) -> Self {
        Self {
            config,
            params,
            evolver,
            pool,
            evaluator,
            state: DriverState::Init,
        }
    }

    #[must_use]
    pub fn state(&self) -> DriverState {
        self.state
    }

    #[must_use]
    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    #[must_use]
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Runs generations until `cancel` is set or the generation limit is
    /// reached, returning the last fully evaluated population, best first.
    ///
    /// Any evaluation or reporting failure aborts the run.
    pub fn run<R, P>(
        &mut self,
        rng: &mut R,
        cancel: &AtomicBool,
        reporter: &mut P,
    ) -> Result<Population, DriverError>
    where
        R: Rng + ?Sized,
        P: Reporter + ?Sized,
    {
        let result = self.run_generations(rng, cancel, reporter);
        self.state = DriverState::Terminated;
        result
    }

    fn run_generations<R, P>(
        &mut self,
        rng: &mut R,
        cancel: &AtomicBool,
        reporter: &mut P,
    ) -> Result<Population, DriverError>
    where
        R: Rng + ?Sized,
        P: Reporter + ?Sized,
    {
        self.state = DriverState::Init;
        let size = self.params.population_size;
        if size % self.pool.workers() != 0 {
            log::warn!(
                "population size {size} is not a multiple of {} workers; batches will be uneven",
                self.pool.workers()
            );
        }
        let mut population = Population::random(size, rng, &self.config);
        let start = Instant::now();
        let mut generation = 0_usize;

        loop {
            self.state = DriverState::Evaluating;
            let eval_start = Instant::now();
            population = self.pool.evaluate(population, &self.evaluator, &self.config)?;
            population.rank()?;
            generation += 1;
            log::debug!(
                "generation {generation}: evaluation took {:.2?}",
                eval_start.elapsed()
            );

            self.state = DriverState::Ready;
            let elapsed = start.elapsed();
            let average_generation_time = u32::try_from(generation)
                .map_or(elapsed, |count| elapsed / count);
            reporter
                .report(&GenerationReport {
                    generation,
                    population: &population,
                    config: &self.config,
                    elapsed,
                    average_generation_time,
                })
                .map_err(DriverError::Report)?;

            let limit_reached = self
                .params
                .max_generations
                .is_some_and(|max| generation >= max);
            if cancel.load(Ordering::SeqCst) || limit_reached {
                log::info!("stopping after {generation} generations ({elapsed:.2?})");
                return Ok(population);
            }

            self.state = DriverState::Breeding;
            let breed_start = Instant::now();
            population = self
                .evolver
                .generate_successors(population, rng, &self.config)?;
            log::debug!(
                "generation {generation}: breeding took {:.2?}",
                breed_start.elapsed()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        num::NonZeroUsize,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use levelforge_engine::Level;
    use levelforge_evaluator::EvaluationError;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    /// Fitness is the number of non-empty cells.
    #[derive(Default)]
    struct Busyness {
        calls: AtomicUsize,
    }

    impl FitnessEvaluator for Busyness {
        fn fitness(&self, level: &Level) -> Result<f32, EvaluationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(level.cells().filter(|c| !c.is_empty()).map(|_| 1.0).sum())
        }
    }

    struct Failing;

    impl FitnessEvaluator for Failing {
        fn fitness(&self, _level: &Level) -> Result<f32, EvaluationError> {
            Err(EvaluationError::Failed {
                reason: "no level analysis available".to_owned(),
            })
        }
    }

    fn driver<E>(evaluator: E, max_generations: Option<usize>) -> EvolutionDriver<E>
    where
        E: FitnessEvaluator,
    {
        EvolutionDriver::new(
            LevelConfig::new(40, 12).unwrap(),
            EvolutionParams {
                population_size: 12,
                max_generations,
            },
            PopulationEvolver::default(),
            EvaluationPool::new(NonZeroUsize::new(3).unwrap()),
            evaluator,
        )
    }

    #[test]
    fn test_generation_limit() {
        let mut driver = driver(Busyness::default(), Some(3));
        let mut rng = Pcg32::seed_from_u64(0);
        let cancel = AtomicBool::new(false);
        let mut generations = vec![];
        let mut reporter = |report: &GenerationReport<'_>| -> io::Result<()> {
            assert_eq!(report.population.len(), 12);
            assert!(report.best().unwrap().is_evaluated());
            generations.push(report.generation);
            Ok(())
        };

        let population = driver.run(&mut rng, &cancel, &mut reporter).unwrap();
        assert_eq!(generations, [1, 2, 3]);
        assert_eq!(driver.state(), DriverState::Terminated);
        assert_eq!(population.len(), 12);
        assert!(population.individuals().iter().all(Individual::is_evaluated));
        let ranked = population
            .individuals()
            .is_sorted_by(|a, b| a.fitness() >= b.fitness());
        assert!(ranked);
    }

    #[test]
    fn test_cancellation_is_observed_at_generation_boundary() {
        let mut driver = driver(Busyness::default(), None);
        let mut rng = Pcg32::seed_from_u64(1);
        let cancel = AtomicBool::new(false);
        let mut reports = 0;
        let mut reporter = |report: &GenerationReport<'_>| -> io::Result<()> {
            reports += 1;
            if report.generation == 2 {
                cancel.store(true, Ordering::SeqCst);
            }
            Ok(())
        };

        driver.run(&mut rng, &cancel, &mut reporter).unwrap();
        assert_eq!(reports, 2);
        // 12 initial evaluations, then 12 - 2 elites re-evaluated
        assert_eq!(driver.evaluator().calls.load(Ordering::SeqCst), 12 + 10);
    }

    #[test]
    fn test_cancelled_before_start_completes_one_generation() {
        let mut driver = driver(Busyness::default(), None);
        let mut rng = Pcg32::seed_from_u64(2);
        let cancel = AtomicBool::new(true);
        let population = driver
            .run(&mut rng, &cancel, &mut |_: &GenerationReport<'_>| -> io::Result<()> { Ok(()) })
            .unwrap();
        assert!(population.individuals().iter().all(Individual::is_evaluated));
    }

    #[test]
    fn test_evaluation_error_aborts_run() {
        let mut driver = driver(Failing, None);
        let mut rng = Pcg32::seed_from_u64(3);
        let cancel = AtomicBool::new(false);
        let result = driver.run(&mut rng, &cancel, &mut |_: &GenerationReport<'_>| -> io::Result<()> { Ok(()) });
        assert!(matches!(result, Err(DriverError::Evaluation(_))));
        assert_eq!(driver.state(), DriverState::Terminated);
    }

    #[test]
    fn test_report_error_aborts_run() {
        let mut driver = driver(Busyness::default(), None);
        let mut rng = Pcg32::seed_from_u64(4);
        let cancel = AtomicBool::new(false);
        let result = driver.run(&mut rng, &cancel, &mut |_: &GenerationReport<'_>| -> io::Result<()> {
            Err(io::Error::other("disk full"))
        });
        assert!(matches!(result, Err(DriverError::Report(_))));
    }
}
