//! Genetic search over level genomes.
//!
//! # How a Run Works
//!
//! 1. **Init** - [`Population::random`](genetic::Population::random) creates
//!    `N` individuals, most with a random genome and some empty
//! 2. **Evaluation** - [`EvaluationPool`](pool::EvaluationPool) decodes and
//!    scores every individual lacking a cached fitness, in parallel batches
//! 3. **Report** - the ranked population goes to a
//!    [`Reporter`](driver::Reporter)
//! 4. **Breeding** - [`PopulationEvolver`](genetic::PopulationEvolver) keeps
//!    the elites and fills the rest with mutated children of tournament
//!    winners
//! 5. **Repeat** until the cancellation flag is raised or the generation limit
//!    is hit
//!
//! # Architecture
//!
//! ```text
//! EvolutionDriver (driver)
//!     ├─ EvaluationPool (pool) ──▶ Individual::calculate_fitness ──▶ FitnessEvaluator
//!     └─ PopulationEvolver (genetic)
//!            └─ Individual::generate_children / mutate (individual)
//!                   └─ crossover / mutate (operators)
//! ```
//!
//! Randomness is always an explicit generator argument, so a run seeded with
//! [`rand_pcg::Pcg32`](https://docs.rs/rand_pcg) is reproducible apart from
//! wall-clock timings.

pub mod driver;
pub mod genetic;
pub mod individual;
pub mod operators;
pub mod pool;

use std::io;

use levelforge_evaluator::EvaluationError;

/// A population was bred before all of its members had a fitness.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("individual {index} has not been evaluated")]
pub struct UnevaluatedIndividualError {
    pub index: usize,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum DriverError {
    #[display("failed to evaluate generation")]
    Evaluation(EvaluationError),
    #[display("failed to breed generation")]
    Unevaluated(UnevaluatedIndividualError),
    #[display("failed to report generation")]
    Report(io::Error),
}

impl From<EvaluationError> for DriverError {
    fn from(err: EvaluationError) -> Self {
        Self::Evaluation(err)
    }
}

impl From<UnevaluatedIndividualError> for DriverError {
    fn from(err: UnevaluatedIndividualError) -> Self {
        Self::Unevaluated(err)
    }
}
