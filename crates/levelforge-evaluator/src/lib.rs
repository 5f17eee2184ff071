//! Level evaluation for the evolutionary level search.
//!
//! Evaluation happens in two stages:
//!
//! ```text
//! Level ──LevelEvaluator──▶ Measurements ──FitnessWeights──▶ fitness (f32)
//! ```
//!
//! - [`metric`]: the six named measurements and the fixed linear weights
//!   combining them
//! - [`evaluator`]: the [`LevelEvaluator`](evaluator::LevelEvaluator) and
//!   [`FitnessEvaluator`](evaluator::FitnessEvaluator) seams plus
//!   [`WeightedFitness`](evaluator::WeightedFitness), which joins the two
//! - [`structure`]: a reachability-based analyzer producing all six
//!   measurements
//!
//! # Example
//!
//! ```
//! use levelforge_engine::{Level, LevelConfig};
//! use levelforge_evaluator::{
//!     evaluator::{FitnessEvaluator as _, WeightedFitness},
//!     metric::FitnessWeights,
//!     structure::StructuralAnalyzer,
//! };
//!
//! let fitness = WeightedFitness::new(StructuralAnalyzer::new(), FitnessWeights::default());
//! let level = Level::template(LevelConfig::default());
//! assert!(fitness.fitness(&level).unwrap() > 2.0);
//! ```

use self::metric::MetricName;

pub mod evaluator;
pub mod metric;
pub mod structure;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum EvaluationError {
    #[display("measurement {metric} is missing")]
    MissingMetric { metric: MetricName },
    #[display("unknown metric name {name:?}")]
    UnknownMetric { name: String },
    #[display("level evaluation failed: {reason}")]
    Failed { reason: String },
    #[display("fitness {fitness} is not a finite number")]
    NonFinite { fitness: f32 },
}
