use chrono::{DateTime, Utc};
use levelforge_engine::{Genome, LevelConfig};
use levelforge_evaluator::metric::Measurements;
use serde::{Deserialize, Serialize};

/// Outcome of an `evolve` run, saved next to the level snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Time the run finished
    pub recorded_at: DateTime<Utc>,
    /// Seed of the random generator driving the run
    pub seed: u64,
    pub config: LevelConfig,
    /// Number of fully evaluated generations
    pub generations: usize,
    pub best_fitness: f32,
    pub measurements: Measurements,
    /// Genome of the best individual of the final generation
    pub genome: Genome,
}

/// Measurements of a single level, printed by `evaluate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelEvaluation {
    pub config: LevelConfig,
    pub fitness: f32,
    pub measurements: Measurements,
}

/// Input accepted by `render`: a run summary or a bare genome.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GenomeSource {
    Summary(Box<RunSummary>),
    Genome(Genome),
}
