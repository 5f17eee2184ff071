use std::path::PathBuf;

use anyhow::Context as _;
use levelforge_evaluator::{
    evaluator::WeightedFitness, metric::FitnessWeights, structure::StructuralAnalyzer,
};

use crate::{
    schema::LevelEvaluation,
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvaluateArg {
    /// Level file in the text grid format
    level: PathBuf,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &EvaluateArg) -> anyhow::Result<()> {
    let EvaluateArg { level, output } = arg;
    let level = util::read_level_file(level)?;
    let fitness = WeightedFitness::new(StructuralAnalyzer::new(), FitnessWeights::default());
    let (measurements, fitness) = fitness
        .evaluate(&level)
        .context("Failed to evaluate level")?;
    let evaluation = LevelEvaluation {
        config: level.config(),
        fitness,
        measurements,
    };
    Output::save_json(&evaluation, output.clone())
}
