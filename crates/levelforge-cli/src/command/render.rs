use std::path::PathBuf;

use anyhow::Context as _;
use levelforge_engine::{Genome, LevelConfig};

use crate::{
    schema::GenomeSource,
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct RenderArg {
    /// Run summary or genome JSON file
    input: PathBuf,
    /// Level width used for a bare genome
    #[arg(long, default_value_t = LevelConfig::DEFAULT.width())]
    width: usize,
    /// Level height used for a bare genome
    #[arg(long, default_value_t = LevelConfig::DEFAULT.height())]
    height: usize,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &RenderArg) -> anyhow::Result<()> {
    let RenderArg {
        input,
        width,
        height,
        output,
    } = arg;
    let (config, genome) = resolve(util::read_json_file("genome", input)?, *width, *height)?;
    log::debug!("rendering {} elements on a {config:?}", genome.len());
    Output::save_level(&genome.decode(&config), output.clone())
}

/// Picks the level size for `source` and clamps its genome into that size.
fn resolve(
    source: GenomeSource,
    width: usize,
    height: usize,
) -> anyhow::Result<(LevelConfig, Genome)> {
    let (config, genome) = match source {
        GenomeSource::Summary(summary) => (summary.config, summary.genome),
        GenomeSource::Genome(genome) => {
            let config = LevelConfig::new(width, height).context("Invalid level size")?;
            (config, genome)
        }
    };
    Ok((config, genome.clamped(&config)))
}
