use std::{
    fs, io,
    num::NonZeroUsize,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use anyhow::Context as _;
use chrono::{DateTime, Local, TimeZone, Utc};
use levelforge_engine::LevelConfig;
use levelforge_evaluator::{
    evaluator::WeightedFitness, metric::FitnessWeights, structure::StructuralAnalyzer,
};
use levelforge_training::{
    driver::{EvolutionDriver, EvolutionParams, GenerationReport},
    genetic::PopulationEvolver,
    pool::EvaluationPool,
};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{schema::RunSummary, util::Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvolveArg {
    /// Number of individuals per generation
    #[arg(long, default_value_t = 480)]
    population: usize,
    /// Level width in cells
    #[arg(long, default_value_t = LevelConfig::DEFAULT.width())]
    width: usize,
    /// Level height in cells
    #[arg(long, default_value_t = LevelConfig::DEFAULT.height())]
    height: usize,
    /// Number of evaluation threads [default: available parallelism]
    #[arg(long)]
    workers: Option<NonZeroUsize>,
    /// Seed of the random generator [default: random]
    #[arg(long)]
    seed: Option<u64>,
    /// Stop after this many generations instead of waiting for Ctrl-C
    #[arg(long)]
    generations: Option<usize>,
    /// Directory receiving `last.txt` and the final snapshots
    #[arg(long, default_value = "levels")]
    output_dir: PathBuf,
    /// Number of top levels saved when the run ends
    #[arg(long, default_value_t = 10)]
    snapshots: usize,
}

pub(crate) fn run(arg: &EvolveArg) -> anyhow::Result<()> {
    let EvolveArg {
        population,
        width,
        height,
        workers,
        seed,
        generations,
        output_dir,
        snapshots,
    } = arg;
    anyhow::ensure!(*population > 0, "population must not be empty");
    let config = LevelConfig::new(*width, *height).context("Invalid level size")?;
    fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            output_dir.display()
        )
    })?;

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        ctrlc::set_handler(move || {
            log::info!("interrupt received, finishing current generation");
            cancel.store(true, Ordering::SeqCst);
        })
        .context("Failed to install Ctrl-C handler")?;
    }

    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = Pcg32::seed_from_u64(seed);
    let pool = workers.map_or_else(EvaluationPool::default, EvaluationPool::new);
    log::info!(
        "evolving {population} levels of {width}x{height} on {} workers (seed {seed})",
        pool.workers()
    );

    let fitness = WeightedFitness::new(StructuralAnalyzer::new(), FitnessWeights::default());
    let mut driver = EvolutionDriver::new(
        config,
        EvolutionParams {
            population_size: *population,
            max_generations: *generations,
        },
        PopulationEvolver::default(),
        pool,
        fitness,
    );

    let last_path = output_dir.join("last.txt");
    let mut generation_count = 0;
    let mut reporter = |report: &GenerationReport<'_>| -> io::Result<()> {
        generation_count = report.generation;
        let Some(best) = report.best() else {
            return Ok(());
        };
        if let Some(stats) = report.population.fitness_stats() {
            log::info!(
                "generation {}: max fitness {:.4} (mean {:.4}, min {:.4}), avg generation time {:.2?}, net time {:.2?}",
                report.generation,
                stats.max,
                stats.mean,
                stats.min,
                report.average_generation_time,
                report.elapsed,
            );
        }
        fs::write(&last_path, best.level(report.config).to_string())
    };
    let population = driver
        .run(&mut rng, &cancel, &mut reporter)
        .context("Evolution failed")?;

    let stamp = snapshot_stamp(&Local::now());
    for (k, individual) in population.individuals().iter().take(*snapshots).enumerate() {
        let path = output_dir.join(format!("{stamp}_{k}.txt"));
        fs::write(&path, individual.level(&config).to_string())
            .with_context(|| format!("Failed to write level snapshot: {}", path.display()))?;
    }

    let best = population.best().context("Final population is empty")?;
    let (measurements, best_fitness) = driver
        .evaluator()
        .evaluate(&best.level(&config))
        .context("Failed to evaluate best level")?;
    let summary = RunSummary {
        recorded_at: Utc::now(),
        seed,
        config,
        generations: generation_count,
        best_fitness,
        measurements,
        genome: best.genome().clone(),
    };
    let summary_path = output_dir.join(format!("{stamp}_best.json"));
    Output::save_json(&summary, Some(summary_path.clone()))?;

    eprintln!();
    eprintln!("Run saved successfully");
    eprintln!("  Path: {}", summary_path.display());
    eprintln!("  Generations: {}", summary.generations);
    eprintln!("  Best fitness: {:.4}", summary.best_fitness);
    for (metric, value) in summary.measurements.iter() {
        eprintln!("    {metric}: {value:.4}");
    }
    eprintln!("  Snapshots: {}", population.len().min(*snapshots));

    Ok(())
}

/// Prefix of the snapshot file names, in the wall-clock time of `time`.
fn snapshot_stamp<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    time.format("%m_%d_%H_%M_%S").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;

    use super::*;

    #[test]
    fn test_snapshot_stamp_uses_wall_clock() {
        let utc = Utc.with_ymd_and_hms(2024, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(snapshot_stamp(&utc), "03_04_05_06_07");

        let tokyo = utc.with_timezone(&FixedOffset::east_opt(9 * 3600).unwrap());
        assert_eq!(snapshot_stamp(&tokyo), "03_04_14_06_07");
    }
}
