use clap::{Parser, Subcommand};

use self::{evaluate::EvaluateArg, evolve::EvolveArg, render::RenderArg};

mod evaluate;
mod evolve;
mod render;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Search for levels with the genetic algorithm until interrupted
    Evolve(#[clap(flatten)] EvolveArg),
    /// Print the measurements and fitness of a text level
    Evaluate(#[clap(flatten)] EvaluateArg),
    /// Decode a saved genome and print the level
    Render(#[clap(flatten)] RenderArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Evolve(arg) => evolve::run(&arg)?,
        Mode::Evaluate(arg) => evaluate::run(&arg)?,
        Mode::Render(arg) => render::run(&arg)?,
    }
    Ok(())
}
