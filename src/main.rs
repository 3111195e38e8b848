use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::info;
use rwgate::{Dataset, Experiment, ExperimentConfig, Sweep, SweepConfig, experiment};

#[derive(Parser)]
#[clap(author, version)]
#[clap(about = "Compares exclusive and reader-preferring locking across reader/writer mixes", long_about = None)]
struct Cli {
    /// Records file, one record per line.
    #[clap(short, long, default_value = "bd.txt")]
    dataset: PathBuf,

    /// Runs averaged per discipline and mix.
    #[clap(short, long, default_value_t = 50, value_parser = clap::value_parser!(u32).range(1..))]
    repetitions: u32,

    /// Reader-count increment between mixes.
    #[clap(short, long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    step: u64,

    /// Tasks per run.
    #[clap(short, long, default_value_t = experiment::POPULATION)]
    population: usize,

    /// Operations per task.
    #[clap(short, long, default_value_t = experiment::ITERATIONS)]
    iterations: usize,

    /// Pause after a task reports completion, in milliseconds.
    #[clap(long, default_value_t = 1)]
    linger_ms: u64,

    /// Seed for reproducible runs.
    #[clap(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let dataset = Dataset::load(&cli.dataset)
        .with_context(|| format!("cannot start experiments without {}", cli.dataset.display()))?;
    info!(
        "{} records, {} tasks of {} operations, {} repetitions",
        dataset.len(),
        cli.population,
        cli.iterations,
        cli.repetitions
    );

    let mut experiment = Experiment::new(
        dataset,
        ExperimentConfig {
            population: cli.population,
            iterations: cli.iterations,
            linger: Duration::from_millis(cli.linger_ms),
            seed: cli.seed,
        },
    );
    let sweep = SweepConfig {
        repetitions: cli.repetitions,
        step: usize::try_from(cli.step).context("step does not fit in usize")?,
    };

    for row in Sweep::new(&mut experiment, sweep) {
        println!("{row}");
    }

    Ok(())
}
