use std::path::PathBuf;

use clap::Parser;

use bonde_bench::config::BenchmarkConfig;
use bonde_bench::logging::init_logging;
use bonde_bench::tournament::TournamentRunner;

/// Seat-rotated bot tournaments over whole Bondebridge series.
#[derive(Debug, Parser)]
#[command(
    name = "bonde-bench",
    author,
    version,
    about = "Deterministic Bondebridge tournament harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of series to play.
    #[arg(long, value_name = "COUNT")]
    series: Option<usize>,

    /// Override the RNG seed for series generation.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the number of seatings per series.
    #[arg(long, value_name = "COUNT")]
    permutations: Option<usize>,

    /// Exit after validating the configuration (no tournament is run).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }
    if let Some(count) = cli.series {
        config.series.count = count;
    }
    if let Some(seed) = cli.seed {
        config.series.seed = Some(seed);
    }
    if let Some(permutations) = cli.permutations {
        config.series.permutations = permutations;
    }

    config.validate()?;

    let outputs = config.resolved_outputs();
    let agent_count = config.agents.len();
    let run_id = config.run_id.clone();
    let count = config.series.count;
    let permutations = config.series.permutations;

    println!(
        "Loaded configuration '{run_id}' with {agent_count} agents ({count} series, {permutations} seatings)"
    );

    let runner = TournamentRunner::new(config.clone(), outputs.clone())?;

    if cli.validate_only {
        println!("Validation-only mode: tournament execution skipped.");
        return Ok(());
    }

    let _logging_guard = init_logging(&config, &outputs)?;
    let summary = runner.run()?;
    println!(
        "Tournament complete for '{run_id}': {} series × {} seatings → {} rows at {}",
        summary.series_played,
        summary.permutations,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }

    Ok(())
}
