use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bonde_core::model::deck::DeckVariant;
use bonde_core::model::difficulty::Difficulty;
use serde::Serialize;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlockingBuilder, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{BenchmarkConfig, ResolvedOutputs};

/// Flushes queued events when dropped; hold it for the whole run.
pub struct LoggingGuard {
    _worker: WorkerGuard,
    pub telemetry_path: PathBuf,
}

/// First line of every telemetry file. Lets a log be read without the
/// YAML that produced it.
#[derive(Debug, Serialize)]
struct RunHeader<'a> {
    event: &'static str,
    run_id: &'a str,
    seed: Option<u64>,
    series: usize,
    seatings: usize,
    start_cards: u8,
    deck: DeckVariant,
    agents: Vec<AgentEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct AgentEntry<'a> {
    name: &'a str,
    difficulty: Difficulty,
}

impl<'a> RunHeader<'a> {
    fn new(config: &'a BenchmarkConfig) -> Self {
        Self {
            event: "run_start",
            run_id: &config.run_id,
            seed: config.series.seed,
            series: config.series.count,
            seatings: config.series.permutations,
            start_cards: config.series.start_cards,
            deck: config.series.deck,
            agents: config
                .agents
                .iter()
                .map(|agent| AgentEntry {
                    name: &agent.name,
                    difficulty: agent.difficulty,
                })
                .collect(),
        }
    }
}

/// Filter used when `RUST_LOG` is unset: the configured level for bench
/// and bot targets, warnings from everything else.
fn default_directives(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    format!("warn,bonde_bench={level},bonde_bot={level}")
}

/// Installs a JSON subscriber appending one event per line to the run's
/// telemetry file, after a `run_start` header. Returns `None` when
/// structured logging is off.
pub fn init_logging(
    config: &BenchmarkConfig,
    outputs: &ResolvedOutputs,
) -> Result<Option<LoggingGuard>> {
    if !config.logging.enable_structured {
        return Ok(None);
    }

    let telemetry_path = outputs.telemetry();
    let file = open_telemetry(&telemetry_path, &RunHeader::new(config))?;
    let (writer, worker) = NonBlockingBuilder::default().lossy(false).finish(file);

    let level = config.logging.level().unwrap_or(Level::INFO);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_writer(writer)
        .finish();

    // Test harnesses may have installed one already.
    let _ = tracing::subscriber::set_global_default(subscriber);

    Ok(Some(LoggingGuard {
        _worker: worker,
        telemetry_path,
    }))
}

fn open_telemetry(path: &Path, header: &RunHeader<'_>) -> Result<File> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating telemetry directory at {}", dir.display()))?;
    }
    let mut file = File::create(path)
        .with_context(|| format!("creating telemetry file at {}", path.display()))?;
    serde_json::to_writer(&mut file, header).context("writing telemetry header")?;
    file.write_all(b"\n").context("writing telemetry header")?;
    Ok(file)
}
