mod permutations;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use bonde_bot::{AutoAction, GameController, PendingAction};
use bonde_core::game::series::{SeriesConfig, SeriesConfigError};
use bonde_core::model::difficulty::Difficulty;
use bonde_core::model::player::{PlayerKind, Seat};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use crate::config::{AgentConfig, BenchmarkConfig, ResolvedOutputs};

pub use permutations::{SeatPermutations, max_permutations};

/// Plays the configured number of series for every seating and writes one
/// JSONL row per seat per series.
pub struct TournamentRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    seat_permutations: SeatPermutations,
    logging_enabled: bool,
}

pub struct RunSummary {
    pub series_played: usize,
    pub permutations: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub telemetry_path: Option<PathBuf>,
}

impl TournamentRunner {
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let seats = config.player_count();
        let max = max_permutations(seats);
        if config.series.permutations > max {
            return Err(RunnerError::PermutationLimit {
                requested: config.series.permutations,
                max,
            });
        }

        Ok(Self {
            seat_permutations: SeatPermutations::new(seats, config.series.permutations),
            logging_enabled: config.logging.enable_structured,
            config,
            outputs,
        })
    }

    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let permutations = self.seat_permutations.as_slice();
        let mut rng = StdRng::seed_from_u64(self.config.series.seed.unwrap_or(0));
        let mut rows_written = 0usize;
        let mut analytics = AnalyticsCollector::new(&self.config)?;

        for series_index in 0..self.config.series.count {
            let base_seed = rng.next_u64();

            for (perm_index, perm) in permutations.iter().enumerate() {
                let outcome = self.play_series(series_index, perm_index, base_seed, perm)?;
                analytics.record_series(series_index, perm_index, &outcome)?;
                rows_written += write_series_rows(
                    &mut writer,
                    &self.config,
                    series_index,
                    perm_index,
                    base_seed,
                    &outcome,
                )?;
            }
        }

        writer.flush()?;

        let summary = analytics.finalize()?;
        summary.write_markdown(&self.outputs.summary_md)?;

        let telemetry_path = self
            .logging_enabled
            .then(|| self.outputs.telemetry());

        Ok(RunSummary {
            series_played: self.config.series.count,
            permutations: permutations.len(),
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            telemetry_path,
        })
    }

    fn play_series(
        &self,
        series_index: usize,
        permutation_index: usize,
        base_seed: u64,
        permutation: &[usize],
    ) -> Result<SeriesOutcome, RunnerError> {
        let mut seats = build_seat_states(permutation, &self.config.agents)?;
        let config = SeriesConfig {
            seats: seats
                .iter()
                .map(|seat| PlayerKind::Computer(seat.difficulty))
                .collect(),
            start_cards: self.config.series.start_cards,
            deck: self.config.series.deck,
        };
        // Every seat is a seeded bot, so the controller never waits.
        let mut controller = GameController::new_with_seed(config, base_seed)?;

        loop {
            let start = Instant::now();
            let Some(action) = controller.autoplay_one() else {
                break;
            };
            let elapsed = start.elapsed();
            match action {
                AutoAction::Bid { seat, .. }
                | AutoAction::Adjusted { seat, .. }
                | AutoAction::Played { seat, .. } => {
                    if let Some(seat_state) = seats.get_mut(seat.index()) {
                        seat_state.metrics.record(elapsed);
                    }
                }
                AutoAction::RoundScored(report) => {
                    if self.logging_enabled && tracing::enabled!(Level::INFO) {
                        let hits = report
                            .results
                            .iter()
                            .filter(|result| result.outcome.is_hit())
                            .count();
                        event!(
                            target: "bonde_bench::round",
                            Level::INFO,
                            run_id = %self.config.run_id,
                            series_index = series_index as u32,
                            permutation_index = permutation_index as u32,
                            round = report.round_number as u32,
                            cards = report.cards,
                            trump = %report.trump,
                            hits = hits as u32,
                        );
                    }
                }
            }
        }

        let pending = controller.pending_action();
        if pending != PendingAction::Finished {
            return Err(RunnerError::game(format!("series stopped at {pending:?}")));
        }
        let series = controller.series();

        let seating = seats
            .iter()
            .map(|seat| SeatSnapshot {
                seat: seat_label(seat.seat),
                bot: seat.agent_name.clone(),
            })
            .collect();

        let seat_results: Vec<SeatResult> = seats
            .into_iter()
            .map(|seat| {
                let (hits, rounds) = series
                    .reports()
                    .iter()
                    .flat_map(|report| report.results.iter())
                    .filter(|result| result.seat == seat.seat)
                    .fold((0u32, 0u32), |(hits, rounds), result| {
                        (hits + u32::from(result.outcome.is_hit()), rounds + 1)
                    });
                SeatResult {
                    points: series.scores().score(seat.seat),
                    agent_name: seat.agent_name,
                    difficulty: seat.difficulty,
                    seat: seat.seat,
                    hits,
                    rounds,
                    metrics: seat.metrics.finalize(),
                }
            })
            .collect();

        if self.logging_enabled && tracing::enabled!(Level::INFO) {
            let leader = seat_results
                .iter()
                .max_by_key(|result| result.points)
                .map(|result| result.agent_name.as_str())
                .unwrap_or("-");
            event!(
                target: "bonde_bench::series",
                Level::INFO,
                run_id = %self.config.run_id,
                series_index = series_index as u32,
                permutation_index = permutation_index as u32,
                series_seed = base_seed,
                leader,
            );
        }

        Ok(SeriesOutcome {
            seating,
            seat_results,
        })
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_series_rows(
    writer: &mut BufWriter<File>,
    config: &BenchmarkConfig,
    series_index: usize,
    permutation_index: usize,
    base_seed: u64,
    outcome: &SeriesOutcome,
) -> Result<usize, RunnerError> {
    let series_id = series_id(series_index, permutation_index);

    let mut rows_written = 0usize;
    for seat_result in &outcome.seat_results {
        let row = SeriesLogRow {
            run_id: config.run_id.clone(),
            series_id: series_id.clone(),
            series_index,
            permutation_index,
            series_seed: base_seed,
            seat: seat_label(seat_result.seat),
            bot: seat_result.agent_name.clone(),
            difficulty: seat_result.difficulty,
            seating: outcome.seating.clone(),
            points: seat_result.points,
            hits: seat_result.hits,
            rounds: seat_result.rounds,
            hit_rate: seat_result.hit_rate(),
            speed_ms_turn: seat_result.metrics.avg_ms_per_decision,
            decisions: seat_result.metrics.decisions,
        };

        serde_json::to_writer(&mut *writer, &row)?;
        writer.write_all(b"\n")?;
        rows_written += 1;
    }

    Ok(rows_written)
}

pub(crate) fn series_id(series_index: usize, permutation_index: usize) -> String {
    format!("S{series_index:05}_P{permutation_index:02}")
}

fn seat_label(seat: Seat) -> String {
    format!("seat{}", seat.index() + 1)
}

fn build_seat_states(
    permutation: &[usize],
    agents: &[AgentConfig],
) -> Result<Vec<SeatState>, RunnerError> {
    permutation
        .iter()
        .enumerate()
        .map(|(seat_idx, agent_idx)| {
            let agent = agents
                .get(*agent_idx)
                .ok_or(RunnerError::InvalidPermutation {
                    index: seat_idx,
                    agent_index: *agent_idx,
                })?;
            Ok(SeatState {
                seat: Seat::new(seat_idx),
                agent_name: agent.name.clone(),
                difficulty: agent.difficulty,
                metrics: DecisionMetrics::default(),
            })
        })
        .collect()
}

/// Who sits where in one series, and how long their decisions took.
struct SeatState {
    seat: Seat,
    agent_name: String,
    difficulty: Difficulty,
    metrics: DecisionMetrics,
}

pub struct SeriesOutcome {
    pub seating: Vec<SeatSnapshot>,
    pub seat_results: Vec<SeatResult>,
}

#[derive(Clone, Serialize)]
pub struct SeatSnapshot {
    pub seat: String,
    pub bot: String,
}

pub struct SeatResult {
    pub agent_name: String,
    pub difficulty: Difficulty,
    pub seat: Seat,
    pub points: u32,
    pub hits: u32,
    pub rounds: u32,
    pub metrics: DecisionSummary,
}

impl SeatResult {
    pub fn hit_rate(&self) -> f64 {
        if self.rounds == 0 {
            0.0
        } else {
            f64::from(self.hits) / f64::from(self.rounds)
        }
    }
}

#[derive(Default)]
struct DecisionMetrics {
    total: Duration,
    decisions: u32,
}

impl DecisionMetrics {
    fn record(&mut self, duration: Duration) {
        self.total += duration;
        self.decisions += 1;
    }

    fn finalize(self) -> DecisionSummary {
        let total_ms = self.total.as_secs_f64() * 1000.0;
        let avg_ms = if self.decisions == 0 {
            0.0
        } else {
            total_ms / f64::from(self.decisions)
        };

        DecisionSummary {
            decisions: self.decisions,
            avg_ms_per_decision: avg_ms,
            total_ms,
        }
    }
}

#[derive(Clone)]
pub struct DecisionSummary {
    pub decisions: u32,
    pub avg_ms_per_decision: f64,
    pub total_ms: f64,
}

#[derive(Serialize)]
struct SeriesLogRow {
    run_id: String,
    series_id: String,
    series_index: usize,
    permutation_index: usize,
    series_seed: u64,
    seat: String,
    bot: String,
    difficulty: Difficulty,
    seating: Vec<SeatSnapshot>,
    points: u32,
    hits: u32,
    rounds: u32,
    hit_rate: f64,
    speed_ms_turn: f64,
    decisions: u32,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("invalid series setup: {0}")]
    Series(#[from] SeriesConfigError),
    #[error("game execution failed: {message}")]
    Game { message: String },
    #[error("requested {requested} seat permutations exceeds maximum of {max}")]
    PermutationLimit { requested: usize, max: usize },
    #[error("permutation index {index} references invalid agent index {agent_index}")]
    InvalidPermutation { index: usize, agent_index: usize },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

impl RunnerError {
    fn game(message: impl Into<String>) -> Self {
        RunnerError::Game {
            message: message.into(),
        }
    }
}
