use bonde_core::game::series::{MAX_PLAYERS, MIN_PLAYERS};
use bonde_core::model::deck::DeckVariant;
use bonde_core::model::difficulty::Difficulty;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const DEFAULT_SEAT_PERMUTATIONS: usize = 4;
const DEFAULT_START_CARDS: u8 = 7;
const DEFAULT_LATENCY_BUDGET_MS: u64 = 250;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Tournament configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BenchmarkConfig {
    pub run_id: String,
    pub series: SeriesBlock,
    pub agents: Vec<AgentConfig>,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BenchmarkConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let mut cfg: BenchmarkConfig = serde_yaml::from_reader(BufReader::new(file))
            .map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Checks every block without touching the filesystem.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        validate_agents(&self.agents)?;
        self.series.validate(self.agents.len())?;
        self.outputs.validate(&self.run_id)?;
        self.metrics.validate(&self.agents)?;
        self.logging.normalize();
        Ok(())
    }

    /// Output paths with `{run_id}` substituted.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
        }
    }

    /// One seat per agent.
    pub fn player_count(&self) -> usize {
        self.agents.len()
    }
}

/// How many series to play and how each is dealt.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SeriesBlock {
    pub seed: Option<u64>,
    pub count: usize,
    #[serde(default = "default_start_cards")]
    pub start_cards: u8,
    #[serde(default)]
    pub deck: DeckVariant,
    #[serde(default = "default_permutations")]
    pub permutations: usize,
}

impl SeriesBlock {
    fn validate(&self, players: usize) -> Result<(), ValidationError> {
        if self.count == 0 {
            return Err(ValidationError::invalid(
                "series.count",
                "number of series must be greater than zero",
            ));
        }
        if self.permutations == 0 {
            return Err(ValidationError::invalid(
                "series.permutations",
                "permutations must be at least 1",
            ));
        }
        let max = (self.deck.size() / players.max(1)) as u8;
        if self.start_cards == 0 || self.start_cards > max {
            return Err(ValidationError::invalid(
                "series.start_cards",
                format!("start cards must be 1..={max} for {players} players"),
            ));
        }
        Ok(())
    }
}

fn default_start_cards() -> u8 {
    DEFAULT_START_CARDS
}

fn default_permutations() -> usize {
    DEFAULT_SEAT_PERMUTATIONS
}

/// A tournament participant: a heuristic bot at one difficulty.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AgentConfig {
    pub name: String,
    #[serde(default)]
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.jsonl", &self.jsonl),
            ("outputs.summary_md", &self.summary_md),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::invalid(label, "path must not be empty"));
            }
            if resolve_template(run_id, value).components().count() == 0 {
                return Err(ValidationError::invalid(label, "resolved path is invalid"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MetricsConfig {
    #[serde(default)]
    pub baseline: Option<String>,
    #[serde(default = "default_latency_budget_ms")]
    pub latency_budget_ms: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            baseline: None,
            latency_budget_ms: DEFAULT_LATENCY_BUDGET_MS,
        }
    }
}

impl MetricsConfig {
    fn validate(&self, agents: &[AgentConfig]) -> Result<(), ValidationError> {
        let Some(baseline) = self.baseline.as_ref() else {
            return Err(ValidationError::invalid(
                "metrics.baseline",
                "baseline agent must be specified",
            ));
        };
        if !agents.iter().any(|agent| &agent.name == baseline) {
            return Err(ValidationError::invalid(
                "metrics.baseline",
                format!("baseline agent '{baseline}' is not defined in agents list"),
            ));
        }
        if self.latency_budget_ms == 0 {
            return Err(ValidationError::invalid(
                "metrics.latency_budget_ms",
                "latency budget must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn default_latency_budget_ms() -> u64 {
    DEFAULT_LATENCY_BUDGET_MS
}

/// Structured logging is off unless asked for.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::invalid("run_id", "run_id must not be empty"));
    }
    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::invalid(
            "run_id",
            "run_id may only contain alphanumeric characters, '.', '_' or '-'",
        ));
    }
    Ok(())
}

fn validate_agents(agents: &[AgentConfig]) -> Result<(), ValidationError> {
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&agents.len()) {
        return Err(ValidationError::invalid(
            "agents",
            format!(
                "a table seats {MIN_PLAYERS} to {MAX_PLAYERS} agents, found {}",
                agents.len()
            ),
        ));
    }

    let mut seen = HashSet::new();
    for (index, agent) in agents.iter().enumerate() {
        if agent.name.trim().is_empty() {
            return Err(ValidationError::invalid(
                format!("agents[{index}].name"),
                "agent name must not be empty",
            ));
        }
        if !agent.name.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
            return Err(ValidationError::invalid(
                format!("agents[{index}].name"),
                "agent name contains invalid characters",
            ));
        }
        if !seen.insert(agent.name.as_str()) {
            return Err(ValidationError::invalid(
                "agents",
                format!("agent name '{}' defined more than once", agent.name),
            ));
        }
    }
    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    PathBuf::from(template.replace("{run_id}", run_id))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
}

impl ResolvedOutputs {
    /// Directory holding the summary; telemetry is written beside it.
    pub fn summary_dir(&self) -> PathBuf {
        self.summary_md
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Structured event log for the run.
    pub fn telemetry(&self) -> PathBuf {
        self.summary_dir().join("telemetry.jsonl")
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

impl ValidationError {
    fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC_YAML: &str = r#"
run_id: "smoke"
series:
  seed: 123
  count: 4
  start_cards: 3
agents:
  - name: "steady"
    difficulty: "medium"
  - name: "rookie"
    difficulty: "easy"
  - name: "sampler"
    difficulty: "hard"
outputs:
  jsonl: "bench/out/{run_id}/series.jsonl"
  summary_md: "bench/out/{run_id}/summary.md"
metrics:
  baseline: "steady"
logging:
  enable_structured: true
  tracing_level: "debug"
"#;

    fn parse(yaml: &str) -> BenchmarkConfig {
        serde_yaml::from_str(yaml).expect("parse yaml")
    }

    #[test]
    fn loads_and_validates_basic_config() {
        let mut cfg = parse(BASIC_YAML);
        cfg.validate().expect("validate");

        assert_eq!(cfg.player_count(), 3);
        assert_eq!(cfg.series.permutations, DEFAULT_SEAT_PERMUTATIONS);
        assert_eq!(cfg.series.deck, DeckVariant::Full);
        assert_eq!(cfg.agents[2].difficulty, Difficulty::Hard);
        assert_eq!(cfg.logging.level(), Some(Level::DEBUG));

        let outputs = cfg.resolved_outputs();
        assert_eq!(outputs.jsonl, PathBuf::from("bench/out/smoke/series.jsonl"));
        assert_eq!(outputs.summary_dir(), PathBuf::from("bench/out/smoke"));
        assert_eq!(
            outputs.telemetry(),
            PathBuf::from("bench/out/smoke/telemetry.jsonl")
        );
    }

    #[test]
    fn rejects_missing_baseline() {
        let mut cfg = parse(&BASIC_YAML.replace("  baseline: \"steady\"\n", ""));
        let err = cfg.validate().expect_err("should fail");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "metrics.baseline"
        ));
    }

    #[test]
    fn rejects_duplicate_agents() {
        let mut cfg = parse(&BASIC_YAML.replace("\"rookie\"", "\"steady\""));
        let err = cfg.validate().expect_err("duplicate agents should fail");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "agents"
        ));
    }

    #[test]
    fn rejects_too_many_start_cards_for_short_deck() {
        let yaml = BASIC_YAML.replace("start_cards: 3", "start_cards: 11\n  deck: short");
        let mut cfg = parse(&yaml);
        let err = cfg.validate().expect_err("32 cards cannot serve 3 × 11");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "series.start_cards"
        ));
    }

    #[test]
    fn rejects_invalid_run_id() {
        let mut cfg = parse(&BASIC_YAML.replace("\"smoke\"", "\"smoke test\""));
        let err = cfg.validate().expect_err("invalid run id");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "run_id"
        ));
    }

    #[test]
    fn single_agent_is_not_a_table() {
        let yaml = BASIC_YAML
            .replace("  - name: \"rookie\"\n    difficulty: \"easy\"\n", "")
            .replace("  - name: \"sampler\"\n    difficulty: \"hard\"\n", "");
        let mut cfg = parse(&yaml);
        assert!(cfg.validate().is_err());
    }
}
