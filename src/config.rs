//! Configuration types.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Grace period for the fast interactive path (answer agent).
const INTERACTIVE_GRACE_MS: u64 = 50;

/// Grace period for the batching/reporting path (reporter agent).
const REPORTING_GRACE_MS: u64 = 5_000;

/// Default delay between two question pulls.
const DEFAULT_PACE_MS: u64 = 1_000;

/// Batch aggregator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorConfig {
    /// How long to wait after the first item before draining the mailbox.
    pub grace_period: Duration,
}

impl AggregatorConfig {
    pub fn new(grace_period: Duration) -> Self {
        Self { grace_period }
    }

    /// Short window for request/response traffic.
    pub fn interactive() -> Self {
        Self::new(Duration::from_millis(INTERACTIVE_GRACE_MS))
    }

    /// Long window for periodic reports.
    pub fn reporting() -> Self {
        Self::new(Duration::from_millis(REPORTING_GRACE_MS))
    }

    /// Override `default` with `RELAY_GRACE_MS` when it is set.
    pub fn from_env_or(default: Self) -> Result<Self, ConfigError> {
        Ok(env_millis("RELAY_GRACE_MS")?.map(Self::new).unwrap_or(default))
    }
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self::interactive()
    }
}

/// Question cycle pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleConfig {
    /// Delay applied before each question is emitted.
    pub pace: Duration,
}

impl CycleConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(env_millis("RELAY_PACE_MS")?
            .map(|pace| Self { pace })
            .unwrap_or_default())
    }
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            pace: Duration::from_millis(DEFAULT_PACE_MS),
        }
    }
}

/// Which demo agent the binary runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    Answer,
    Question,
    Reporter,
    Chat,
}

impl AgentKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Answer => "AnswerBot",
            Self::Question => "QuestionBot",
            Self::Reporter => "ReporterAgent",
            Self::Chat => "ChatAgent",
        }
    }

    /// Grace period used by this agent's send path when none is configured.
    pub fn default_aggregator(&self) -> AggregatorConfig {
        match self {
            Self::Reporter => AggregatorConfig::reporting(),
            _ => AggregatorConfig::interactive(),
        }
    }
}

impl FromStr for AgentKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "answer" => Ok(Self::Answer),
            "question" => Ok(Self::Question),
            "reporter" => Ok(Self::Reporter),
            "chat" => Ok(Self::Chat),
            other => Err(ConfigError::InvalidValue {
                key: "RELAY_AGENT".to_string(),
                message: format!("unknown agent {other:?}, expected answer|question|reporter|chat"),
            }),
        }
    }
}

/// Process-level configuration for the demo binary.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub agent: AgentKind,
    /// JSON file with the question -> answer table.
    pub qa_path: PathBuf,
    pub aggregator: AggregatorConfig,
    pub cycle: CycleConfig,
}

impl RelayConfig {
    /// Load from `RELAY_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let agent = match std::env::var("RELAY_AGENT") {
            Ok(value) => value.parse()?,
            Err(_) => AgentKind::Answer,
        };
        let qa_path = std::env::var("RELAY_QA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./qa.json"));

        Ok(Self {
            agent,
            qa_path,
            aggregator: AggregatorConfig::from_env_or(agent.default_aggregator())?,
            cycle: CycleConfig::from_env()?,
        })
    }
}

fn env_millis(key: &str) -> Result<Option<Duration>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(|ms| Some(Duration::from_millis(ms)))
            .map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}
