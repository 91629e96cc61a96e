//! CLI command implementations for Yun.

pub(crate) mod run;
pub(crate) mod selfplay;

mod output;

use clap::{Args, ValueEnum};
use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use yun::{
    ActionId, ActionMask, EnvConfig, GameRule, Observation, Policy, SelectionMode, TablePolicy,
    UniformPolicy,
};

/// Output format for the `run` and `selfplay` commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Selection mode for table policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ModeArg {
    /// Always the highest-weight legal action.
    Greedy,
    /// Weighted random draw over legal actions.
    Sample,
}

impl From<ModeArg> for SelectionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Greedy => Self::Greedy,
            ModeArg::Sample => Self::Sample,
        }
    }
}

/// Game configuration flags shared by every command.
#[derive(Args, Debug, Clone)]
pub(crate) struct GameArgs {
    /// JSON configuration file; flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Energy cap (default: 5)
    #[arg(long)]
    max_energy: Option<u32>,

    /// Highest attack/defend level (default: 3)
    #[arg(long)]
    level: Option<u32>,

    /// Starting energy (default: 1)
    #[arg(long)]
    init_energy: Option<u32>,

    /// Step budget per episode (default: 20)
    #[arg(long)]
    max_steps: Option<u32>,

    /// Draw starting energies at random instead of using the initial energy
    #[arg(short, long)]
    pub(crate) random_start: bool,
}

impl GameArgs {
    /// Build and validate the environment configuration.
    pub(crate) fn env_config(&self) -> Result<EnvConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|e| {
                    CliError::new(format!("Failed to read {}: {e}", path.display()))
                })?;
                serde_json::from_str(&text).map_err(|e| {
                    CliError::new(format!("Invalid config {}: {e}", path.display()))
                })?
            }
            None => EnvConfig::default(),
        };
        if let Some(v) = self.max_energy {
            config.max_energy = v;
        }
        if let Some(v) = self.level {
            config.level = v;
        }
        if let Some(v) = self.init_energy {
            config.init_energy = v;
        }
        if let Some(v) = self.max_steps {
            config.max_episode_steps = v;
        }
        config.validate()?;
        Ok(config)
    }
}

/// A policy chosen on the command line.
#[derive(Debug, Clone)]
pub(crate) enum CliPolicy {
    /// Uniform over legal actions.
    Uniform(UniformPolicy),
    /// Weight table loaded from JSON.
    Table(TablePolicy),
}

impl Policy for CliPolicy {
    fn select_action(&mut self, observation: Observation, legal: &ActionMask) -> ActionId {
        match self {
            Self::Uniform(p) => p.select_action(observation, legal),
            Self::Table(p) => p.select_action(observation, legal),
        }
    }
}

/// Weight table file: one row per observation, one column per action.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TableFile {
    /// Bare matrix.
    Matrix(Vec<Vec<f64>>),
    /// Matrix under a `table` key, optionally with a selection mode.
    Keyed {
        table: Vec<Vec<f64>>,
        mode: Option<SelectionMode>,
    },
}

/// A policy description that can be instantiated once per match.
#[derive(Debug, Clone)]
pub(crate) enum PolicySpec {
    /// Uniform over legal actions.
    Uniform,
    /// Validated weight table used as a prototype.
    Table(TablePolicy),
}

impl PolicySpec {
    /// Parse `uniform` or load a weight table file for `rule`.
    pub(crate) fn load(spec: &str, rule: &GameRule, mode: ModeArg) -> Result<Self, CliError> {
        if spec.eq_ignore_ascii_case("uniform") {
            return Ok(Self::Uniform);
        }
        let path = Path::new(spec);
        let text = fs::read_to_string(path)
            .map_err(|e| CliError::new(format!("Failed to read {}: {e}", path.display())))?;
        let file: TableFile = serde_json::from_str(&text)
            .map_err(|e| CliError::new(format!("Invalid table {}: {e}", path.display())))?;
        let (table, mode) = match file {
            TableFile::Matrix(table) => (table, mode.into()),
            TableFile::Keyed { table, mode: file_mode } => {
                (table, file_mode.unwrap_or_else(|| mode.into()))
            }
        };
        Ok(Self::Table(TablePolicy::new(rule, table, mode, 0)?))
    }

    /// Instantiate with its own random stream.
    pub(crate) fn build(&self, seed: u64) -> CliPolicy {
        match self {
            Self::Uniform => CliPolicy::Uniform(UniformPolicy::new(seed)),
            Self::Table(prototype) => CliPolicy::Table(prototype.with_seed(seed)),
        }
    }
}

/// Resolve the seed, drawing one from the OS when none was given.
pub(crate) fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(rand::random)
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<yun::ConfigError> for CliError {
    fn from(e: yun::ConfigError) -> Self {
        Self::new(format!("Invalid configuration: {e}"))
    }
}

impl From<yun::EpisodeError> for CliError {
    fn from(e: yun::EpisodeError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<yun::MatchError> for CliError {
    fn from(e: yun::MatchError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<yun::PolicyError> for CliError {
    fn from(e: yun::PolicyError) -> Self {
        Self::new(format!("Invalid policy table: {e}"))
    }
}
