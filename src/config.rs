//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.bulkanalyser.toml` files.

use crate::analysis::AnalysisOptions;
use crate::harness::HarnessConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Harness timing settings.
    #[serde(default)]
    pub harness: HarnessSection,

    /// Analysis settings.
    #[serde(default)]
    pub analysis: AnalysisSection,

    /// Output settings.
    #[serde(default)]
    pub output: OutputSection,
}

/// Harness timing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessSection {
    /// Per-contract deadline in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Supervisor poll interval in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Aggregator flush period in seconds.
    #[serde(default = "default_flush_period_secs")]
    pub flush_period_secs: u64,

    /// Grace period for the aggregator to stop at shutdown, in seconds.
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,
}

impl Default for HarnessSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            flush_period_secs: default_flush_period_secs(),
            shutdown_grace_secs: default_shutdown_grace_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_poll_interval_ms() -> u64 {
    10
}

fn default_flush_period_secs() -> u64 {
    3
}

fn default_shutdown_grace_secs() -> u64 {
    4
}

impl HarnessSection {
    /// Build the harness timing config from this section.
    pub fn to_harness_config(&self) -> HarnessConfig {
        HarnessConfig {
            deadline: Duration::from_secs(self.timeout_secs),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            flush_period: Duration::from_secs(self.flush_period_secs),
            shutdown_grace: Duration::from_secs(self.shutdown_grace_secs),
        }
    }
}

/// Analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSection {
    /// Cap on analysis iterations; negative means uncapped.
    #[serde(default = "default_uncapped")]
    pub max_iterations: i64,

    /// Analysis bailout time in seconds; negative means uncapped.
    #[serde(default = "default_uncapped")]
    pub bailout_seconds: i64,

    /// Treat unrecognised opcodes as errors.
    #[serde(default)]
    pub strict: bool,
}

impl Default for AnalysisSection {
    fn default() -> Self {
        Self {
            max_iterations: default_uncapped(),
            bailout_seconds: default_uncapped(),
            strict: false,
        }
    }
}

fn default_uncapped() -> i64 {
    -1
}

impl AnalysisSection {
    /// Build the analyzer options from this section.
    pub fn to_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            max_iterations: usize::try_from(self.max_iterations).ok(),
            bailout: u64::try_from(self.bailout_seconds)
                .ok()
                .map(Duration::from_secs),
            strict: self.strict,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    /// Directory to write the category files and summary into.
    #[serde(default = "default_results_dir")]
    pub results_dir: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
        }
    }
}

fn default_results_dir() -> String {
    "results".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".bulkanalyser.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but
    /// only when explicitly provided; an absent flag leaves the config
    /// file's value in place.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(timeout) = args.timeout_secs {
            self.harness.timeout_secs = timeout;
        }
        if let Some(max_iter) = args.max_iter {
            self.analysis.max_iterations = max_iter;
        }
        if let Some(bail_time) = args.bail_time {
            self.analysis.bailout_seconds = bail_time;
        }

        if args.strict {
            self.analysis.strict = true;
        }

        if let Some(ref dir) = args.results_dir {
            self.output.results_dir = dir.display().to_string();
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
