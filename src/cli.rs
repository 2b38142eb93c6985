//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Bulkanalyser - batch analysis harness for EVM bytecode contracts
///
/// Runs every contract in a directory (or manifest) through the
/// analyzer under a per-contract deadline and sorts the outcomes into
/// resolved / unresolved / timeout / error lists.
///
/// Examples:
///   bulkanalyser -c contract_dump/contracts
///   bulkanalyser -c contracts -k 1000 -n 500 -t 60
///   bulkanalyser -f batch.txt -r results/run1 --strict
///   bulkanalyser --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// The location to grab contracts from (as bytecode files)
    #[arg(short, long, default_value = "contracts", value_name = "DIR")]
    pub contract_dir: PathBuf,

    /// The location to write the results
    ///
    /// Defaults to `results`, or the config file's value if one is set.
    #[arg(short, long, value_name = "DIR")]
    pub results_dir: Option<PathBuf>,

    /// A file listing the contracts to analyse, one per line, rather
    /// than simply processing all files in the contracts directory
    #[arg(short, long, value_name = "FILE")]
    pub from_file: Option<PathBuf>,

    /// The maximum number of contracts to process in this batch.
    /// Unlimited by default
    #[arg(short, long, value_name = "NUM")]
    pub num_contracts: Option<usize>,

    /// Skip the analysis of the first NUM contracts
    #[arg(short = 'k', long, default_value = "0", value_name = "NUM")]
    pub skip: usize,

    /// Forcibly halt analysing any single contract after the specified
    /// number of seconds
    ///
    /// Defaults to 120, or the config file's value if one is set.
    #[arg(short, long, value_name = "SECONDS", env = "BULKANALYSER_TIMEOUT")]
    pub timeout_secs: Option<u64>,

    /// Perform no more than the specified number of analysis
    /// iterations. Lower is faster, but potentially less precise. A
    /// negative value specifies no cap on the iteration count
    ///
    /// Uncapped by default, or the config file's value if one is set.
    #[arg(
        short = 'I',
        long,
        value_name = "ITERATIONS",
        allow_negative_numbers = true
    )]
    pub max_iter: Option<i64>,

    /// Begin to terminate the analysis if it's looking to take more
    /// time than the specified number of seconds. Bailing out early may
    /// make the results less precise. A negative value means no cap
    ///
    /// Uncapped by default, or the config file's value if one is set.
    #[arg(
        short = 'T',
        long,
        value_name = "SECONDS",
        allow_negative_numbers = true
    )]
    pub bail_time: Option<i64>,

    /// Unrecognised opcodes will not be skipped, but will result in an
    /// error
    #[arg(short, long)]
    pub strict: bool,

    /// Silence output
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .bulkanalyser.toml in the current directory
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Generate a default .bulkanalyser.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.timeout_secs == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref manifest) = self.from_file {
            if !manifest.is_file() {
                return Err(format!(
                    "Manifest file does not exist: {}",
                    manifest.display()
                ));
            }
        } else if !self.contract_dir.is_dir() {
            return Err(format!(
                "Contract directory does not exist: {}",
                self.contract_dir.display()
            ));
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
