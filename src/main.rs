//! Bulkanalyser - batch analysis harness for EVM bytecode contracts.
//!
//! Runs a directory (or manifest) of runtime bytecode dumps through the
//! analyzer, one supervised contract at a time, and sorts every outcome
//! into resolved / unresolved / timeout / error lists.
//!
//! Exit codes:
//!   0 - Batch completed (per-contract failures are outcomes, not errors)
//!   1 - Harness-level failure (bad arguments, unreadable inputs, etc.)

mod analysis;
mod cli;
mod config;
mod harness;
mod models;
mod report;
mod source;

use analysis::JumpAnalyzer;
use anyhow::{Context, Result};
use cli::Args;
use config::Config;
use harness::Harness;
use source::ContractSource;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Bulkanalyser v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the batch
    if let Err(e) = run_batch(args).await {
        error!("Batch failed: {}", e);
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .bulkanalyser.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".bulkanalyser.toml");

    if path.exists() {
        eprintln!("⚠️  .bulkanalyser.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .bulkanalyser.toml")?;

    println!("✅ Created .bulkanalyser.toml with default settings.");
    println!("   Edit it to customize deadlines, flush periods, and analysis caps.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete batch workflow.
async fn run_batch(args: Args) -> Result<()> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Step 1: Gather the contract names and slice out this batch.
    let source = match args.from_file {
        Some(ref manifest) => ContractSource::from_manifest(manifest)?,
        None => ContractSource::from_dir(&args.contract_dir)?,
    };
    if source.is_empty() {
        warn!("No contracts found to analyse");
    }
    let available = source.len();
    let contracts = source.slice(args.skip, args.num_contracts);

    if !args.quiet {
        println!(
            "🔬 Analysing {} of {} contracts ({}s deadline each)...",
            contracts.len(),
            available,
            config.harness.timeout_secs
        );
    }

    // Step 2: Run the harness over the batch.
    let harness = Harness::new(
        config.harness.to_harness_config(),
        args.contract_dir.clone(),
        Arc::new(JumpAnalyzer),
        config.analysis.to_options(),
    );
    let store = harness.run(contracts).await?;

    // Step 3: Write the category files and the summary.
    let results_dir = PathBuf::from(&config.output.results_dir);
    let run_report = report::RunReport::new(&store, start_time.elapsed().as_secs_f64());
    report::write_results(&results_dir, &store, &run_report)?;

    if !args.quiet {
        println!("\n📊 Batch summary:");
        report::print_summary(&store);
        println!("\n✅ Results written to: {}", results_dir.display());
        println!("   Duration: {:.1}s", run_report.duration_seconds);
    }

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .bulkanalyser.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
