//! The batch harness core.
//!
//! Sequential dispatch of contracts under deadline supervision, with a
//! concurrently-running aggregator draining outcomes into the shared
//! result store. One isolated task is in flight at a time: isolation
//! over throughput.

mod aggregator;
mod executor;
mod supervisor;

pub use executor::Executor;
pub use supervisor::Supervisor;

use crate::analysis::{Analyze, AnalysisOptions};
use crate::models::ResultStore;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Timing knobs for the harness core.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Wall-clock budget per contract.
    pub deadline: Duration,
    /// How often the supervisor checks on the running task.
    pub poll_interval: Duration,
    /// How often the aggregator drains the result channel.
    pub flush_period: Duration,
    /// How long to wait for the aggregator to stop before aborting it.
    pub shutdown_grace: Duration,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(120),
            poll_interval: Duration::from_millis(10),
            flush_period: Duration::from_secs(3),
            shutdown_grace: Duration::from_secs(4),
        }
    }
}

/// Runs one batch of contracts to a finalized result store.
pub struct Harness {
    config: HarnessConfig,
    contract_dir: PathBuf,
    analyzer: Arc<dyn Analyze>,
    options: AnalysisOptions,
}

impl Harness {
    pub fn new(
        config: HarnessConfig,
        contract_dir: PathBuf,
        analyzer: Arc<dyn Analyze>,
        options: AnalysisOptions,
    ) -> Self {
        Self {
            config,
            contract_dir,
            analyzer,
            options,
        }
    }

    /// Run the whole batch and return the finalized result store.
    ///
    /// Task-level failures never surface here; they are already
    /// categorized outcomes. The only errors are harness-level (the
    /// aggregator task itself failing), and even then the background
    /// work is stopped before the error propagates.
    pub async fn run(&self, contracts: Vec<String>) -> Result<ResultStore> {
        let (tx, rx) = mpsc::unbounded_channel();
        let store = Arc::new(Mutex::new(ResultStore::default()));
        let mut aggregator = aggregator::spawn(rx, Arc::clone(&store), self.config.flush_period);

        let executor = Executor::new(
            self.contract_dir.clone(),
            Arc::clone(&self.analyzer),
            self.options.clone(),
        );
        let supervisor = Supervisor::new(
            executor,
            tx,
            self.config.deadline,
            self.config.poll_interval,
        );

        for (i, contract) in contracts.iter().enumerate() {
            info!("{i}: {contract}");
            supervisor.run(contract).await;
        }

        // Dropping the supervisor drops the last sender; the closed
        // channel tells the aggregator to finish its final drain and
        // stop. Nothing enqueued up to this point can be lost.
        drop(supervisor);

        match tokio::time::timeout(self.config.shutdown_grace, &mut aggregator).await {
            Ok(joined) => joined.context("aggregator task failed")?,
            Err(_) => {
                // Leave no background work orphaned.
                aggregator.abort();
                warn!("aggregator did not stop within the grace period; aborted");
            }
        }

        let store = Arc::try_unwrap(store)
            .map(|m| m.into_inner().unwrap_or_else(|e| e.into_inner()))
            .unwrap_or_else(|arc| aggregator::lock_store(&arc).clone());
        Ok(store)
    }
}
