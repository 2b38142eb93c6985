//! Deadline supervision of one contract at a time.
//!
//! Each contract's executor runs on its own tokio task, which is the
//! failure domain: a hang is cut off by aborting the task at the
//! deadline, and a panic is absorbed at the join. The supervisor never
//! raises either upward; both are ordinary outcomes.

use super::executor::Executor;
use crate::models::{Category, Outcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{sleep, Instant};
use tracing::{info, warn};

/// Supervises one executor task at a time against a deadline.
pub struct Supervisor {
    executor: Arc<Executor>,
    results: UnboundedSender<Outcome>,
    deadline: Duration,
    poll_interval: Duration,
}

impl Supervisor {
    pub fn new(
        executor: Executor,
        results: UnboundedSender<Outcome>,
        deadline: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            executor: Arc::new(executor),
            results,
            deadline,
            poll_interval,
        }
    }

    /// Run one contract under the deadline.
    ///
    /// The executor task enqueues its own outcome; the supervisor only
    /// enqueues when the task did not get to do so (timeout or panic).
    pub async fn run(&self, contract: &str) {
        let executor = Arc::clone(&self.executor);
        let results = self.results.clone();
        let name = contract.to_string();
        let handle = tokio::spawn(async move { executor.execute(&name, &results).await });

        let started = Instant::now();
        while started.elapsed() < self.deadline {
            if handle.is_finished() {
                break;
            }
            sleep(self.poll_interval).await;
        }

        if !handle.is_finished() {
            handle.abort();
            info!("{contract}: timed out after {:?}", self.deadline);
        }

        // Joining adjudicates the race between completion and abort.
        // `send` on an unbounded channel has no await point, so a
        // cancelled join proves the executor never enqueued and the
        // timeout outcome below is the only one for this contract.
        match handle.await {
            Ok(()) => {}
            Err(e) if e.is_cancelled() => {
                let _ = self
                    .results
                    .send(Outcome::new(contract, Category::Timeout));
            }
            Err(e) => {
                warn!("{contract}: analysis task panicked: {e}");
                let _ = self.results.send(Outcome::new(contract, Category::Error));
            }
        }
    }
}
