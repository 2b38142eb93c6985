//! Per-contract execution inside the supervised task.
//!
//! The executor is the failure boundary for everything task-level:
//! loading the payload, running the analysis, and classifying the
//! result. All failures are contained here and become Error outcomes;
//! nothing propagates to the dispatch loop.

use crate::analysis::{Analyze, AnalysisOptions, AnalysisVerdict};
use crate::models::{Category, Outcome};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// Runs the analysis for one contract and emits exactly one outcome.
pub struct Executor {
    contract_dir: PathBuf,
    analyzer: Arc<dyn Analyze>,
    options: AnalysisOptions,
}

impl Executor {
    pub fn new(contract_dir: PathBuf, analyzer: Arc<dyn Analyze>, options: AnalysisOptions) -> Self {
        Self {
            contract_dir,
            analyzer,
            options,
        }
    }

    /// Run one contract and enqueue its outcome as the final action.
    ///
    /// A send failure means the batch is already shutting down and the
    /// receiver is gone; there is nowhere left to record the outcome.
    pub async fn execute(&self, contract: &str, results: &UnboundedSender<Outcome>) {
        let category = match self.analyse(contract).await {
            Ok(verdict) => {
                if !verdict.completed {
                    debug!("{contract}: analysis stopped before its natural end");
                }
                if verdict.unresolved {
                    debug!("{contract}: unresolved");
                    Category::Unresolved
                } else {
                    Category::Resolved
                }
            }
            Err(e) => {
                debug!("{contract}: error: {e:#}");
                Category::Error
            }
        };

        let _ = results.send(Outcome::new(contract, category));
    }

    async fn analyse(&self, contract: &str) -> Result<AnalysisVerdict> {
        let path = self.contract_dir.join(contract);
        let payload = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read contract: {}", path.display()))?;

        self.analyzer.analyze(&payload, &self.options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::JumpAnalyzer;
    use std::fs;
    use tokio::sync::mpsc;

    fn executor_for(dir: &std::path::Path) -> Executor {
        Executor::new(
            dir.to_path_buf(),
            Arc::new(JumpAnalyzer),
            AnalysisOptions::default(),
        )
    }

    #[tokio::test]
    async fn test_execute_classifies_resolved() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ok.runtime.hex"), "6004565b00").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        executor_for(dir.path()).execute("ok.runtime.hex", &tx).await;

        let outcome = rx.try_recv().unwrap();
        assert_eq!(outcome, Outcome::new("ok.runtime.hex", Category::Resolved));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_execute_classifies_unresolved() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("dyn.runtime.hex"), "8056").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        executor_for(dir.path()).execute("dyn.runtime.hex", &tx).await;

        assert_eq!(
            rx.try_recv().unwrap(),
            Outcome::new("dyn.runtime.hex", Category::Unresolved)
        );
    }

    #[tokio::test]
    async fn test_missing_contract_is_an_error_outcome() {
        let dir = tempfile::tempdir().unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        executor_for(dir.path()).execute("gone.runtime.hex", &tx).await;

        assert_eq!(
            rx.try_recv().unwrap(),
            Outcome::new("gone.runtime.hex", Category::Error)
        );
    }

    #[tokio::test]
    async fn test_malformed_payload_is_an_error_outcome() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.runtime.hex"), "not hex at all").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        executor_for(dir.path()).execute("bad.runtime.hex", &tx).await;

        assert_eq!(
            rx.try_recv().unwrap(),
            Outcome::new("bad.runtime.hex", Category::Error)
        );
    }
}
