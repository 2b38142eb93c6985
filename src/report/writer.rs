//! Writes category files and the JSON run summary.
//!
//! Each category's contract list goes to its own newline-separated text
//! file in the results directory; `summary.json` carries the counts and
//! run metadata for machine consumption.

use crate::models::{BatchSummary, Category, ResultStore};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Machine-readable run summary, written alongside the category files.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// When the batch finished.
    pub finished_at: DateTime<Utc>,
    /// Total batch duration in seconds.
    pub duration_seconds: f64,
    /// Per-category counts.
    pub counts: BatchSummary,
}

impl RunReport {
    pub fn new(store: &ResultStore, duration_seconds: f64) -> Self {
        Self {
            finished_at: Utc::now(),
            duration_seconds,
            counts: store.summary(),
        }
    }
}

/// Write the four category files and the JSON summary.
pub fn write_results(results_dir: &Path, store: &ResultStore, report: &RunReport) -> Result<()> {
    fs::create_dir_all(results_dir).with_context(|| {
        format!(
            "Failed to create results directory: {}",
            results_dir.display()
        )
    })?;

    for category in Category::ALL {
        let path = results_dir.join(category.file_name());
        let mut body = store.list(category).join("\n");
        body.push('\n');
        fs::write(&path, body)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    let summary_path = results_dir.join("summary.json");
    let json = serde_json::to_string_pretty(report).context("Failed to serialize run summary")?;
    fs::write(&summary_path, json)
        .with_context(|| format!("Failed to write {}", summary_path.display()))?;

    info!("Results written to {}", results_dir.display());
    Ok(())
}

/// Print per-category counts and the grand total.
pub fn print_summary(store: &ResultStore) {
    let total = store.total();
    for category in Category::ALL {
        println!("{}: {}/{}", category.label(), store.count(category), total);
    }
}
