//! Data models for the batch harness.
//!
//! This module contains the core data structures shared between the
//! dispatch loop, the aggregator, and the output writer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome category for a single contract analysis.
///
/// Categories are mutually exclusive and exhaustive: every dispatched
/// contract lands in exactly one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Analysis completed and every jump target was resolved.
    Resolved,
    /// Analysis completed but left at least one jump unresolved.
    Unresolved,
    /// Analysis exceeded the per-contract deadline and was terminated.
    Timeout,
    /// The contract could not be loaded or the analysis failed.
    Error,
}

impl Category {
    /// All categories, in reporting order.
    pub const ALL: [Category; 4] = [
        Category::Resolved,
        Category::Unresolved,
        Category::Timeout,
        Category::Error,
    ];

    /// Name of the output file this category's contract list is written to.
    pub fn file_name(&self) -> &'static str {
        match self {
            Category::Resolved => "resolved.txt",
            Category::Unresolved => "unresolved.txt",
            Category::Timeout => "timeout.txt",
            Category::Error => "error.txt",
        }
    }

    /// Human-readable label used in the end-of-run summary.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Resolved => "Resolved",
            Category::Unresolved => "Unresolved",
            Category::Timeout => "Timed Out",
            Category::Error => "Errors",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The categorized result of processing one contract.
///
/// Exactly one outcome is produced per dispatched contract: either by the
/// executor (Resolved/Unresolved/Error) or by the supervisor (Timeout, or
/// Error if the executor task panicked).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Contract identifier as yielded by the source.
    pub contract: String,
    /// Category the contract was filed under.
    pub category: Category,
}

impl Outcome {
    pub fn new(contract: impl Into<String>, category: Category) -> Self {
        Self {
            contract: contract.into(),
            category,
        }
    }
}

/// Shared, categorized collection of contract names accumulated over a run.
///
/// Mutated only by the aggregator while the batch is running; frozen and
/// read for serialization after the aggregator has stopped. Within each
/// category, insertion order is arrival order at the store, which is not
/// necessarily dispatch order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultStore {
    resolved: Vec<String>,
    unresolved: Vec<String>,
    timeout: Vec<String>,
    error: Vec<String>,
}

impl ResultStore {
    /// Append an outcome's contract to its category list.
    pub fn merge(&mut self, outcome: Outcome) {
        self.list_mut(outcome.category).push(outcome.contract);
    }

    /// The ordered contract list for one category.
    pub fn list(&self, category: Category) -> &[String] {
        match category {
            Category::Resolved => &self.resolved,
            Category::Unresolved => &self.unresolved,
            Category::Timeout => &self.timeout,
            Category::Error => &self.error,
        }
    }

    fn list_mut(&mut self, category: Category) -> &mut Vec<String> {
        match category {
            Category::Resolved => &mut self.resolved,
            Category::Unresolved => &mut self.unresolved,
            Category::Timeout => &mut self.timeout,
            Category::Error => &mut self.error,
        }
    }

    /// Number of contracts filed under one category.
    pub fn count(&self, category: Category) -> usize {
        self.list(category).len()
    }

    /// Total number of contracts across all categories.
    pub fn total(&self) -> usize {
        Category::ALL.iter().map(|c| self.count(*c)).sum()
    }

    /// Per-category counts for reporting.
    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            resolved: self.resolved.len(),
            unresolved: self.unresolved.len(),
            timeout: self.timeout.len(),
            error: self.error.len(),
            total: self.total(),
        }
    }
}

/// Per-category counts plus the grand total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub resolved: usize,
    pub unresolved: usize,
    pub timeout: usize,
    pub error: usize,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_file_names() {
        assert_eq!(Category::Resolved.file_name(), "resolved.txt");
        assert_eq!(Category::Unresolved.file_name(), "unresolved.txt");
        assert_eq!(Category::Timeout.file_name(), "timeout.txt");
        assert_eq!(Category::Error.file_name(), "error.txt");
    }

    #[test]
    fn test_merge_preserves_arrival_order() {
        let mut store = ResultStore::default();
        store.merge(Outcome::new("b.runtime.hex", Category::Resolved));
        store.merge(Outcome::new("a.runtime.hex", Category::Resolved));
        store.merge(Outcome::new("c.runtime.hex", Category::Timeout));

        assert_eq!(
            store.list(Category::Resolved),
            &["b.runtime.hex".to_string(), "a.runtime.hex".to_string()]
        );
        assert_eq!(
            store.list(Category::Timeout),
            &["c.runtime.hex".to_string()]
        );
        assert!(store.list(Category::Error).is_empty());
    }

    #[test]
    fn test_summary_counts() {
        let mut store = ResultStore::default();
        store.merge(Outcome::new("a", Category::Resolved));
        store.merge(Outcome::new("b", Category::Resolved));
        store.merge(Outcome::new("c", Category::Unresolved));
        store.merge(Outcome::new("d", Category::Error));

        let summary = store.summary();
        assert_eq!(summary.resolved, 2);
        assert_eq!(summary.unresolved, 1);
        assert_eq!(summary.timeout, 0);
        assert_eq!(summary.error, 1);
        assert_eq!(summary.total, 4);
        assert_eq!(store.total(), 4);
    }

    #[test]
    fn test_category_serializes_lowercase() {
        let json = serde_json::to_string(&Category::Timeout).unwrap();
        assert_eq!(json, "\"timeout\"");
    }
}
