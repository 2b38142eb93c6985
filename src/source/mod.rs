//! Contract discovery and batch slicing.
//!
//! A `ContractSource` yields an ordered, finite sequence of contract
//! names, either by scanning a directory for runtime bytecode files or by
//! reading a manifest file. The dispatch loop consumes the sequence once,
//! in order, one contract at a time.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Suffix identifying runtime bytecode dumps in a contract directory.
pub const RUNTIME_SUFFIX: &str = "runtime.hex";

/// Ordered source of contract names for one batch run.
#[derive(Debug, Clone)]
pub struct ContractSource {
    names: Vec<String>,
}

impl ContractSource {
    /// Scan a directory for `*runtime.hex` files.
    ///
    /// Names are sorted so batches are reproducible across platforms;
    /// subdirectories are not descended into (contract dumps are flat).
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let entries = fs::read_dir(dir)
            .with_context(|| format!("Failed to read contract directory: {}", dir.display()))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry
                .with_context(|| format!("Failed to list contract directory: {}", dir.display()))?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name.ends_with(RUNTIME_SUFFIX) && entry.path().is_file() {
                names.push(name);
            }
        }
        names.sort();

        debug!("Found {} contracts in {}", names.len(), dir.display());
        Ok(Self { names })
    }

    /// Read contract names from a manifest file, one per non-empty line.
    ///
    /// Manifest order is preserved as written.
    pub fn from_manifest(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest file: {}", path.display()))?;

        let names = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect::<Vec<_>>();

        debug!("Manifest {} lists {} contracts", path.display(), names.len());
        Ok(Self { names })
    }

    /// Number of contracts available before slicing.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Drop the first `skip` names, then take at most `limit`.
    pub fn slice(self, skip: usize, limit: Option<usize>) -> Vec<String> {
        let iter = self.names.into_iter().skip(skip);
        match limit {
            Some(limit) => iter.take(limit).collect(),
            None => iter.collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    fn make_source(names: &[&str]) -> ContractSource {
        ContractSource {
            names: names.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_from_dir_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.runtime.hex", "a.runtime.hex", "notes.txt", "c.hex"] {
            File::create(dir.path().join(name)).unwrap();
        }

        let source = ContractSource::from_dir(dir.path()).unwrap();
        assert_eq!(
            source.slice(0, None),
            vec!["a.runtime.hex".to_string(), "b.runtime.hex".to_string()]
        );
    }

    #[test]
    fn test_empty_dir_yields_empty_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = ContractSource::from_dir(dir.path()).unwrap();
        assert!(source.is_empty());
        assert_eq!(source.len(), 0);
    }

    #[test]
    fn test_from_dir_missing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(ContractSource::from_dir(&missing).is_err());
    }

    #[test]
    fn test_from_manifest_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("batch.txt");
        let mut file = File::create(&manifest).unwrap();
        writeln!(file, "z.runtime.hex").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  a.runtime.hex  ").unwrap();

        let source = ContractSource::from_manifest(&manifest).unwrap();
        assert_eq!(
            source.slice(0, None),
            vec!["z.runtime.hex".to_string(), "a.runtime.hex".to_string()]
        );
    }

    #[test]
    fn test_slice_skip_and_limit() {
        let names: Vec<String> = (0..10).map(|i| format!("c{i}.runtime.hex")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();

        // skip=2, limit=3 over 10 contracts yields positions 2,3,4.
        let sliced = make_source(&refs).slice(2, Some(3));
        assert_eq!(sliced, vec!["c2.runtime.hex", "c3.runtime.hex", "c4.runtime.hex"]);
    }

    #[test]
    fn test_slice_past_end() {
        let sliced = make_source(&["a", "b"]).slice(5, Some(3));
        assert!(sliced.is_empty());

        let sliced = make_source(&["a", "b"]).slice(1, Some(10));
        assert_eq!(sliced, vec!["b"]);
    }
}
