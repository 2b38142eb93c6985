//! Analyzer interface and the built-in jump-resolution analyzer.
//!
//! The harness is generic over anything implementing [`Analyze`]; the
//! executor only maps the verdict's flags onto outcome categories.

mod jump;

pub use jump::JumpAnalyzer;

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Tuning knobs passed through to the analysis, process-wide.
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    /// Cap on analysis iterations; `None` means uncapped.
    pub max_iterations: Option<usize>,
    /// Begin terminating the analysis once this much time has elapsed;
    /// `None` means uncapped. Bailing out early may leave the verdict
    /// less precise but is not an error.
    pub bailout: Option<Duration>,
    /// Treat unrecognised opcodes as errors instead of skipping them.
    pub strict: bool,
}

/// What the analysis reported about one contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisVerdict {
    /// Whether the analysis ran to its natural end, as opposed to
    /// stopping at the iteration cap or the bailout time.
    pub completed: bool,
    /// Whether any jump was left without a resolved target.
    pub unresolved: bool,
}

/// Analysis failures attributable to the contract payload itself.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("payload is not valid hex at byte {offset}")]
    InvalidHex { offset: usize },

    #[error("odd-length hex payload")]
    OddLength,

    #[error("unrecognised opcode 0x{opcode:02x} at offset {offset}")]
    UnknownOpcode { opcode: u8, offset: usize },
}

/// A contract analysis.
///
/// Implementations should yield to the scheduler periodically: deadline
/// enforcement cancels the surrounding task, and cancellation can only
/// land at an await point.
#[async_trait]
pub trait Analyze: Send + Sync {
    /// Analyze one contract's runtime bytecode.
    async fn analyze(&self, bytecode: &str, options: &AnalysisOptions) -> Result<AnalysisVerdict>;
}
