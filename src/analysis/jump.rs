//! Syntactic jump-target analysis over raw EVM runtime bytecode.
//!
//! Walks the instruction stream once and flags any `JUMP`/`JUMPI` whose
//! target is not a constant pushed by the immediately preceding
//! instruction. Dynamic targets need dataflow to resolve, so such jumps
//! are reported as unresolved.

use super::{Analyze, AnalysisError, AnalysisOptions, AnalysisVerdict};
use anyhow::Result;
use async_trait::async_trait;
use std::time::Instant;
use tracing::trace;

const OP_JUMP: u8 = 0x56;
const OP_JUMPI: u8 = 0x57;
const OP_PUSH1: u8 = 0x60;
const OP_PUSH32: u8 = 0x7f;

/// Instructions scanned between scheduler yields and bailout checks.
const CHECK_STRIDE: usize = 4096;

/// The built-in analyzer.
#[derive(Debug, Clone, Copy, Default)]
pub struct JumpAnalyzer;

#[async_trait]
impl Analyze for JumpAnalyzer {
    async fn analyze(&self, bytecode: &str, options: &AnalysisOptions) -> Result<AnalysisVerdict> {
        let code = decode_hex(bytecode)?;
        let started = Instant::now();

        let mut pc = 0usize;
        let mut steps = 0usize;
        let mut prev_was_push = false;
        let mut unresolved = false;
        let mut completed = true;

        while pc < code.len() {
            if let Some(max) = options.max_iterations {
                if steps >= max {
                    trace!("iteration cap of {max} hit at offset {pc}");
                    completed = false;
                    break;
                }
            }
            if steps % CHECK_STRIDE == 0 {
                // Yield so a deadline abort can land mid-scan.
                tokio::task::yield_now().await;
                if let Some(bailout) = options.bailout {
                    if started.elapsed() >= bailout {
                        trace!("bailout after {:?} at offset {pc}", started.elapsed());
                        completed = false;
                        break;
                    }
                }
            }

            let op = code[pc];
            match op {
                OP_PUSH1..=OP_PUSH32 => {
                    // Immediate data follows; a truncated push just ends
                    // the stream.
                    let width = (op - OP_PUSH1) as usize + 1;
                    pc += 1 + width;
                    prev_was_push = true;
                }
                OP_JUMP | OP_JUMPI => {
                    if !prev_was_push {
                        unresolved = true;
                    }
                    prev_was_push = false;
                    pc += 1;
                }
                _ => {
                    if options.strict && !is_defined(op) {
                        return Err(
                            AnalysisError::UnknownOpcode { opcode: op, offset: pc }.into()
                        );
                    }
                    prev_was_push = false;
                    pc += 1;
                }
            }
            steps += 1;
        }

        Ok(AnalysisVerdict {
            completed,
            unresolved,
        })
    }
}

/// Decode a hex payload, tolerating surrounding whitespace and an
/// optional `0x` prefix.
fn decode_hex(payload: &str) -> Result<Vec<u8>, AnalysisError> {
    let hex = payload.trim();
    let hex = hex.strip_prefix("0x").unwrap_or(hex);

    if !hex.is_ascii() {
        let offset = hex.bytes().position(|b| !b.is_ascii()).unwrap_or(0) / 2;
        return Err(AnalysisError::InvalidHex { offset });
    }
    if hex.len() % 2 != 0 {
        return Err(AnalysisError::OddLength);
    }

    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| AnalysisError::InvalidHex { offset: i / 2 })
        })
        .collect()
}

/// Whether an opcode is part of the EVM instruction set.
///
/// Anything outside these ranges (including the Solidity metadata tail)
/// is skipped unless strict mode is on.
fn is_defined(op: u8) -> bool {
    matches!(op,
        0x00..=0x0b            // arithmetic
        | 0x10..=0x1d          // comparison and bitwise
        | 0x20                 // keccak256
        | 0x30..=0x3f          // environment
        | 0x40..=0x48          // block context
        | 0x50..=0x5b          // stack, memory, storage, flow
        | 0x5f..=0x7f          // push
        | 0x80..=0x8f          // dup
        | 0x90..=0x9f          // swap
        | 0xa0..=0xa4          // log
        | 0xf0..=0xf5          // create and call
        | 0xfa                 // staticcall
        | 0xfd                 // revert
        | 0xff                 // selfdestruct
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn run(bytecode: &str, options: AnalysisOptions) -> Result<AnalysisVerdict> {
        JumpAnalyzer.analyze(bytecode, &options).await
    }

    #[tokio::test]
    async fn test_constant_jump_is_resolved() {
        // PUSH1 0x04; JUMP; JUMPDEST; STOP
        let verdict = run("6004565b00", AnalysisOptions::default()).await.unwrap();
        assert!(verdict.completed);
        assert!(!verdict.unresolved);
    }

    #[tokio::test]
    async fn test_dynamic_jump_is_unresolved() {
        // DUP1; JUMP - the target comes off the stack.
        let verdict = run("8056", AnalysisOptions::default()).await.unwrap();
        assert!(verdict.completed);
        assert!(verdict.unresolved);
    }

    #[tokio::test]
    async fn test_constant_jumpi_is_resolved() {
        // PUSH1 0x01; PUSH1 0x06; JUMPI; STOP; JUMPDEST
        let verdict = run("60016006570b5b", AnalysisOptions::default())
            .await
            .unwrap();
        assert!(!verdict.unresolved);
    }

    #[tokio::test]
    async fn test_prefix_and_whitespace_tolerated() {
        let verdict = run("  0x6004565b00\n", AnalysisOptions::default())
            .await
            .unwrap();
        assert!(!verdict.unresolved);
    }

    #[tokio::test]
    async fn test_push_data_is_not_decoded() {
        // PUSH2 0x5656: the jump opcodes inside the immediate must be
        // skipped, not treated as instructions.
        let verdict = run("615656", AnalysisOptions::default()).await.unwrap();
        assert!(!verdict.unresolved);
    }

    #[tokio::test]
    async fn test_invalid_hex_rejected() {
        assert!(run("60zz", AnalysisOptions::default()).await.is_err());
        assert!(run("600", AnalysisOptions::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_strict_rejects_unknown_opcode() {
        // 0x0c is not a defined instruction.
        let strict = AnalysisOptions {
            strict: true,
            ..Default::default()
        };
        assert!(run("0c", strict).await.is_err());

        // Skipped when not strict.
        let verdict = run("0c", AnalysisOptions::default()).await.unwrap();
        assert!(verdict.completed);
    }

    #[tokio::test]
    async fn test_iteration_cap_marks_incomplete() {
        let capped = AnalysisOptions {
            max_iterations: Some(1),
            ..Default::default()
        };
        // STOP; DUP1; JUMP - the unresolved jump is never reached.
        let verdict = run("008056", capped).await.unwrap();
        assert!(!verdict.completed);
        assert!(!verdict.unresolved);
    }

    #[tokio::test]
    async fn test_zero_bailout_marks_incomplete() {
        let bailed = AnalysisOptions {
            bailout: Some(Duration::ZERO),
            ..Default::default()
        };
        let verdict = run("8056", bailed).await.unwrap();
        assert!(!verdict.completed);
    }
}
