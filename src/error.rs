//! Error types for result aggregation and run dispatch.
//!
//! Errors fall into three groups:
//!
//! | Group | Variants | Raised |
//! |-------|----------|--------|
//! | **Call boundary** | `ArgumentCountMismatch`, `ArgumentTypeMismatch`, `InvalidTarget`, `InvalidShots` | Synchronously, before any work is dispatched |
//! | **Lookup** | `UnknownRegister`, `AmbiguousRegister`, `IndexOutOfRange`, `DuplicateIndex`, `LengthMismatch` | On access; the queried result is left untouched |
//! | **Ingestion / run** | `InvalidBitstring`, `CountOverflow`, `MalformedResult`, `ExecutionFailed`, `Configuration` | While building a result or a platform |
//!
//! Nothing is retried internally.

use thiserror::Error;

use crate::kernel::ParamType;

/// Errors raised by the aggregator and its dispatch layer.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum MeasureError {
    // ── Call boundary ────────────────────────────────────────────────
    /// Kernel invoked with the wrong number of run-time arguments.
    #[error("Kernel '{kernel}' expects {expected} argument(s), got {found}")]
    ArgumentCountMismatch {
        kernel: String,
        expected: usize,
        found: usize,
    },

    /// A run-time argument does not match the declared parameter type.
    #[error("Kernel '{kernel}' argument {position}: expected {expected}, got {found}")]
    ArgumentTypeMismatch {
        kernel: String,
        position: usize,
        expected: ParamType,
        found: ParamType,
    },

    /// Requested target id is not in the registry.
    #[error("Invalid target id {id} ({available} target(s) available)")]
    InvalidTarget { id: usize, available: usize },

    /// Shot count is neither positive nor the analytic marker `-1`.
    #[error("Invalid shots: {0}")]
    InvalidShots(String),

    // ── Lookup ───────────────────────────────────────────────────────
    /// Register (or Hamiltonian term) not present in the result.
    #[error("Unknown register: {0}")]
    UnknownRegister(String),

    /// Single-register query on a result holding several registers.
    #[error("Result holds several registers ({}); select one by name", .0.join(", "))]
    AmbiguousRegister(Vec<String>),

    /// Marginal index outside `[0, width)`.
    #[error("Qubit index {index} out of range for bitstrings of width {width}")]
    IndexOutOfRange { index: usize, width: usize },

    /// Marginal index listed more than once.
    #[error("Qubit index {0} listed more than once")]
    DuplicateIndex(usize),

    /// Bitstring width differs from the counter's fixed width.
    #[error("Bitstring has width {found}, counter holds width {expected}")]
    LengthMismatch { expected: usize, found: usize },

    // ── Ingestion / run ──────────────────────────────────────────────
    /// Bitstring contains a symbol other than `0` or `1`.
    #[error("Invalid bitstring: {0:?}")]
    InvalidBitstring(String),

    /// Recording a count would push the total past `u64::MAX`.
    #[error("Count overflow recording {0:?}")]
    CountOverflow(String),

    /// Stored result data violates a result invariant.
    #[error("Malformed result: {0}")]
    MalformedResult(String),

    /// The executor failed or returned unusable data.
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    /// Platform configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl MeasureError {
    /// Returns `true` if the error was raised at the call boundary, before dispatch.
    pub fn is_call_boundary(&self) -> bool {
        matches!(
            self,
            Self::ArgumentCountMismatch { .. }
                | Self::ArgumentTypeMismatch { .. }
                | Self::InvalidTarget { .. }
                | Self::InvalidShots(_)
        )
    }

    /// Returns `true` for errors raised while querying an existing result.
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            Self::UnknownRegister(_)
                | Self::AmbiguousRegister(_)
                | Self::IndexOutOfRange { .. }
                | Self::DuplicateIndex(_)
                | Self::LengthMismatch { .. }
        )
    }
}

/// Result type for aggregator operations.
pub type MeasureResult<T> = Result<T, MeasureError>;
