//! Unified error handling for the effect framework.
//!
//! This module defines [`EffectError`], the central error type used across
//! column routing, the effect lifecycle, prior sampling, and coefficient
//! assembly, together with the crate-wide alias [`EffectResult`]. Variants
//! are grouped by the failure taxonomy: configuration errors (caller bugs in
//! how effects are declared), lifecycle-order errors (methods called out of
//! sequence), data-shape/support errors, and a catch-all that integrates
//! with `anyhow::Error` via `From`.
//!
//! ## Conventions
//! - Indices are 0-based; error payloads carry the first offending position
//!   or name so messages are actionable without a debugger.
//! - Nothing here is retried; every failure propagates synchronously to the
//!   caller.

use statrs::distribution::{GammaError, NormalError};

/// Crate-wide result alias for operations that may produce [`EffectError`].
pub type EffectResult<T> = Result<T, EffectError>;

/// Unified error type for the effect framework.
///
/// Covers effect configuration, lifecycle ordering, frame validation, prior
/// construction and sampling, and a generic passthrough for wrapped errors.
/// Implements `Display`/`Error` with hand-written, readable diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub enum EffectError {
    // ---- Configuration ----
    /// Effect identity is empty; identities namespace random variables and
    /// must be non-empty.
    EmptyId,

    /// Column matching was requested but the effect declares no selection
    /// pattern.
    MissingPattern { id: String },

    /// A selection pattern failed to compile.
    InvalidPattern { pattern: String, reason: String },

    /// Two prior groups claim the same column(s).
    OverlappingPriorGroups { columns: Vec<String> },

    /// Trailing data dimension does not match the coefficient length.
    DimensionMismatch { data_cols: usize, coef_len: usize },

    /// A prior parameter is out of its family's domain.
    InvalidPriorParam { param: f64, reason: &'static str },

    /// A fixed prior or conditioned value has the wrong length for the
    /// requested draw.
    PriorLengthMismatch { expected: usize, actual: usize },

    /// A variable name was declared twice in one trace.
    DuplicateVariable { name: String },

    // ---- Lifecycle order ----
    /// `prepare_input_data` or `apply` was called before `initialize`.
    NotInitialized { id: String },

    /// `apply` ran without the prepared tensor it needs, i.e.
    /// `prepare_input_data` was not called for this evaluation.
    InputNotPrepared { id: String, key: String },

    // ---- Data shape / support ----
    /// A panel (two-level index) frame was supplied to an effect that does
    /// not support multivariate data.
    MultivariateUnsupported { id: String },

    /// A requested column is absent from the frame.
    ColumnNotFound { column: String },

    /// A frame with zero rows was supplied.
    EmptyFrame,

    /// A repeated column name in a frame.
    DuplicateColumn { column: String },

    /// A frame value is NaN or ±inf.
    NonFiniteValue { column: String, row: usize, value: f64 },

    /// Frame values disagree with the declared columns or index.
    FrameShapeMismatch {
        rows: usize,
        expected_rows: usize,
        cols: usize,
        expected_cols: usize,
    },

    /// A tensor of unsupported rank reached an operation that handles only
    /// rank-2 and rank-3 inputs.
    UnsupportedRank { ndim: usize },

    /// Trend and raw effect shapes cannot be broadcast together.
    BroadcastMismatch { trend_shape: Vec<usize>, raw_shape: Vec<usize> },

    // ---- Anyhow catchall ----
    Anyhow(String),
}

impl From<anyhow::Error> for EffectError {
    fn from(err: anyhow::Error) -> Self {
        EffectError::Anyhow(err.to_string())
    }
}

impl From<NormalError> for EffectError {
    fn from(_: NormalError) -> Self {
        EffectError::InvalidPriorParam {
            param: f64::NAN,
            reason: "Normal prior parameters rejected by statrs.",
        }
    }
}

impl From<GammaError> for EffectError {
    fn from(_: GammaError) -> Self {
        EffectError::InvalidPriorParam {
            param: f64::NAN,
            reason: "Gamma prior parameters rejected by statrs.",
        }
    }
}

impl std::fmt::Display for EffectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Configuration ----
            EffectError::EmptyId => {
                write!(f, "Effect Error: Effect identity must be a non-empty string")
            }
            EffectError::MissingPattern { id } => {
                write!(
                    f,
                    "Effect Error: Effect '{}' requires a selection pattern but none was set",
                    id
                )
            }
            EffectError::InvalidPattern { pattern, reason } => {
                write!(f, "Effect Error: Invalid selection pattern '{}': {}", pattern, reason)
            }
            EffectError::OverlappingPriorGroups { columns } => {
                write!(
                    f,
                    "Effect Error: Columns {:?} are claimed by more than one prior group",
                    columns
                )
            }
            EffectError::DimensionMismatch { data_cols, coef_len } => {
                write!(
                    f,
                    "Effect Error: Trailing data dimension ({}) does not match coefficient \
                     length ({})",
                    data_cols, coef_len
                )
            }
            EffectError::InvalidPriorParam { param, reason } => {
                write!(f, "Effect Error: Invalid prior parameter ({}): {}", param, reason)
            }
            EffectError::PriorLengthMismatch { expected, actual } => {
                write!(
                    f,
                    "Effect Error: Fixed values of length {} supplied where {} were expected",
                    actual, expected
                )
            }
            EffectError::DuplicateVariable { name } => {
                write!(f, "Effect Error: Variable '{}' was already declared in this trace", name)
            }

            // ---- Lifecycle order ----
            EffectError::NotInitialized { id } => {
                write!(
                    f,
                    "Effect Error: Effect '{}' must be initialized before this method is called",
                    id
                )
            }
            EffectError::InputNotPrepared { id, key } => {
                write!(
                    f,
                    "Effect Error: Effect '{}' is missing prepared input '{}'; call \
                     prepare_input_data first",
                    id, key
                )
            }

            // ---- Data shape / support ----
            EffectError::MultivariateUnsupported { id } => {
                write!(f, "Effect Error: Effect '{}' does not support multivariate data", id)
            }
            EffectError::ColumnNotFound { column } => {
                write!(f, "Effect Error: Column '{}' not found in the frame", column)
            }
            EffectError::EmptyFrame => {
                write!(f, "Effect Error: Frame has no rows")
            }
            EffectError::DuplicateColumn { column } => {
                write!(f, "Effect Error: Duplicate column name '{}' in frame", column)
            }
            EffectError::NonFiniteValue { column, row, value } => {
                write!(
                    f,
                    "Effect Error: Non-finite value {} in column '{}' at row {}",
                    value, column, row
                )
            }
            EffectError::FrameShapeMismatch { rows, expected_rows, cols, expected_cols } => {
                write!(
                    f,
                    "Effect Error: Frame values have shape ({}, {}) but ({}, {}) was expected",
                    rows, cols, expected_rows, expected_cols
                )
            }
            EffectError::UnsupportedRank { ndim } => {
                write!(
                    f,
                    "Effect Error: Tensor of rank {} where only rank 2 or 3 is supported",
                    ndim
                )
            }
            EffectError::BroadcastMismatch { trend_shape, raw_shape } => {
                write!(
                    f,
                    "Effect Error: Trend shape {:?} and raw effect shape {:?} cannot be \
                     broadcast together",
                    trend_shape, raw_shape
                )
            }

            // ---- Anyhow catchall ----
            EffectError::Anyhow(msg) => write!(f, "Effect Error: {}", msg),
        }
    }
}

impl std::error::Error for EffectError {}
