//! effects — contract, routing, priors, and concrete effect variants.
//!
//! Purpose
//! -------
//! Collect the building blocks of the effect framework: the polymorphic
//! contract every effect implements ([`Effect`]), column routing
//! ([`router`]), the additive/multiplicative composition algebra
//! ([`algebra`]), prior specifications and the probabilistic trace
//! ([`prior`], [`trace`]), the heterogeneous-prior coefficient assembler
//! ([`assembler`]), and the shipped variants (linear family, log, hill).
//!
//! Key behaviors
//! -------------
//! - Separate one-time initialization (column selection, placement-matrix
//!   construction) from per-evaluation data preparation and application.
//! - Namespace every random variable an effect declares with the effect's
//!   identity (`"<id>__<name>"`) so all effects can share one trace.
//! - Bake the composition rule into each effect's own output: `apply`
//!   returns the already-combined tensor, and the caller only sums.
//!
//! Invariants & assumptions
//! ------------------------
//! - Lifecycle order is `initialize → prepare_input_data → apply`; calling
//!   out of order is a caller bug surfaced as a lifecycle error, never
//!   retried.
//! - Configuration errors (missing patterns, overlapping prior groups,
//!   dimension mismatches) are fatal and raised immediately.
//! - Numerical edge cases inside effect math (log of non-positive values,
//!   fractional powers of zero) are clipped or guarded locally so the
//!   computation is defined everywhere, and never surfaced as errors.
//!
//! Downstream usage
//! ----------------
//! - The owning model routes the training table with
//!   [`router::split_columns`], initializes each effect once, prepares
//!   per-evaluation bundles, and applies each effect against the shared
//!   trend with one [`Trace`] per evaluation.
//!
//! Testing notes
//! -------------
//! - Each submodule carries unit tests for its own contract; the end-to-end
//!   path (route → initialize → prepare → apply → sum) is exercised in
//!   `tests/integration_effects_pipeline.rs`.

pub mod algebra;
pub mod assembler;
pub mod base;
pub mod errors;
pub mod hill;
pub mod linear;
pub mod log;
pub mod prior;
pub mod router;
pub mod trace;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::algebra::EffectMode;
pub use self::assembler::{CoefficientAssembler, PriorGroup};
pub use self::base::{Effect, EffectCore, InputBundle, Stage};
pub use self::errors::{EffectError, EffectResult};
pub use self::hill::HillEffect;
pub use self::linear::{LinearEffect, LinearHeterogeneousEffect};
pub use self::log::LogEffect;
pub use self::prior::Prior;
pub use self::router::{match_columns, split_columns, ColumnPattern};
pub use self::trace::Trace;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_effects::effects::prelude::*;
//
// to import the main effect surface in a single line.

pub mod prelude {
    pub use super::algebra::EffectMode;
    pub use super::assembler::{CoefficientAssembler, PriorGroup};
    pub use super::base::{Effect, EffectCore, InputBundle, Stage};
    pub use super::errors::{EffectError, EffectResult};
    pub use super::hill::HillEffect;
    pub use super::linear::{LinearEffect, LinearHeterogeneousEffect};
    pub use super::log::LogEffect;
    pub use super::prior::Prior;
    pub use super::router::ColumnPattern;
    pub use super::trace::Trace;
    pub use crate::frame::{ExogenousFrame, FrameIndex, Tensor};
}
