//! rust_effects — effect decomposition core for Bayesian time-series models.
//!
//! Purpose
//! -------
//! Provide the effect abstraction used by Prophet-style hierarchical Bayesian
//! forecasting models: a baseline trend (computed elsewhere) plus a
//! combination of named "effects" driven by exogenous covariates, including
//! marketing-mix-style saturation and log-response curves.
//!
//! Key behaviors
//! -------------
//! - Define the contract every effect satisfies ([`effects::Effect`]): a
//!   one-time `initialize` against the training covariate table, a per-call
//!   `prepare_input_data` that turns the table into named tensors, and a
//!   per-call `apply` that declares random variables and returns an effect
//!   tensor broadcastable against the trend.
//! - Route named covariate columns to effects via prefix-anchored patterns
//!   ([`effects::router`]), and combine effect outputs with the trend
//!   additively or multiplicatively ([`effects::algebra`]).
//! - Assemble per-group coefficient draws from heterogeneous priors into one
//!   feature-ordered coefficient vector ([`effects::assembler`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - Effect identities are unique within a model instance; the owning model
//!   enforces this, and the [`effects::Trace`] rejects duplicate variable
//!   names as a backstop.
//! - The selected-column set of an effect is fixed at initialization time and
//!   reused verbatim for every later preparation, train or predict stage.
//! - All tensor work runs on `ndarray` containers; a leading series axis is a
//!   shape concern, not a parallelism concern.
//!
//! Conventions
//! -----------
//! - Single-series data is rank-2 `(timepoints, k)`; panel data is rank-3
//!   `(series, timepoints, k)` with series-major row order in the frame.
//! - Errors are reported via [`effects::EffectResult`]; the core never
//!   retries and never panics on invalid input.
//!
//! Downstream usage
//! ----------------
//! - The outer forecasting estimator owns the effects and their ordering,
//!   drives the lifecycle, supplies the trend tensor and a [`effects::Trace`]
//!   per evaluation, and sums the effect outputs into the final series.
//! - Posterior sampling, trend generation, and optimization live outside this
//!   crate; fixing parameter values during inference goes through
//!   [`effects::Trace::condition`].

pub mod effects;
pub mod frame;
