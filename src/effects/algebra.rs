//! Composition algebra and shared tensor math for effects.
//!
//! Purpose
//! -------
//! Provide the pure functions effects are built from: the
//! additive/multiplicative combination rule against the shared trend, the
//! batched linear response (`data @ coefficients`) with its fail-fast
//! dimension check, and the numerically safe exponentiation used by
//! saturation curves.
//!
//! Conventions
//! -----------
//! - All functions operate on the dynamic-rank [`Tensor`]; rank-2 inputs are
//!   a single series `(t, k)`, rank-3 inputs carry a leading series axis
//!   `(s, t, k)`.
//! - Broadcasting follows NumPy rules (right-aligned, size-1 axes stretch);
//!   incompatible shapes are reported as errors, never panics.
//! - Numerical edge cases (log of non-positive values, fractional powers of
//!   zero) are clipped or guarded here so effect formulas stay defined and
//!   differentiable over the whole input domain.

use crate::effects::errors::{EffectError, EffectResult};
use crate::frame::Tensor;
use ndarray::{Array2, Array3, Axis, Ix2, Ix3};
use std::str::FromStr;

/// Floor applied inside the Log effect's clip: `log(max(x, FLOOR))` keeps the
/// logarithm finite when `rate * data + 1 <= 0`.
pub const LOG_CLIP_FLOOR: f64 = 1e-8;

/// How an effect's raw output combines with the shared trend.
///
/// The mode is fixed per effect at construction and never changes. In
/// additive mode the raw value is returned unchanged (the caller adds the
/// trend once); in multiplicative mode the raw value scales the trend
/// elementwise.
///
/// Parsing:
/// This enum implements `FromStr` and accepts case-insensitive names
/// (`"additive"`, `"multiplicative"`). Unknown names return
/// [`EffectError::Anyhow`] with the offending value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectMode {
    Additive,
    Multiplicative,
}

impl EffectMode {
    /// Combine a raw effect value with the trend according to this mode.
    ///
    /// Errors
    /// ------
    /// - [`EffectError::BroadcastMismatch`] in multiplicative mode when the
    ///   two shapes cannot be broadcast together.
    pub fn combine(&self, trend: &Tensor, raw: Tensor) -> EffectResult<Tensor> {
        match self {
            EffectMode::Additive => Ok(additive(raw)),
            EffectMode::Multiplicative => multiplicative(trend, &raw),
        }
    }
}

impl FromStr for EffectMode {
    type Err = EffectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "additive" => Ok(EffectMode::Additive),
            "multiplicative" => Ok(EffectMode::Multiplicative),
            _ => Err(EffectError::Anyhow(format!(
                "Unknown effect mode '{}'; valid options are case-insensitive \
                 'additive' or 'multiplicative'.",
                s
            ))),
        }
    }
}

/// Additive combination: the raw effect value is the effect output; the
/// caller adds the trend elsewhere, exactly once.
pub fn additive(raw: Tensor) -> Tensor {
    raw
}

/// Multiplicative combination: elementwise product of trend and raw value,
/// broadcasting either operand into the other's shape (a `(t, 1)` trend
/// against a `(t, k)` raw value, or vice versa).
///
/// Errors
/// ------
/// - [`EffectError::BroadcastMismatch`] when the shapes are incompatible.
pub fn multiplicative(trend: &Tensor, raw: &Tensor) -> EffectResult<Tensor> {
    ensure_broadcastable(trend.shape(), raw.shape())?;
    Ok(trend * raw)
}

/// Batched linear response `data @ coefficients`.
///
/// `coefficients` must be a column vector `(k, 1)` whose length equals the
/// trailing dimension of `data`. Rank-2 data produces `(t, 1)`; rank-3 data
/// is batched over the leading series axis and produces `(s, t, 1)`.
///
/// Errors
/// ------
/// - [`EffectError::DimensionMismatch`] when the trailing data dimension
///   disagrees with the coefficient length.
/// - [`EffectError::UnsupportedRank`] for ranks other than 2 and 3.
pub fn linear_response(data: &Tensor, coefficients: &Array2<f64>) -> EffectResult<Tensor> {
    let data_cols = data.shape().last().copied().unwrap_or(0);
    if data_cols != coefficients.nrows() {
        return Err(EffectError::DimensionMismatch {
            data_cols,
            coef_len: coefficients.nrows(),
        });
    }

    match data.ndim() {
        2 => {
            let flat = data
                .view()
                .into_dimensionality::<Ix2>()
                .map_err(|e| EffectError::Anyhow(e.to_string()))?;
            Ok(flat.dot(coefficients).into_dyn())
        }
        3 => {
            let panel = data
                .view()
                .into_dimensionality::<Ix3>()
                .map_err(|e| EffectError::Anyhow(e.to_string()))?;
            let (series, timepoints, _) = panel.dim();
            let mut out = Array3::<f64>::zeros((series, timepoints, 1));
            for s in 0..series {
                let block = panel.index_axis(Axis(0), s).dot(coefficients);
                out.index_axis_mut(Axis(0), s).assign(&block);
            }
            Ok(out.into_dyn())
        }
        ndim => Err(EffectError::UnsupportedRank { ndim }),
    }
}

/// Elementwise `x^exponent` that returns `0` where `x == 0`.
///
/// `0^negative` and fractional powers of a zero base are undefined or
/// infinite; saturation curves need the convention that a zero covariate
/// contributes zero, so the guard is applied before exponentiation.
pub fn exponent_safe(x: &Tensor, exponent: f64) -> Tensor {
    x.mapv(|v| if v == 0.0 { 0.0 } else { v.powf(exponent) })
}

/// Check NumPy-style broadcast compatibility of two shapes (right-aligned;
/// each pair of axes must match or one must be 1).
fn ensure_broadcastable(a: &[usize], b: &[usize]) -> EffectResult<()> {
    let mut ai = a.iter().rev();
    let mut bi = b.iter().rev();
    loop {
        match (ai.next(), bi.next()) {
            (Some(&x), Some(&y)) if x != y && x != 1 && y != 1 => {
                return Err(EffectError::BroadcastMismatch {
                    trend_shape: a.to_vec(),
                    raw_shape: b.to_vec(),
                });
            }
            (None, None) => return Ok(()),
            _ => continue,
        }
    }
}
