//! Column routing — matching covariate names to effects.
//!
//! Purpose
//! -------
//! Partition the named columns of an exogenous frame among effects. Each
//! effect declares a selection pattern; the router matches it against the
//! frame's column list, preserving the frame's column order. Patterns are
//! evaluated against the start of each column name (prefix-anchored), the
//! behavior of pandas' `Index.str.match`.
//!
//! Key behaviors
//! -------------
//! - [`ColumnPattern`] compiles a pattern once, anchored at the start.
//! - [`ColumnPattern::literals`] builds the exact disjunction of literal
//!   names used for the heterogeneous-prior remainder group; literals are
//!   escaped and fully anchored, so the match is an exact complement rather
//!   than a prefix match.
//! - [`match_columns`] returns an order-preserving subsequence of the input
//!   columns and is idempotent.
//! - [`split_columns`] computes one subset per effect in effect order.

use crate::effects::base::Effect;
use crate::effects::errors::{EffectError, EffectResult};
use crate::frame::ExogenousFrame;
use regex::Regex;

/// Compiled, prefix-anchored column selection pattern.
#[derive(Debug, Clone)]
pub struct ColumnPattern {
    raw: String,
    regex: Regex,
}

impl ColumnPattern {
    /// Compile `pattern`, anchored at the start of the column name.
    ///
    /// A pattern `"promo_"` matches `"promo_tv"` but not `"q_promo_tv"`.
    ///
    /// # Errors
    /// Returns [`EffectError::InvalidPattern`] when the pattern fails to
    /// compile, carrying the compiler's reason.
    pub fn new(pattern: &str) -> EffectResult<Self> {
        let anchored = format!("^(?:{})", pattern);
        let regex = Regex::new(&anchored).map_err(|e| EffectError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(ColumnPattern { raw: pattern.to_string(), regex })
    }

    /// Exact disjunction of literal names: matches a column iff its full
    /// name equals one of `names`. Used for the implicit default prior
    /// group, whose membership is a set complement and must not depend on
    /// prefix accidents between feature names.
    pub fn literals<S: AsRef<str>>(names: &[S]) -> EffectResult<Self> {
        let escaped: Vec<String> =
            names.iter().map(|n| regex::escape(n.as_ref())).collect();
        ColumnPattern::new(&format!("(?:{})$", escaped.join("|")))
    }

    /// Whether `name` matches this pattern (from its start).
    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    /// The pattern text as supplied by the caller (without the anchor).
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl PartialEq for ColumnPattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

/// Ordered subset of `columns` matching `pattern`.
///
/// The result follows the input column order, not the pattern, and is a
/// subsequence of the input; applying `match_columns` to its own result is a
/// no-op.
pub fn match_columns<S: AsRef<str>>(columns: &[S], pattern: &ColumnPattern) -> Vec<String> {
    columns
        .iter()
        .map(|c| c.as_ref())
        .filter(|c| pattern.is_match(c))
        .map(str::to_string)
        .collect()
}

/// Per-effect column subsets for `frame`, in effect order.
///
/// Calls [`match_columns`] once per effect against the frame's full column
/// list. Every effect must declare a pattern here; selection is required by
/// the caller.
///
/// # Errors
/// Returns [`EffectError::MissingPattern`] naming the first effect without a
/// pattern.
pub fn split_columns(
    frame: &ExogenousFrame, effects: &[&dyn Effect],
) -> EffectResult<Vec<(String, Vec<String>)>> {
    let mut out = Vec::with_capacity(effects.len());
    for effect in effects {
        let core = effect.core();
        let pattern = core.pattern().ok_or_else(|| EffectError::MissingPattern {
            id: core.id().to_string(),
        })?;
        out.push((core.id().to_string(), match_columns(frame.columns(), pattern)));
    }
    Ok(out)
}
