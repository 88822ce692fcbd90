//! Heterogeneous-prior coefficient assembly.
//!
//! Purpose
//! -------
//! Build, once at initialization time, the machinery that lets a linear
//! effect place different priors on disjoint subsets of its selected
//! columns: the partition of feature names into prior groups, and the 0/1
//! placement matrix that scatters concatenated per-group coefficient draws
//! back into one full-length, feature-ordered coefficient vector.
//!
//! Key behaviors
//! -------------
//! - Groups are processed in declaration order; a column claimed by two
//!   groups is a fatal configuration error naming the offending columns.
//! - An explicit group matching no column is skipped with a warning.
//! - Every column not claimed by an explicit group lands in a final implicit
//!   group under the supplied default prior, matched through the exact
//!   literal disjunction of the remaining names.
//! - The placement matrix has exactly one `1` per feature row: each column
//!   belongs to exactly one group.
//!
//! Invariants & assumptions
//! ------------------------
//! - The partition and placement matrix are fixed after construction; every
//!   per-evaluation call only draws group vectors and multiplies.
//! - `placement · concat(group draws in declaration order)` equals placing
//!   each group's coefficients at that group's original column positions
//!   (the scatter/gather identity tested below).

use crate::effects::base::EffectCore;
use crate::effects::errors::{EffectError, EffectResult};
use crate::effects::prior::Prior;
use crate::effects::router::{match_columns, ColumnPattern};
use crate::effects::trace::Trace;
use ndarray::{concatenate, Array1, Array2, Axis};

/// One explicit prior group: a selection pattern and the prior applied to
/// every column it claims.
#[derive(Debug, Clone)]
pub struct PriorGroup {
    pattern: ColumnPattern,
    prior: Prior,
}

impl PriorGroup {
    /// Compile `pattern` and pair it with `prior`.
    ///
    /// # Errors
    /// Returns [`EffectError::InvalidPattern`] if the pattern fails to
    /// compile.
    pub fn new(pattern: &str, prior: Prior) -> EffectResult<Self> {
        Ok(PriorGroup { pattern: ColumnPattern::new(pattern)?, prior })
    }

    /// The group's selection pattern.
    pub fn pattern(&self) -> &ColumnPattern {
        &self.pattern
    }

    /// The group's prior.
    pub fn prior(&self) -> &Prior {
        &self.prior
    }
}

/// A resolved group: the prior plus the columns it claimed, in feature
/// order.
#[derive(Debug, Clone)]
struct ResolvedGroup {
    prior: Prior,
    columns: Vec<String>,
}

/// `CoefficientAssembler` — fixed partition and placement for one effect.
///
/// Built once at initialization from the effect's selected columns; used on
/// every application to turn per-group prior draws into the full
/// feature-ordered coefficient vector.
#[derive(Debug, Clone)]
pub struct CoefficientAssembler {
    groups: Vec<ResolvedGroup>,
    placement: Array2<f64>,
}

impl CoefficientAssembler {
    /// Partition `feature_names` into prior groups and build the placement
    /// matrix.
    ///
    /// Parameters
    /// ----------
    /// - `feature_names`: the effect's selected columns, in selection order;
    ///   defines the row order of the placement matrix.
    /// - `groups`: explicit prior groups, in declaration order.
    /// - `default_prior`: prior for every column no explicit group claims.
    ///
    /// Errors
    /// ------
    /// - [`EffectError::OverlappingPriorGroups`] naming every column claimed
    ///   by more than one group.
    /// - [`EffectError::InvalidPattern`] if the literal remainder pattern
    ///   fails to compile (not expected for valid column names).
    pub fn new(
        feature_names: &[String], groups: &[PriorGroup], default_prior: &Prior,
    ) -> EffectResult<Self> {
        let n_features = feature_names.len();
        let mut claimed: Vec<String> = Vec::new();
        let mut resolved: Vec<ResolvedGroup> = Vec::new();
        let mut blocks: Vec<Array2<f64>> = Vec::new();

        for group in groups {
            let columns = match_columns(feature_names, group.pattern());

            let overlap: Vec<String> =
                columns.iter().filter(|c| claimed.contains(c)).cloned().collect();
            if !overlap.is_empty() {
                return Err(EffectError::OverlappingPriorGroups { columns: overlap });
            }

            if columns.is_empty() {
                log::warn!(
                    "no columns match prior-group pattern '{}'; skipping group",
                    group.pattern().as_str()
                );
                continue;
            }

            blocks.push(placement_block(feature_names, &columns));
            claimed.extend(columns.iter().cloned());
            resolved.push(ResolvedGroup { prior: group.prior().clone(), columns });
        }

        let remaining: Vec<String> =
            feature_names.iter().filter(|c| !claimed.contains(c)).cloned().collect();
        if !remaining.is_empty() {
            // The implicit group matches exact names, an order-independent
            // complement of the explicit claims.
            let pattern = ColumnPattern::literals(&remaining)?;
            let columns = match_columns(feature_names, &pattern);
            blocks.push(placement_block(feature_names, &columns));
            resolved.push(ResolvedGroup { prior: default_prior.clone(), columns });
        }

        let placement = if blocks.is_empty() {
            Array2::zeros((n_features, 0))
        } else {
            let views: Vec<_> = blocks.iter().map(|b| b.view()).collect();
            concatenate(Axis(1), &views).map_err(|e| EffectError::Anyhow(e.to_string()))?
        };

        Ok(CoefficientAssembler { groups: resolved, placement })
    }

    /// Draw one coefficient sub-vector per group (declared as
    /// `"<id>__coefs_<i>"`), concatenate in declaration order, and scatter
    /// through the placement matrix into the feature-ordered column vector
    /// `(n_features, 1)`.
    pub fn coefficients(
        &self, core: &EffectCore, trace: &mut Trace,
    ) -> EffectResult<Array2<f64>> {
        let mut parts: Vec<Array1<f64>> = Vec::with_capacity(self.groups.len());
        for (i, group) in self.groups.iter().enumerate() {
            let name = format!("coefs_{}", i);
            parts.push(core.declare_vec(trace, &name, &group.prior, group.columns.len())?);
        }

        let stacked = if parts.is_empty() {
            Array1::zeros(0)
        } else {
            let views: Vec<_> = parts.iter().map(|p| p.view()).collect();
            concatenate(Axis(0), &views).map_err(|e| EffectError::Anyhow(e.to_string()))?
        };

        let full = self.placement.dot(&stacked);
        Ok(full.insert_axis(Axis(1)))
    }

    /// Number of groups after resolution (explicit non-empty groups plus the
    /// implicit remainder, if any).
    pub fn n_groups(&self) -> usize {
        self.groups.len()
    }

    /// Columns of group `i`, in feature order.
    pub fn group_columns(&self, i: usize) -> &[String] {
        &self.groups[i].columns
    }

    /// The fixed placement matrix, shape `(n_features, total coefficients)`.
    pub fn placement(&self) -> &Array2<f64> {
        &self.placement
    }
}

/// Placement block for one group: the transpose of the identity-matrix rows
/// at the group's column indices — `(n_features, group len)` with a single
/// `1` per group column.
fn placement_block(feature_names: &[String], columns: &[String]) -> Array2<f64> {
    let mut block = Array2::zeros((feature_names.len(), columns.len()));
    for (j, column) in columns.iter().enumerate() {
        if let Some(i) = feature_names.iter().position(|c| c == column) {
            block[[i, j]] = 1.0;
        }
    }
    block
}
