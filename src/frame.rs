//! Exogenous covariate tables for effect decomposition.
//!
//! Purpose
//! -------
//! Provide a small, validated container for time-indexed tables of named
//! exogenous covariates, the input every effect is initialized on and
//! prepared from. This module centralizes input validation so effect code
//! can assume well-formed, finite data and unique column names.
//!
//! Key behaviors
//! -------------
//! - [`ExogenousFrame`] enforces basic invariants at construction time
//!   (non-empty, finite values, unique columns, shape agreement with the
//!   index).
//! - [`FrameIndex`] distinguishes a flat single-series index from a two-level
//!   panel index (series identifier + time), which some effects reject.
//! - Column narrowing via [`ExogenousFrame::select`] preserves the caller's
//!   requested order, which is how an effect's fixed selected-column set is
//!   re-applied at forecast time regardless of incoming column order.
//!
//! Conventions
//! -----------
//! - Panel rows are series-major: all timepoints of series 0, then series 1,
//!   and so on. [`ExogenousFrame::to_tensor`] reshapes accordingly to
//!   `(series, timepoints, k)`; flat frames convert to `(timepoints, k)`.
//! - Indexing is 0-based; error payloads carry the first offending position.
//!
//! Testing notes
//! -------------
//! - Unit tests cover construction (happy path, empty, non-finite values,
//!   duplicate columns, shape mismatches), selection order and missing
//!   columns, and tensor conversion for both index kinds.

use crate::effects::errors::{EffectError, EffectResult};
use ndarray::{Array2, ArrayD};
use std::collections::HashSet;

/// Crate-wide tensor type: effect inputs and outputs are rank-2 for a single
/// series and rank-3 for a panel, so the dynamic-rank array is the common
/// currency.
pub type Tensor = ArrayD<f64>;

/// Row-index structure of an [`ExogenousFrame`].
///
/// - `Flat`: a single series indexed by time.
/// - `Panel`: a two-level index (series identifier + time) with every series
///   sharing the same number of timepoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameIndex {
    /// Single series with `timepoints` rows.
    Flat { timepoints: usize },
    /// `series` series of `timepoints` rows each, series-major.
    Panel { series: usize, timepoints: usize },
}

impl FrameIndex {
    /// Number of index levels: 1 for flat, 2 for panel.
    pub fn nlevels(&self) -> usize {
        match self {
            FrameIndex::Flat { .. } => 1,
            FrameIndex::Panel { .. } => 2,
        }
    }

    /// Total number of rows the index describes.
    pub fn rows(&self) -> usize {
        match self {
            FrameIndex::Flat { timepoints } => *timepoints,
            FrameIndex::Panel { series, timepoints } => series * timepoints,
        }
    }
}

/// `ExogenousFrame` — validated table of named exogenous covariates.
///
/// Purpose
/// -------
/// Carry the covariate values an effect selects from, together with ordered
/// column names and the row-index structure. Construction validates the
/// invariants once; downstream effect code relies on them without
/// re-checking.
///
/// Invariants
/// ----------
/// - `values.nrows() == index.rows()` and `values.ncols() == columns.len()`.
/// - At least one row.
/// - Column names are unique.
/// - Every value is finite.
#[derive(Debug, Clone, PartialEq)]
pub struct ExogenousFrame {
    columns: Vec<String>,
    values: Array2<f64>,
    index: FrameIndex,
}

impl ExogenousFrame {
    /// Construct a validated frame from ordered column names, a value matrix,
    /// and an index description.
    ///
    /// Parameters
    /// ----------
    /// - `columns`: ordered covariate names; must be unique. An empty list is
    ///   allowed (a frame with rows but no covariates), in which case
    ///   `values` must have zero columns.
    /// - `values`: row-major value matrix, one row per index entry.
    /// - `index`: [`FrameIndex`] describing the rows.
    ///
    /// Errors
    /// ------
    /// - [`EffectError::EmptyFrame`] when the index describes zero rows.
    /// - [`EffectError::FrameShapeMismatch`] when `values` disagrees with
    ///   `columns` or `index`.
    /// - [`EffectError::DuplicateColumn`] naming the first repeated column.
    /// - [`EffectError::NonFiniteValue`] naming the column and row of the
    ///   first NaN/±inf entry.
    pub fn new(
        columns: Vec<String>, values: Array2<f64>, index: FrameIndex,
    ) -> EffectResult<Self> {
        if index.rows() == 0 {
            return Err(EffectError::EmptyFrame);
        }
        if values.nrows() != index.rows() || values.ncols() != columns.len() {
            return Err(EffectError::FrameShapeMismatch {
                rows: values.nrows(),
                expected_rows: index.rows(),
                cols: values.ncols(),
                expected_cols: columns.len(),
            });
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(EffectError::DuplicateColumn { column: column.clone() });
            }
        }

        for (col_pos, column) in columns.iter().enumerate() {
            for (row, &value) in values.column(col_pos).iter().enumerate() {
                if !value.is_finite() {
                    return Err(EffectError::NonFiniteValue {
                        column: column.clone(),
                        row,
                        value,
                    });
                }
            }
        }

        Ok(ExogenousFrame { columns, values, index })
    }

    /// Convenience constructor for a flat single-series frame; the number of
    /// timepoints is taken from the value matrix.
    pub fn flat(columns: Vec<String>, values: Array2<f64>) -> EffectResult<Self> {
        let index = FrameIndex::Flat { timepoints: values.nrows() };
        ExogenousFrame::new(columns, values, index)
    }

    /// Ordered column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Row-index structure.
    pub fn index(&self) -> FrameIndex {
        self.index
    }

    /// Raw value matrix, one row per index entry.
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Position of a column by name.
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Narrow the frame to `wanted` columns, in the order given.
    ///
    /// This is how an effect re-applies its selected-column set captured at
    /// initialization: the incoming frame may carry extra columns in any
    /// order, but must supply at least the wanted ones.
    ///
    /// Errors
    /// ------
    /// - [`EffectError::ColumnNotFound`] naming the first missing column.
    pub fn select<S: AsRef<str>>(&self, wanted: &[S]) -> EffectResult<ExogenousFrame> {
        let mut out = Array2::<f64>::zeros((self.values.nrows(), wanted.len()));
        let mut names = Vec::with_capacity(wanted.len());
        for (j, name) in wanted.iter().enumerate() {
            let name = name.as_ref();
            let pos = self
                .column_position(name)
                .ok_or_else(|| EffectError::ColumnNotFound { column: name.to_string() })?;
            out.column_mut(j).assign(&self.values.column(pos));
            names.push(name.to_string());
        }
        Ok(ExogenousFrame { columns: names, values: out, index: self.index })
    }

    /// Convert the frame to the effect-input tensor layout.
    ///
    /// Returns `(timepoints, k)` for a flat frame and
    /// `(series, timepoints, k)` for a panel frame.
    pub fn to_tensor(&self) -> Tensor {
        match self.index {
            FrameIndex::Flat { .. } => self.values.clone().into_dyn(),
            FrameIndex::Panel { series, timepoints } => {
                let k = self.values.ncols();
                // Shape agreement was validated at construction, so the
                // reshape cannot fail.
                self.values
                    .clone()
                    .into_shape((series, timepoints, k))
                    .map(|a| a.into_dyn())
                    .unwrap_or_else(|_| self.values.clone().into_dyn())
            }
        }
    }
}
