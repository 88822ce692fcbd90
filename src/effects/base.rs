//! Effect contract — lifecycle, identity, and the polymorphic interface.
//!
//! Purpose
//! -------
//! Define the contract every effect variant implements: a one-time
//! `initialize` against the training covariate table, a per-evaluation
//! `prepare_input_data` that narrows the table to the effect's fixed column
//! set and converts it into named tensors, and a per-evaluation `apply` that
//! declares random variables under the effect's namespaced identity and
//! returns the already-combined effect tensor.
//!
//! Key behaviors
//! -------------
//! - [`EffectCore`] holds the state every variant embeds: identity, optional
//!   selection pattern, composition mode, the selected-column set captured
//!   at initialization, and the lifecycle flag.
//! - [`Effect`] is the interface: variants implement `raw_effect` (and
//!   optionally the `on_initialize` / `convert` hooks); the provided
//!   lifecycle methods supply the shared skeleton and are not meant to be
//!   overridden.
//! - Variable names are prefixed with `"<id>__"` before reaching the
//!   [`Trace`], guaranteeing global uniqueness across effects sharing one
//!   trace as long as identities are unique.
//!
//! Invariants & assumptions
//! ------------------------
//! - Lifecycle is `Uninitialized → Initialized`, transitioned exactly once
//!   by the owning model. Re-initialization is undefined behavior at the
//!   contract level and must be guarded by the owner; the core does not
//!   re-validate it.
//! - The selected-column set is computed once from the training table and
//!   reused verbatim for every later preparation, even if a forecast table
//!   carries different or reordered columns.
//! - `prepare_input_data` returning an empty [`InputBundle`] is the skip
//!   signal: the caller omits `apply` for this effect in this evaluation.
//!
//! Testing notes
//! -------------
//! - Unit tests here cover lifecycle-order errors, skip behavior, column
//!   capture, namespacing, and the default conversion hook. Per-variant
//!   math lives in the variant modules.

use crate::effects::algebra::EffectMode;
use crate::effects::errors::{EffectError, EffectResult};
use crate::effects::prior::Prior;
use crate::effects::router::{match_columns, ColumnPattern};
use crate::effects::trace::Trace;
use crate::frame::{ExogenousFrame, Tensor};
use ndarray::Array1;

/// Whether data is being prepared for training-time fitting or forecast-time
/// prediction. The default preparation is stage-independent; custom
/// `convert` hooks may branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Train,
    Predict,
}

/// Named tensors produced by `prepare_input_data` for one evaluation.
///
/// An empty bundle is the signal to skip `apply` entirely (the effect
/// matched no columns and allows skipping).
#[derive(Debug, Clone, Default)]
pub struct InputBundle {
    entries: Vec<(String, Tensor)>,
}

impl InputBundle {
    /// Empty bundle.
    pub fn new() -> Self {
        InputBundle { entries: Vec::new() }
    }

    /// Insert a named tensor, replacing any existing entry of that name.
    pub fn insert<S: Into<String>>(&mut self, name: S, tensor: Tensor) {
        let name = name.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = tensor;
        } else {
            self.entries.push((name, tensor));
        }
    }

    /// Tensor by name, if present.
    pub fn get(&self, name: &str) -> Option<&Tensor> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    /// Tensor by name, or the lifecycle error that tells the caller
    /// `prepare_input_data` did not run for this evaluation.
    pub fn require(&self, id: &str, name: &str) -> EffectResult<&Tensor> {
        self.get(name).ok_or_else(|| EffectError::InputNotPrepared {
            id: id.to_string(),
            key: name.to_string(),
        })
    }

    /// Whether the bundle holds no tensors (the skip signal).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of named tensors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// State shared by every effect variant.
///
/// Variants embed an `EffectCore` and expose it through
/// [`Effect::core`] / [`Effect::core_mut`]; the provided lifecycle methods
/// of the trait operate on it.
#[derive(Debug, Clone)]
pub struct EffectCore {
    id: String,
    pattern: Option<ColumnPattern>,
    mode: EffectMode,
    selected: Vec<String>,
    initialized: bool,
}

impl EffectCore {
    /// Construct the shared state for an effect.
    ///
    /// Parameters
    /// ----------
    /// - `id`: non-empty identity; namespaces every variable the effect
    ///   declares and must be unique within a model instance (owner-enforced).
    /// - `pattern`: optional selection pattern, compiled via
    ///   [`ColumnPattern::new`]. `None` selects no columns.
    /// - `mode`: additive or multiplicative composition with the trend.
    ///
    /// Errors
    /// ------
    /// - [`EffectError::EmptyId`] for an empty identity.
    /// - [`EffectError::InvalidPattern`] for a pattern that fails to compile.
    pub fn new(id: &str, pattern: Option<&str>, mode: EffectMode) -> EffectResult<Self> {
        if id.is_empty() {
            return Err(EffectError::EmptyId);
        }
        let pattern = match pattern {
            Some(p) => Some(ColumnPattern::new(p)?),
            None => None,
        };
        Ok(EffectCore {
            id: id.to_string(),
            pattern,
            mode,
            selected: Vec::new(),
            initialized: false,
        })
    }

    /// Effect identity.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Selection pattern, if any.
    pub fn pattern(&self) -> Option<&ColumnPattern> {
        self.pattern.as_ref()
    }

    /// Composition mode.
    pub fn mode(&self) -> EffectMode {
        self.mode
    }

    /// Selected column names captured at initialization (empty before).
    pub fn selected_columns(&self) -> &[String] {
        &self.selected
    }

    /// Whether `initialize` has run.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Guard for methods requiring the `Initialized` state.
    pub fn ensure_initialized(&self) -> EffectResult<()> {
        if !self.initialized {
            return Err(EffectError::NotInitialized { id: self.id.clone() });
        }
        Ok(())
    }

    /// Declare a scalar variable namespaced under this effect's identity.
    pub fn declare(&self, trace: &mut Trace, name: &str, prior: &Prior) -> EffectResult<f64> {
        trace.declare(&self.qualified(name), prior)
    }

    /// Declare a vector variable namespaced under this effect's identity.
    pub fn declare_vec(
        &self, trace: &mut Trace, name: &str, prior: &Prior, len: usize,
    ) -> EffectResult<Array1<f64>> {
        trace.declare_vec(&self.qualified(name), prior, len)
    }

    fn qualified(&self, name: &str) -> String {
        format!("{}__{}", self.id, name)
    }

    pub(crate) fn set_selected(&mut self, selected: Vec<String>) {
        self.selected = selected;
    }

    pub(crate) fn mark_initialized(&mut self) {
        self.initialized = true;
    }
}

/// The polymorphic effect interface.
///
/// Required:
/// - `core` / `core_mut`: access to the embedded [`EffectCore`].
/// - `raw_effect`: the effect computation proper — declare any variables
///   through the core's namespaced helpers and return the raw effect value
///   *before* combination with the trend.
///
/// Optional capability hooks:
/// - `supports_multivariate`: accept panel (two-level index) frames;
///   default `false`.
/// - `skip_if_unmatched`: skip the effect when its pattern matched no
///   columns; default `true`.
///
/// Optional customization hooks:
/// - `on_initialize`: variant-specific setup at initialization time (e.g.,
///   building a placement matrix); runs after column selection.
/// - `convert`: turn the narrowed frame into named tensors; the default
///   produces a single `"data"` tensor.
///
/// The provided `initialize` / `prepare_input_data` / `apply` methods are
/// the lifecycle skeleton and are not meant to be overridden.
pub trait Effect {
    fn core(&self) -> &EffectCore;
    fn core_mut(&mut self) -> &mut EffectCore;

    /// Raw effect value before combination with the trend.
    fn raw_effect(
        &self, trace: &mut Trace, trend: &Tensor, inputs: &InputBundle,
    ) -> EffectResult<Tensor>;

    // ---- Capability hooks -------------------------------------------------

    fn supports_multivariate(&self) -> bool {
        false
    }

    fn skip_if_unmatched(&self) -> bool {
        true
    }

    // ---- Customization hooks ----------------------------------------------

    /// Variant-specific initialization; runs after column selection, before
    /// the effect is marked initialized.
    fn on_initialize(&mut self, frame: &ExogenousFrame, scale: f64) -> EffectResult<()> {
        let _ = (frame, scale);
        Ok(())
    }

    /// Convert the narrowed frame into named tensors. The default produces a
    /// single `"data"` tensor of shape `(t, k)` or `(s, t, k)`.
    fn convert(&self, narrowed: &ExogenousFrame, stage: Stage) -> EffectResult<InputBundle> {
        let _ = stage;
        let mut bundle = InputBundle::new();
        bundle.insert("data", narrowed.to_tensor());
        Ok(bundle)
    }

    // ---- Lifecycle (provided; do not override) ----------------------------

    /// One-time initialization against the training table.
    ///
    /// Validates multivariate support, captures the selected-column set via
    /// the router (empty when no pattern is declared), runs
    /// [`Effect::on_initialize`], and marks the effect initialized.
    ///
    /// Errors
    /// ------
    /// - [`EffectError::MultivariateUnsupported`] for a panel frame when the
    ///   effect does not declare multivariate support.
    /// - Anything the `on_initialize` hook reports.
    fn initialize(&mut self, frame: &ExogenousFrame, scale: f64) -> EffectResult<()> {
        if !self.supports_multivariate() && frame.index().nlevels() > 1 {
            return Err(EffectError::MultivariateUnsupported {
                id: self.core().id().to_string(),
            });
        }

        let selected = match self.core().pattern() {
            Some(pattern) => match_columns(frame.columns(), pattern),
            None => Vec::new(),
        };
        self.core_mut().set_selected(selected);

        self.on_initialize(frame, scale)?;
        self.core_mut().mark_initialized();
        Ok(())
    }

    /// Whether the caller should skip `apply` for this effect: no columns
    /// were selected and the effect allows skipping. Meaningful only after
    /// initialization.
    fn should_skip(&self) -> bool {
        self.core().selected_columns().is_empty() && self.skip_if_unmatched()
    }

    /// Per-evaluation data preparation.
    ///
    /// Narrows `frame` to the selected columns captured at initialization
    /// (forecast frames may carry extra columns, in any order) and runs the
    /// [`Effect::convert`] hook. Returns an empty bundle — the skip signal —
    /// when the effect matched nothing and allows skipping.
    ///
    /// Errors
    /// ------
    /// - [`EffectError::NotInitialized`] before `initialize`.
    /// - [`EffectError::ColumnNotFound`] when `frame` lacks a selected
    ///   column.
    fn prepare_input_data(
        &self, frame: &ExogenousFrame, stage: Stage,
    ) -> EffectResult<InputBundle> {
        self.core().ensure_initialized()?;

        if self.should_skip() {
            return Ok(InputBundle::new());
        }

        let narrowed = frame.select(self.core().selected_columns())?;
        self.convert(&narrowed, stage)
    }

    /// Per-evaluation application.
    ///
    /// Computes [`Effect::raw_effect`] and combines it with `trend`
    /// according to the effect's composition mode; the returned tensor is
    /// the finished effect output, broadcastable against the trend.
    ///
    /// Errors
    /// ------
    /// - [`EffectError::NotInitialized`] before `initialize`.
    /// - [`EffectError::InputNotPrepared`] when `inputs` lacks a tensor the
    ///   effect needs (i.e. `prepare_input_data` did not run).
    fn apply(
        &self, trace: &mut Trace, trend: &Tensor, inputs: &InputBundle,
    ) -> EffectResult<Tensor> {
        self.core().ensure_initialized()?;
        let raw = self.raw_effect(trace, trend, inputs)?;
        self.core().mode().combine(trend, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::linear::LinearEffect;
    use crate::frame::FrameIndex;
    use ndarray::{array, Array2};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover the lifecycle skeleton through a concrete variant:
    // - Ordering errors (prepare/apply before initialize, apply without a
    //   prepared bundle).
    // - Column capture at initialization and its reuse on reordered frames.
    // - The skip signal and the default conversion hook.
    // - Multivariate rejection.
    //
    // They intentionally DO NOT cover per-variant math (variant modules) or
    // pattern semantics (router module).
    // -------------------------------------------------------------------------

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn frame(columns: &[&str], values: Array2<f64>) -> ExogenousFrame {
        ExogenousFrame::flat(names(columns), values).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // `prepare_input_data` and `apply` before `initialize` fail with a
    // lifecycle error naming the effect.
    fn lifecycle_methods_require_initialization() {
        let effect = LinearEffect::new("promo", Some("promo_"), EffectMode::Additive).unwrap();
        let table = frame(&["promo_tv"], array![[1.0], [2.0]]);
        let trend = array![[1.0], [1.0]].into_dyn();

        let err = effect.prepare_input_data(&table, Stage::Train).unwrap_err();
        assert_eq!(err, EffectError::NotInitialized { id: "promo".to_string() });

        let mut trace = Trace::new(0);
        let err = effect.apply(&mut trace, &trend, &InputBundle::new()).unwrap_err();
        assert_eq!(err, EffectError::NotInitialized { id: "promo".to_string() });
    }

    #[test]
    // Purpose
    // -------
    // `apply` after `initialize` but without a prepared bundle reports the
    // missing input rather than panicking.
    fn apply_without_prepared_input_is_an_error() {
        let mut effect =
            LinearEffect::new("promo", Some("promo_"), EffectMode::Additive).unwrap();
        let table = frame(&["promo_tv"], array![[1.0], [2.0]]);
        effect.initialize(&table, 1.0).unwrap();

        let mut trace = Trace::new(0);
        let trend = array![[1.0], [1.0]].into_dyn();
        let err = effect.apply(&mut trace, &trend, &InputBundle::new()).unwrap_err();

        assert_eq!(
            err,
            EffectError::InputNotPrepared { id: "promo".to_string(), key: "data".to_string() }
        );
    }

    #[test]
    // Purpose
    // -------
    // The selected-column set is captured at initialization and reused on a
    // later frame whose columns are a reordered superset.
    fn selected_columns_are_fixed_at_initialization() {
        let mut effect =
            LinearEffect::new("promo", Some("promo_"), EffectMode::Additive).unwrap();
        let train = frame(&["promo_tv", "price", "promo_radio"], Array2::zeros((2, 3)));
        effect.initialize(&train, 1.0).unwrap();

        assert_eq!(
            effect.core().selected_columns(),
            &names(&["promo_tv", "promo_radio"])[..]
        );

        // Forecast frame: extra column, different order.
        let predict = frame(
            &["extra", "promo_radio", "promo_tv"],
            array![[9.0, 2.0, 1.0], [9.0, 4.0, 3.0]],
        );
        let bundle = effect.prepare_input_data(&predict, Stage::Predict).unwrap();
        let data = bundle.get("data").unwrap();

        // Columns come back in the order captured at initialization.
        assert_eq!(data, &array![[1.0, 2.0], [3.0, 4.0]].into_dyn());
    }

    #[test]
    // Purpose
    // -------
    // An effect whose pattern matched nothing prepares an empty bundle, the
    // skip signal for the caller.
    fn unmatched_effect_signals_skip() {
        let mut effect =
            LinearEffect::new("promo", Some("promo_"), EffectMode::Additive).unwrap();
        let table = frame(&["price"], array![[1.0], [2.0]]);
        effect.initialize(&table, 1.0).unwrap();

        assert!(effect.should_skip());
        let bundle = effect.prepare_input_data(&table, Stage::Train).unwrap();
        assert!(bundle.is_empty());
    }

    #[test]
    // Purpose
    // -------
    // A panel frame is rejected at initialization by an effect without
    // multivariate support.
    fn panel_frame_requires_multivariate_support() {
        let panel = ExogenousFrame::new(
            names(&["temp"]),
            array![[1.0], [2.0], [3.0], [4.0]],
            FrameIndex::Panel { series: 2, timepoints: 2 },
        )
        .unwrap();

        let mut log =
            crate::effects::log::LogEffect::new("heat", Some("temp"), EffectMode::Additive)
                .unwrap();
        let err = log.initialize(&panel, 1.0).unwrap_err();
        assert_eq!(err, EffectError::MultivariateUnsupported { id: "heat".to_string() });
    }

    #[test]
    // Purpose
    // -------
    // Core declarations prefix variable names with the effect identity.
    fn declarations_are_namespaced_by_identity() {
        let core = EffectCore::new("promo", None, EffectMode::Additive).unwrap();
        let mut trace = Trace::new(3);

        core.declare_vec(&mut trace, "coefs", &Prior::default_linear(), 2).unwrap();
        assert_eq!(trace.names(), vec!["promo__coefs"]);
    }

    #[test]
    // Purpose
    // -------
    // An empty identity is rejected at construction.
    fn empty_identity_is_rejected() {
        let err = EffectCore::new("", None, EffectMode::Additive).unwrap_err();
        assert_eq!(err, EffectError::EmptyId);
    }
}
