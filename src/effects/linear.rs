//! Linear effect family.
//!
//! Purpose
//! -------
//! Implement the two linear variants of the effect contract:
//!
//! - [`LinearEffect`]: one prior applied independently (a vectorized,
//!   conditionally-independent draw) to every selected column; the
//!   coefficient vector is reshaped to a column and matrix-multiplied
//!   against the data tensor, batched over an optional leading series axis.
//! - [`LinearHeterogeneousEffect`]: selected columns are partitioned into
//!   disjoint prior groups at initialization; every application draws one
//!   sub-vector per group and reassembles the full feature-ordered
//!   coefficient vector through the placement matrix before proceeding
//!   exactly as the plain variant.
//!
//! Conventions
//! -----------
//! - Coefficients are a fresh draw on every application, never persisted
//!   across calls.
//! - The plain variant's coefficient variable is `"<id>__coefs"`; the
//!   heterogeneous variant declares `"<id>__coefs_<i>"` per group.

use crate::effects::algebra::{linear_response, EffectMode};
use crate::effects::assembler::{CoefficientAssembler, PriorGroup};
use crate::effects::base::{Effect, EffectCore, InputBundle};
use crate::effects::errors::{EffectError, EffectResult};
use crate::effects::prior::Prior;
use crate::effects::trace::Trace;
use crate::frame::{ExogenousFrame, Tensor};
use ndarray::Axis;

/// Linear effect: `data @ coefs` with one shared coefficient prior.
#[derive(Debug, Clone)]
pub struct LinearEffect {
    core: EffectCore,
    prior: Prior,
}

impl LinearEffect {
    /// Linear effect with the default coefficient prior `Normal(0, 0.1)`.
    pub fn new(id: &str, pattern: Option<&str>, mode: EffectMode) -> EffectResult<Self> {
        LinearEffect::with_prior(id, pattern, mode, Prior::default_linear())
    }

    /// Linear effect with an explicit coefficient prior.
    pub fn with_prior(
        id: &str, pattern: Option<&str>, mode: EffectMode, prior: Prior,
    ) -> EffectResult<Self> {
        Ok(LinearEffect { core: EffectCore::new(id, pattern, mode)?, prior })
    }
}

impl Effect for LinearEffect {
    fn core(&self) -> &EffectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EffectCore {
        &mut self.core
    }

    // Used inside hierarchical models with a leading series axis.
    fn supports_multivariate(&self) -> bool {
        true
    }

    fn raw_effect(
        &self, trace: &mut Trace, _trend: &Tensor, inputs: &InputBundle,
    ) -> EffectResult<Tensor> {
        let data = inputs.require(self.core.id(), "data")?;
        let n_features = data.shape().last().copied().unwrap_or(0);

        let coefs = self.core.declare_vec(trace, "coefs", &self.prior, n_features)?;
        let coefs = coefs.insert_axis(Axis(1));

        linear_response(data, &coefs)
    }
}

/// Linear effect with heterogeneous priors over disjoint column groups.
///
/// The partition and placement matrix are built once in `on_initialize`
/// from the selected columns; see [`CoefficientAssembler`].
#[derive(Debug, Clone)]
pub struct LinearHeterogeneousEffect {
    core: EffectCore,
    groups: Vec<PriorGroup>,
    default_prior: Prior,
    assembler: Option<CoefficientAssembler>,
}

impl LinearHeterogeneousEffect {
    /// Heterogeneous-prior linear effect.
    ///
    /// Parameters
    /// ----------
    /// - `groups`: explicit prior groups in declaration order; overlapping
    ///   claims surface at initialization as
    ///   [`EffectError::OverlappingPriorGroups`].
    /// - `default_prior`: prior for every selected column no group claims.
    pub fn new(
        id: &str, pattern: Option<&str>, mode: EffectMode, groups: Vec<PriorGroup>,
        default_prior: Prior,
    ) -> EffectResult<Self> {
        Ok(LinearHeterogeneousEffect {
            core: EffectCore::new(id, pattern, mode)?,
            groups,
            default_prior,
            assembler: None,
        })
    }

    /// The assembler built at initialization, if any.
    pub fn assembler(&self) -> Option<&CoefficientAssembler> {
        self.assembler.as_ref()
    }
}

impl Effect for LinearHeterogeneousEffect {
    fn core(&self) -> &EffectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EffectCore {
        &mut self.core
    }

    fn supports_multivariate(&self) -> bool {
        true
    }

    fn on_initialize(&mut self, _frame: &ExogenousFrame, _scale: f64) -> EffectResult<()> {
        let assembler = CoefficientAssembler::new(
            self.core.selected_columns(),
            &self.groups,
            &self.default_prior,
        )?;
        self.assembler = Some(assembler);
        Ok(())
    }

    fn raw_effect(
        &self, trace: &mut Trace, _trend: &Tensor, inputs: &InputBundle,
    ) -> EffectResult<Tensor> {
        let assembler = self.assembler.as_ref().ok_or_else(|| {
            EffectError::NotInitialized { id: self.core.id().to_string() }
        })?;
        let data = inputs.require(self.core.id(), "data")?;

        let coefs = assembler.coefficients(&self.core, trace)?;
        linear_response(data, &coefs)
    }
}
