//! Log effect — diminishing-returns response curve.
//!
//! Computes `scale * log(clip(rate * data + 1, LOG_CLIP_FLOOR))` with
//! positive-support `Gamma(1, 1)` priors on both parameters by default. The
//! clip is mandatory: without it, `rate * data <= -1` would feed a
//! non-finite logarithm into the model.

use crate::effects::algebra::{EffectMode, LOG_CLIP_FLOOR};
use crate::effects::base::{Effect, EffectCore, InputBundle};
use crate::effects::errors::EffectResult;
use crate::effects::prior::Prior;
use crate::effects::trace::Trace;
use crate::frame::Tensor;

/// Log-response effect: `scale * log(clip(rate * data + 1, floor))`.
#[derive(Debug, Clone)]
pub struct LogEffect {
    core: EffectCore,
    scale_prior: Prior,
    rate_prior: Prior,
}

impl LogEffect {
    /// Log effect with the default `Gamma(1, 1)` priors on scale and rate.
    pub fn new(id: &str, pattern: Option<&str>, mode: EffectMode) -> EffectResult<Self> {
        LogEffect::with_priors(id, pattern, mode, Prior::default_gamma(), Prior::default_gamma())
    }

    /// Log effect with explicit scale and rate priors.
    pub fn with_priors(
        id: &str, pattern: Option<&str>, mode: EffectMode, scale_prior: Prior,
        rate_prior: Prior,
    ) -> EffectResult<Self> {
        Ok(LogEffect { core: EffectCore::new(id, pattern, mode)?, scale_prior, rate_prior })
    }
}

impl Effect for LogEffect {
    fn core(&self) -> &EffectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EffectCore {
        &mut self.core
    }

    fn raw_effect(
        &self, trace: &mut Trace, _trend: &Tensor, inputs: &InputBundle,
    ) -> EffectResult<Tensor> {
        let data = inputs.require(self.core.id(), "data")?;

        let scale = self.core.declare(trace, "log_scale", &self.scale_prior)?;
        let rate = self.core.declare(trace, "log_rate", &self.rate_prior)?;

        Ok(data.mapv(|v| scale * (rate * v + 1.0).max(LOG_CLIP_FLOOR).ln()))
    }
}
