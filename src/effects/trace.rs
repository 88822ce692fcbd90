//! Probabilistic trace — the per-evaluation record of declared variables.
//!
//! Purpose
//! -------
//! Model the "random-variable trace" as an explicit context object rather
//! than hidden global state: every effect receives a `&mut` [`Trace`] for
//! the duration of one model evaluation and declares its variables through
//! it. The trace owns the randomness, records every resolved value in
//! declaration order, and enforces name uniqueness itself — two effects
//! sharing an identity fail loudly instead of silently colliding.
//!
//! Key behaviors
//! -------------
//! - [`Trace::declare`] / [`Trace::declare_vec`] draw from a prior (or
//!   return a conditioned value) and record the result under a unique name.
//! - [`Trace::condition`] pins a variable to externally fixed values before
//!   evaluation, the inference-time path where parameters are given rather
//!   than drawn.
//! - Declaration order is preserved and inspectable, which is what makes a
//!   seeded evaluation reproducible: effects run in insertion order, so the
//!   stream of draws is deterministic.
//!
//! Conventions
//! -----------
//! - Every resolved value is stored as an `Array1<f64>`; scalar declarations
//!   are length-1 vectors and `declare` returns the single entry.
//! - A conditioned `declare` does not consume randomness.

use crate::effects::errors::{EffectError, EffectResult};
use crate::effects::prior::Prior;
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;

/// Per-evaluation record of declared random variables.
///
/// One trace spans one model evaluation; the owning model constructs a fresh
/// trace (or reuses a seeded one) per evaluation and passes it to every
/// effect's `apply`.
#[derive(Debug, Clone)]
pub struct Trace {
    rng: StdRng,
    values: Vec<(String, Array1<f64>)>,
    conditioning: HashMap<String, Array1<f64>>,
}

impl Trace {
    /// Fresh trace seeded for reproducible draws.
    pub fn new(seed: u64) -> Self {
        Trace::from_rng(StdRng::seed_from_u64(seed))
    }

    /// Fresh trace over a caller-owned random generator.
    pub fn from_rng(rng: StdRng) -> Self {
        Trace { rng, values: Vec::new(), conditioning: HashMap::new() }
    }

    /// Pin `name` to externally fixed values. A later `declare` of the same
    /// name returns these values (after length validation) instead of
    /// drawing from the prior.
    pub fn condition<S: Into<String>>(&mut self, name: S, values: Array1<f64>) {
        self.conditioning.insert(name.into(), values);
    }

    /// Declare a scalar random variable and return its resolved value.
    ///
    /// Errors
    /// ------
    /// - [`EffectError::DuplicateVariable`] if `name` was already declared
    ///   in this trace.
    /// - [`EffectError::PriorLengthMismatch`] if a conditioned value or a
    ///   fixed prior does not hold exactly one entry.
    pub fn declare(&mut self, name: &str, prior: &Prior) -> EffectResult<f64> {
        let value = self.declare_vec(name, prior, 1)?;
        Ok(value[0])
    }

    /// Declare a vector random variable of length `len` and return its
    /// resolved values.
    ///
    /// Errors
    /// ------
    /// - [`EffectError::DuplicateVariable`] if `name` was already declared
    ///   in this trace.
    /// - [`EffectError::PriorLengthMismatch`] if a conditioned value or a
    ///   fixed prior has a different length.
    pub fn declare_vec(
        &mut self, name: &str, prior: &Prior, len: usize,
    ) -> EffectResult<Array1<f64>> {
        if self.values.iter().any(|(n, _)| n == name) {
            return Err(EffectError::DuplicateVariable { name: name.to_string() });
        }

        let value = match self.conditioning.get(name) {
            Some(fixed) => {
                if fixed.len() != len {
                    return Err(EffectError::PriorLengthMismatch {
                        expected: len,
                        actual: fixed.len(),
                    });
                }
                fixed.clone()
            }
            None => prior.sample_vec(len, &mut self.rng)?,
        };

        self.values.push((name.to_string(), value.clone()));
        Ok(value)
    }

    /// Resolved value of a declared variable, if any.
    pub fn value(&self, name: &str) -> Option<&Array1<f64>> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Declared variable names, in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.values.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Number of declared variables.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing has been declared yet.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
