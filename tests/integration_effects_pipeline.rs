//! Integration tests for the effect decomposition pipeline.
//!
//! Purpose
//! -------
//! - Validate the end-to-end path an owning model drives: route a covariate
//!   table across effects, initialize each effect once, prepare
//!   per-evaluation bundles, apply every effect against a shared trend with
//!   one trace, and sum the outputs into the predicted series.
//! - Exercise a realistic effect mix (linear promo block with heterogeneous
//!   priors, saturating media channel, log-response weather term) rather
//!   than toy edge cases only.
//!
//! Coverage
//! --------
//! - `effects::router`:
//!   - `split_columns` partitioning across several effects.
//! - `effects::base`:
//!   - lifecycle over train and predict frames, skip signaling, and
//!     namespaced declarations sharing one trace.
//! - `effects::linear` / `effects::log` / `effects::hill`:
//!   - combined additive and multiplicative contributions under a
//!     conditioned trace.
//! - `frame`:
//!   - reordered forecast frames supplying a superset of columns.
//!
//! Exclusions
//! ----------
//! - Fine-grained validation of placement matrices, pattern semantics, and
//!   prior constructors — covered by unit tests in the owning modules.
//! - Posterior sampling and trend generation — external collaborators with
//!   no implementation here.

use ndarray::{array, Array1, Array2};
use rust_effects::effects::{
    router::split_columns, Effect, EffectMode, HillEffect, LinearEffect,
    LinearHeterogeneousEffect, LogEffect, Prior, PriorGroup, Stage, Trace,
};
use rust_effects::frame::{ExogenousFrame, Tensor};

/// Purpose
/// -------
/// Build the training covariate table used across these tests: two promo
/// channels, one media-spend channel, and a temperature column, over four
/// timepoints.
fn make_training_frame() -> ExogenousFrame {
    let columns: Vec<String> = ["promo_tv", "promo_radio", "media_search", "temp"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let values = array![
        [1.0, 0.0, 1.0, 0.0],
        [0.0, 1.0, 3.0, 0.0],
        [1.0, 1.0, 0.0, 1.0],
        [0.0, 0.0, 1.0, 3.0],
    ];
    ExogenousFrame::flat(columns, values).expect("training frame is well-formed")
}

/// Purpose
/// -------
/// Unit trend over `n` timepoints as a `(n, 1)` tensor, the shape the trend
/// component hands to `apply`.
fn make_unit_trend(n: usize) -> Tensor {
    Array2::<f64>::ones((n, 1)).into_dyn()
}

/// Purpose
/// -------
/// Sum a list of effect outputs with the trend, the combination the owning
/// model performs: additive effects are added, multiplicative effects were
/// already folded into their own output.
fn sum_with_trend(trend: &Tensor, outputs: &[Tensor]) -> Tensor {
    let mut total = trend.clone();
    for out in outputs {
        total = &total + out;
    }
    total
}

#[test]
// Purpose
// -------
// Route a table across three effects, run the full lifecycle with fixed
// priors, and check the summed series against the closed form.
//
// Given
// -----
// - promo effect (heterogeneous priors): tv coefficient 2, radio 3,
//   additive.
// - media effect (hill, multiplicative): half_max 1, slope 1, max_effect 10.
// - temp effect (log, additive): scale 2, rate 1.
// - Unit trend of length 4.
//
// Expect
// ------
// - Every contribution matches its closed form and the sum is exact.
fn full_pipeline_over_mixed_effects() {
    let frame = make_training_frame();
    let trend = make_unit_trend(4);

    let promo_groups =
        vec![PriorGroup::new("promo_tv", Prior::fixed(vec![2.0]).unwrap()).unwrap()];
    let mut promo = LinearHeterogeneousEffect::new(
        "promo",
        Some("promo_"),
        EffectMode::Additive,
        promo_groups,
        Prior::fixed(vec![3.0]).unwrap(),
    )
    .unwrap();

    let mut media = HillEffect::with_priors(
        "media",
        Some("media_"),
        EffectMode::Multiplicative,
        Prior::fixed(vec![1.0]).unwrap(),
        Prior::fixed(vec![1.0]).unwrap(),
        Prior::fixed(vec![10.0]).unwrap(),
    )
    .unwrap();

    let mut weather = LogEffect::with_priors(
        "weather",
        Some("temp"),
        EffectMode::Additive,
        Prior::fixed(vec![2.0]).unwrap(),
        Prior::fixed(vec![1.0]).unwrap(),
    )
    .unwrap();

    // Routing: each effect claims its own disjoint column set.
    let split = split_columns(&frame, &[&promo, &media, &weather]).unwrap();
    assert_eq!(split[0].1, vec!["promo_tv".to_string(), "promo_radio".to_string()]);
    assert_eq!(split[1].1, vec!["media_search".to_string()]);
    assert_eq!(split[2].1, vec!["temp".to_string()]);

    promo.initialize(&frame, 1.0).unwrap();
    media.initialize(&frame, 1.0).unwrap();
    weather.initialize(&frame, 1.0).unwrap();

    let mut trace = Trace::new(0);
    let mut outputs = Vec::new();
    for effect in [&promo as &dyn Effect, &media, &weather] {
        let bundle = effect.prepare_input_data(&frame, Stage::Train).unwrap();
        assert!(!bundle.is_empty());
        outputs.push(effect.apply(&mut trace, &trend, &bundle).unwrap());
    }

    // promo: 2·tv + 3·radio = [2, 3, 5, 0].
    assert_eq!(outputs[0], array![[2.0], [3.0], [5.0], [0.0]].into_dyn());

    // media (multiplicative against unit trend): 10/(1 + 1/x), saturating
    // to max_effect at x = 0 (the zero base is guarded before the negative
    // power).
    let media_out = &outputs[1];
    assert!((media_out[[0, 0]] - 5.0).abs() < 1e-12);
    assert!((media_out[[1, 0]] - 7.5).abs() < 1e-12);
    assert!((media_out[[2, 0]] - 10.0).abs() < 1e-12);
    assert!((media_out[[3, 0]] - 5.0).abs() < 1e-12);

    // weather: 2·log(temp + 1) = [0, 0, 2·log 2, 2·log 4].
    let weather_out = &outputs[2];
    assert!((weather_out[[2, 0]] - 2.0 * 2.0_f64.ln()).abs() < 1e-12);
    assert!((weather_out[[3, 0]] - 2.0 * 4.0_f64.ln()).abs() < 1e-12);

    // One trace, all declarations namespaced and distinct.
    assert_eq!(
        trace.names(),
        vec![
            "promo__coefs_0",
            "promo__coefs_1",
            "media__half_max",
            "media__slope",
            "media__max_effect",
            "weather__log_scale",
            "weather__log_rate",
        ]
    );

    let total = sum_with_trend(&trend, &outputs);
    let expected_first = 1.0 + 2.0 + 5.0 + 0.0;
    assert!((total[[0, 0]] - expected_first).abs() < 1e-12);
}

#[test]
// Purpose
// -------
// A fitted effect prepares forecast frames whose columns are a reordered
// superset of its selected set, using the column order captured at
// initialization.
fn predict_stage_reuses_columns_captured_at_fit() {
    let train = make_training_frame();
    let mut promo = LinearEffect::with_prior(
        "promo",
        Some("promo_"),
        EffectMode::Additive,
        Prior::fixed(vec![1.0, 10.0]).unwrap(),
    )
    .unwrap();
    promo.initialize(&train, 1.0).unwrap();

    // Forecast horizon: extra column first, promo columns swapped.
    let predict = ExogenousFrame::flat(
        vec!["new_col".to_string(), "promo_radio".to_string(), "promo_tv".to_string()],
        array![[9.0, 1.0, 2.0], [9.0, 0.0, 1.0]],
    )
    .unwrap();

    let bundle = promo.prepare_input_data(&predict, Stage::Predict).unwrap();
    let trend = make_unit_trend(2);
    let mut trace = Trace::new(0);

    // Coefficients bind to [promo_tv, promo_radio] as captured at fit time:
    // 1·tv + 10·radio.
    let out = promo.apply(&mut trace, &trend, &bundle).unwrap();
    assert_eq!(out, array![[12.0], [1.0]].into_dyn());
}

#[test]
// Purpose
// -------
// Conditioning the trace replaces draws with externally fixed values, the
// path an inference engine uses when evaluating at given parameters.
fn conditioned_trace_pins_coefficients() {
    let train = make_training_frame();
    let mut promo =
        LinearEffect::new("promo", Some("promo_"), EffectMode::Additive).unwrap();
    promo.initialize(&train, 1.0).unwrap();

    let bundle = promo.prepare_input_data(&train, Stage::Train).unwrap();
    let trend = make_unit_trend(4);

    let mut trace = Trace::new(123);
    trace.condition("promo__coefs", Array1::from_vec(vec![1.0, -1.0]));

    let out = promo.apply(&mut trace, &trend, &bundle).unwrap();
    // tv - radio over the four rows: [1, -1, 0, 0].
    assert_eq!(out, array![[1.0], [-1.0], [0.0], [0.0]].into_dyn());
    assert_eq!(trace.value("promo__coefs").unwrap(), &Array1::from_vec(vec![1.0, -1.0]));
}

#[test]
// Purpose
// -------
// An effect whose pattern matches nothing on the training table signals
// skip, and the owning model's sum degenerates to the trend.
fn unmatched_effect_is_skipped_by_the_owner() {
    let frame = make_training_frame();
    let mut holiday =
        LinearEffect::new("holiday", Some("holiday_"), EffectMode::Additive).unwrap();
    holiday.initialize(&frame, 1.0).unwrap();

    let bundle = holiday.prepare_input_data(&frame, Stage::Train).unwrap();
    assert!(bundle.is_empty());

    let trend = make_unit_trend(4);
    let total = sum_with_trend(&trend, &[]);
    assert_eq!(total, trend);
}
