use crate::evaluator::{evaluate, Evaluator, Reading};
use crate::state::SystemState;
use crate::thresholds::{ConfigError, EngineThresholds};
use proptest::prelude::*;
use rand::Rng;

fn at(effective: f64, previous: Option<SystemState>) -> SystemState {
    evaluate(effective, 0.0, 0.0, previous).state
}

fn raw_band(e: f64) -> SystemState {
    if e >= 1.0 {
        SystemState::SystemShouldHalt
    } else if e >= 0.85 {
        SystemState::Unstable
    } else if e >= 0.6 {
        SystemState::BoundaryZone
    } else {
        SystemState::Stable
    }
}

#[test]
fn end_to_end_nominal_tick() {
    let result = evaluate(0.2, 0.1, 0.05, Some(SystemState::Stable));
    assert!((result.effective_energy - 0.275).abs() < 1e-12);
    assert_eq!(result.state, SystemState::Stable);
    assert_eq!(result.details, "Energy: 0.20 | Eff: 0.28 - System Nominal");
}

#[test]
fn severity_order_is_total() {
    assert!(SystemState::Stable < SystemState::BoundaryZone);
    assert!(SystemState::BoundaryZone < SystemState::Unstable);
    assert!(SystemState::Unstable < SystemState::SystemShouldHalt);
    for pair in SystemState::ALL.windows(2) {
        assert_eq!(pair[0].severity() + 1, pair[1].severity());
    }
    assert_eq!(SystemState::default(), SystemState::INITIAL);
    assert!(SystemState::SystemShouldHalt.is_terminal());
    assert!(!SystemState::Unstable.is_terminal());
}

#[test]
fn bands_cover_sweep_without_gaps() {
    for i in 0..=600 {
        let e = -1.0 + i as f64 * 0.005;
        assert_eq!(at(e, None), raw_band(e), "effective energy {e}");
    }
}

#[test]
fn band_lower_bounds_are_inclusive() {
    assert_eq!(at(0.6, None), SystemState::BoundaryZone);
    assert_eq!(at(0.6 - 1e-9, None), SystemState::Stable);
    assert_eq!(at(0.85, None), SystemState::Unstable);
    assert_eq!(at(0.85 - 1e-9, None), SystemState::BoundaryZone);
    assert_eq!(at(1.0, None), SystemState::SystemShouldHalt);
    assert_eq!(at(1.0 - 1e-9, None), SystemState::Unstable);
}

#[test]
fn unstable_sticks_above_release_level() {
    assert_eq!(at(0.8, Some(SystemState::Unstable)), SystemState::Unstable);
    assert_eq!(at(0.76, Some(SystemState::Unstable)), SystemState::Unstable);
}

#[test]
fn unstable_releases_below_margin() {
    assert_eq!(at(0.74, Some(SystemState::Unstable)), SystemState::BoundaryZone);
}

#[test]
fn boundary_sticks_above_release_level() {
    assert_eq!(at(0.55, Some(SystemState::BoundaryZone)), SystemState::BoundaryZone);
    assert_eq!(at(0.45, Some(SystemState::BoundaryZone)), SystemState::Stable);
}

#[test]
fn upward_moves_are_immediate() {
    assert_eq!(at(1.2, Some(SystemState::Stable)), SystemState::SystemShouldHalt);
    assert_eq!(at(0.9, Some(SystemState::BoundaryZone)), SystemState::Unstable);
    assert_eq!(at(0.65, Some(SystemState::Stable)), SystemState::BoundaryZone);
}

#[test]
fn halt_does_not_recover_by_itself_and_two_level_drops_pass() {
    assert_eq!(at(0.1, Some(SystemState::SystemShouldHalt)), SystemState::Stable);
    assert_eq!(at(0.9, Some(SystemState::SystemShouldHalt)), SystemState::Unstable);
    // Unstable -> Stable skips both damping rules.
    assert_eq!(at(0.55, Some(SystemState::Unstable)), SystemState::Stable);
}

#[test]
fn missing_previous_state_means_no_damping() {
    assert_eq!(at(0.8, None), SystemState::BoundaryZone);
    assert_eq!(at(0.55, None), SystemState::Stable);
}

#[test]
fn details_suffix_follows_final_state() {
    assert_eq!(
        evaluate(1.1, 0.0, 0.0, None).details,
        "Energy: 1.10 | Eff: 1.10 - CRITICAL LIMIT BREACH"
    );
    assert_eq!(
        evaluate(0.8, 0.0, 0.0, Some(SystemState::Unstable)).details,
        "Energy: 0.80 | Eff: 0.80 - High Instability Detected"
    );
    assert_eq!(
        evaluate(0.6, 0.1, 0.0, None).details,
        "Energy: 0.60 | Eff: 0.65 - Approaching Limits"
    );
}

#[test]
fn noise_sign_is_ignored() {
    let up = evaluate(0.5, 0.1, 0.3, None);
    let down = evaluate(0.5, 0.1, -0.3, None);
    assert_eq!(up, down);
    assert!((up.effective_energy - 0.7).abs() < 1e-12);
}

#[test]
fn non_finite_inputs_never_panic() {
    let nan = evaluate(f64::NAN, 0.0, 0.0, Some(SystemState::Unstable));
    assert!(!nan.is_finite());
    assert_eq!(nan.state, SystemState::Stable);
    assert!(nan.details.ends_with(" - System Nominal"));

    assert_eq!(
        evaluate(f64::INFINITY, 0.0, 0.0, None).state,
        SystemState::SystemShouldHalt
    );
    assert_eq!(evaluate(f64::NEG_INFINITY, 0.0, 0.0, None).state, SystemState::Stable);

    let cancelled = evaluate(f64::NEG_INFINITY, f64::INFINITY, 0.0, None);
    assert!(cancelled.effective_energy.is_nan());
    assert_eq!(cancelled.state, SystemState::Stable);
}

#[test]
fn custom_thresholds_shift_bands_and_margins() {
    let evaluator = Evaluator::new(EngineThresholds {
        stable_limit: 0.3,
        boundary_limit: 0.5,
        halt_limit: 0.7,
        hysteresis_buffer: 0.05,
    })
    .unwrap();

    let reading = |energy, previous| Reading::new(energy, 0.0, 0.0, previous);
    assert_eq!(evaluator.evaluate(&reading(0.7, None)).state, SystemState::SystemShouldHalt);
    assert_eq!(
        evaluator.evaluate(&reading(0.47, Some(SystemState::Unstable))).state,
        SystemState::Unstable
    );
    assert_eq!(
        evaluator.evaluate(&reading(0.44, Some(SystemState::Unstable))).state,
        SystemState::BoundaryZone
    );
    assert_eq!(
        evaluator.evaluate(&reading(0.26, Some(SystemState::BoundaryZone))).state,
        SystemState::BoundaryZone
    );
}

#[test]
fn zero_buffer_disables_stickiness() {
    let evaluator = Evaluator::new(EngineThresholds {
        hysteresis_buffer: 0.0,
        ..EngineThresholds::default()
    })
    .unwrap();
    let result = evaluator.evaluate(&Reading::new(0.84, 0.0, 0.0, Some(SystemState::Unstable)));
    assert_eq!(result.state, SystemState::BoundaryZone);
}

#[test]
fn invalid_thresholds_are_rejected() {
    let descending = EngineThresholds {
        stable_limit: 0.9,
        ..EngineThresholds::default()
    };
    assert!(matches!(
        Evaluator::new(descending),
        Err(ConfigError::NotAscending { .. })
    ));

    let negative = EngineThresholds {
        hysteresis_buffer: -0.1,
        ..EngineThresholds::default()
    };
    assert!(matches!(negative.validate(), Err(ConfigError::NegativeBuffer(_))));

    let nan = EngineThresholds {
        halt_limit: f64::NAN,
        ..EngineThresholds::default()
    };
    assert!(matches!(
        nan.validate(),
        Err(ConfigError::NonFinite { name: "halt_limit", .. })
    ));
}

#[test]
fn thresholds_load_from_json_with_defaults() {
    let loaded = EngineThresholds::from_json_str(r#"{ "halt_limit": 1.2 }"#).unwrap();
    assert_eq!(loaded.halt_limit, 1.2);
    assert_eq!(loaded.stable_limit, 0.6);
    assert_eq!(loaded.boundary_limit, 0.85);
    assert_eq!(loaded.hysteresis_buffer, 0.1);

    assert!(matches!(
        EngineThresholds::from_json_str(r#"{ "halt_limit": 0.5 }"#),
        Err(ConfigError::NotAscending { .. })
    ));
    assert!(matches!(
        EngineThresholds::from_json_str("not json"),
        Err(ConfigError::Parse(_))
    ));
    assert!(matches!(
        EngineThresholds::from_path("/nonexistent/limit-thresholds.json"),
        Err(ConfigError::Io { .. })
    ));
}

#[test]
fn reading_and_result_use_camel_case_wire_names() {
    let reading: Reading = serde_json::from_str(
        r#"{"energy":0.5,"trend":0.0,"noise":0.1,"previousState":"BOUNDARY_ZONE"}"#,
    )
    .unwrap();
    assert_eq!(reading.previous_state, Some(SystemState::BoundaryZone));

    let first: Reading = serde_json::from_str(r#"{"energy":0.5,"trend":0.0,"noise":0.1}"#).unwrap();
    assert_eq!(first.previous_state, None);

    let value = serde_json::to_value(Evaluator::default().evaluate(&reading)).unwrap();
    assert_eq!(value["state"], "BOUNDARY_ZONE");
    assert!(value["effectiveEnergy"].is_number());
    assert!(value["details"].as_str().unwrap().starts_with("Energy: 0.50"));
}

#[test]
fn shared_evaluator_is_consistent_across_threads() {
    let evaluator = Evaluator::default();
    let mut rng = rand::thread_rng();
    let readings: Vec<Reading> = (0..64)
        .map(|_| {
            Reading::new(
                rng.gen_range(0.0..1.5),
                rng.gen_range(-0.5..0.5),
                rng.gen_range(0.0..1.0),
                Some(SystemState::ALL[rng.gen_range(0..4usize)]),
            )
        })
        .collect();
    let expected: Vec<_> = readings.iter().map(|r| evaluator.evaluate(r)).collect();

    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                let got: Vec<_> = readings.iter().map(|r| evaluator.evaluate(r)).collect();
                assert_eq!(got, expected);
            });
        }
    });
}

fn any_state() -> impl Strategy<Value = Option<SystemState>> {
    prop_oneof![
        Just(None),
        Just(Some(SystemState::Stable)),
        Just(Some(SystemState::BoundaryZone)),
        Just(Some(SystemState::Unstable)),
        Just(Some(SystemState::SystemShouldHalt)),
    ]
}

proptest! {
    #[test]
    fn evaluation_is_deterministic(
        energy in -2.0f64..3.0,
        trend in -1.0f64..1.0,
        noise in -2.0f64..2.0,
        previous in any_state(),
    ) {
        let a = evaluate(energy, trend, noise, previous);
        let b = evaluate(energy, trend, noise, previous);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn effective_energy_follows_formula(
        energy in -2.0f64..3.0,
        trend in -1.0f64..1.0,
        noise in -2.0f64..2.0,
        previous in any_state(),
    ) {
        let result = evaluate(energy, trend, noise, previous);
        let expected = energy + trend * 0.5 + noise.abs() * 0.5;
        prop_assert!((result.effective_energy - expected).abs() < 1e-12);
    }

    #[test]
    fn hysteresis_never_raises_above_previous_or_lowers_below_raw(
        energy in -1.0f64..2.0,
        previous in any_state(),
    ) {
        let raw = raw_band(energy);
        let state = at(energy, previous);
        prop_assert!(state >= raw);
        if state != raw {
            prop_assert_eq!(Some(state), previous);
            prop_assert_eq!(state.severity(), raw.severity() + 1);
        }
    }
}
