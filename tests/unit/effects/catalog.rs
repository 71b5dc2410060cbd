use super::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn approx_state(a: OverlayState, b: OverlayState) -> bool {
    approx(a.scale, b.scale) && approx(a.opacity, b.opacity) && approx(a.offset_y, b.offset_y)
}

#[test]
fn wave_matches_reference_formula() {
    let base = OverlayState::IDENTITY;
    assert!(approx(Effect::Wave.apply(&base, 0.0).scale, 1.0));
    assert!(approx(Effect::Wave.apply(&base, 0.25).scale, 1.2));
    assert!(approx(Effect::Wave.apply(&base, 0.75).scale, 0.8));
    assert!(approx(Effect::Wave.apply(&base, 0.25).opacity, 1.0));
}

#[test]
fn accordion_shares_wave_transform() {
    let base = OverlayState::IDENTITY;
    for i in 0..50 {
        let t = f64::from(i) * 0.037;
        assert_eq!(
            Effect::Accordion.apply(&base, t),
            Effect::Wave.apply(&base, t)
        );
    }
}

#[test]
fn elastic_is_half_frequency_small_amplitude() {
    let base = OverlayState::IDENTITY;
    assert!(approx(Effect::Elastic.apply(&base, 0.5).scale, 1.05));
    assert!(approx(Effect::Elastic.apply(&base, 1.5).scale, 0.95));
    assert!(approx(Effect::Elastic.apply(&base, 1.0).scale, 1.0));
}

#[test]
fn opacity_leaves_scale_alone() {
    let base = OverlayState::IDENTITY;
    let out = Effect::Opacity.apply(&base, 0.25);
    assert!(approx(out.opacity, 1.0));
    assert!(approx(out.scale, 1.0));
    assert!(approx(Effect::Opacity.apply(&base, 0.75).opacity, 0.0));
    assert!(approx(Effect::Opacity.apply(&base, 0.0).opacity, 0.5));
}

#[test]
fn opacity_stays_in_unit_interval() {
    let bases = [
        OverlayState::IDENTITY,
        OverlayState {
            scale: 1.0,
            opacity: 0.3,
            offset_y: 0.0,
        },
    ];
    for base in bases {
        for i in -200..200 {
            let t = f64::from(i) * 0.0173;
            let o = Effect::Opacity.apply(&base, t).opacity;
            assert!((0.0..=1.0).contains(&o), "opacity {o} at t={t}");
        }
    }
}

#[test]
fn periodic_effects_repeat_after_their_period() {
    let base = OverlayState::IDENTITY;
    for effect in Effect::CATALOG {
        let period = effect.period_secs().unwrap();
        for i in 0..100 {
            let t = f64::from(i) * 0.0731;
            assert!(
                approx_state(effect.apply(&base, t), effect.apply(&base, t + period)),
                "{effect} not periodic at t={t}"
            );
        }
    }
}

#[test]
fn apply_is_pure_and_order_independent() {
    let base = OverlayState::IDENTITY;
    let a = Effect::Wave.apply(&base, 0.9);
    let _ = Effect::Wave.apply(&base, 0.1);
    let _ = Effect::Opacity.apply(&base, 0.4);
    assert_eq!(Effect::Wave.apply(&base, 0.9), a);
}

#[test]
fn drift_moves_down_at_reduced_opacity() {
    let out = Effect::Drift.apply(&OverlayState::IDENTITY, 3.0);
    assert!(approx(out.offset_y, 30.0));
    assert!(approx(out.opacity, 0.8));
    assert!(approx(out.scale, 1.0));
    assert!(Effect::Drift.period_secs().is_none());
}

#[test]
fn apply_named_resolves_names_case_insensitively() {
    let base = OverlayState::IDENTITY;
    let out = apply_named("  Wave ", &base, 0.25).unwrap();
    assert!(approx(out.scale, 1.2));
}

#[test]
fn apply_named_rejects_unknown_effect() {
    let err = apply_named("spin", &OverlayState::IDENTITY, 0.0).unwrap_err();
    assert!(matches!(err, StillcastError::UnknownEffect(ref n) if n == "spin"));
}

#[test]
fn apply_named_only_knows_catalog_effects() {
    let err = apply_named(" drift", &OverlayState::IDENTITY, 1.0).unwrap_err();
    assert!(matches!(err, StillcastError::UnknownEffect(ref n) if n == "drift"));
    for effect in Effect::CATALOG {
        assert!(apply_named(effect.name(), &OverlayState::IDENTITY, 0.3).is_ok());
    }
}

#[test]
fn names_round_trip_through_display() {
    for effect in Effect::CATALOG {
        assert_eq!(effect.to_string().parse::<Effect>().unwrap(), effect);
    }
}

#[test]
fn serde_uses_lowercase_names() {
    let json = serde_json::to_string(&Effect::Elastic).unwrap();
    assert_eq!(json, "\"elastic\"");
    let back: Effect = serde_json::from_str("\"accordion\"").unwrap();
    assert_eq!(back, Effect::Accordion);
}

#[test]
fn standard_catalog_keeps_source_order() {
    assert_eq!(
        EffectCatalog::standard().effects(),
        &[
            Effect::Wave,
            Effect::Accordion,
            Effect::Opacity,
            Effect::Elastic
        ]
    );
}

#[test]
fn from_names_rejects_unknown_and_drift() {
    let err = EffectCatalog::from_names(&["wave", "twirl"]).unwrap_err();
    assert!(matches!(err, StillcastError::UnknownEffect(_)));

    let err = EffectCatalog::from_names(&["drift"]).unwrap_err();
    assert!(matches!(err, StillcastError::InvalidConfiguration(_)));

    let ok = EffectCatalog::from_names(&["opacity", "wave"]).unwrap();
    assert_eq!(ok.effects(), &[Effect::Opacity, Effect::Wave]);
}

#[test]
fn shuffled_is_a_seeded_permutation() {
    let catalog = EffectCatalog::standard();
    let a = catalog.shuffled(&mut StdRng::seed_from_u64(7));
    let b = catalog.shuffled(&mut StdRng::seed_from_u64(7));
    assert_eq!(a, b);

    let mut sorted = a.effects().to_vec();
    sorted.sort_by_key(|e| e.name());
    let mut expected = catalog.effects().to_vec();
    expected.sort_by_key(|e| e.name());
    assert_eq!(sorted, expected);
}
