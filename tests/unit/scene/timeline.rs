use super::*;
use crate::effects::catalog::{Effect, EffectCatalog};
use crate::schedule::scheduler::schedule;

fn placement(effect: Effect, start_secs: f64, duration_secs: f64) -> Placement {
    Placement {
        effect,
        start_secs,
        duration_secs,
    }
}

#[test]
fn accepts_scheduler_output() {
    let placements = schedule(100.0, &EffectCatalog::standard(), 10.0, 60.0).unwrap();
    let tl = Timeline::new(100.0, placements.clone()).unwrap();
    assert_eq!(tl.placements(), placements.as_slice());
    assert_eq!(tl.duration_secs(), 100.0);
}

#[test]
fn rejects_overlap_and_overrun() {
    let overlap = vec![
        placement(Effect::Wave, 0.0, 10.0),
        placement(Effect::Opacity, 5.0, 10.0),
    ];
    assert!(Timeline::new(100.0, overlap).is_err());

    let overrun = vec![placement(Effect::Wave, 95.0, 10.0)];
    assert!(Timeline::new(100.0, overrun).is_err());

    let negative = vec![placement(Effect::Wave, -1.0, 10.0)];
    assert!(Timeline::new(100.0, negative).is_err());

    assert!(Timeline::new(0.0, Vec::new()).is_err());
}

#[test]
fn empty_timeline_never_shows_caption() {
    let tl = Timeline::new(3.0, Vec::new()).unwrap();
    assert!(tl.active_at(0.0).is_none());
    assert!(tl.overlay_at(1.5).is_none());
}

#[test]
fn active_at_respects_half_open_windows() {
    let tl = Timeline::new(
        100.0,
        vec![
            placement(Effect::Wave, 0.0, 10.0),
            placement(Effect::Opacity, 70.0, 10.0),
        ],
    )
    .unwrap();

    assert_eq!(tl.active_at(0.0).unwrap().effect, Effect::Wave);
    assert_eq!(tl.active_at(9.99).unwrap().effect, Effect::Wave);
    assert!(tl.active_at(10.0).is_none());
    assert!(tl.active_at(69.9).is_none());
    assert_eq!(tl.active_at(70.0).unwrap().effect, Effect::Opacity);
    assert!(tl.active_at(80.0).is_none());
    assert!(tl.active_at(-1.0).is_none());
}

#[test]
fn overlay_time_is_local_to_placement() {
    let tl = Timeline::new(100.0, vec![placement(Effect::Opacity, 70.0, 10.0)]).unwrap();
    // Local t = 0.25 -> opacity peak.
    let o = tl.overlay_at(70.25).unwrap();
    assert!((o.opacity - 1.0).abs() < 1e-9);
    // Local t = 0 -> midpoint, independent of the global offset.
    let o = tl.overlay_at(70.0).unwrap();
    assert!((o.opacity - 0.5).abs() < 1e-9);
}
