//! Keyframe Resolution Tests
//!
//! Exercises `KeyframeTrack::resolve` through the public API: clamping at
//! both ends, exact hits and mixed numeric/opaque interpolation.

use marquee_core::{EasingKind, Keyframe, KeyframeTrack, PropertyMap, PropertyValue};

fn props(entries: &[(&str, PropertyValue)]) -> PropertyMap {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn x(value: f64) -> PropertyMap {
    props(&[("x", PropertyValue::Number(value))])
}

fn number(map: &PropertyMap, key: &str) -> f64 {
    map.get(key).and_then(PropertyValue::as_number).unwrap()
}

/// Two linear keyframes resolve to the midpoint and clamp outside their range.
#[test]
fn linear_track_scenario() {
    let mut track = KeyframeTrack::new();
    track.add(Keyframe::new(0.0, x(0.0), EasingKind::Linear).unwrap());
    track.add(Keyframe::new(2.0, x(10.0), EasingKind::Linear).unwrap());

    assert_eq!(number(&track.resolve(1.0), "x"), 5.0);
    assert_eq!(number(&track.resolve(-1.0), "x"), 0.0);
    assert_eq!(number(&track.resolve(5.0), "x"), 10.0);
}

/// Resolving exactly at a keyframe returns its properties for any insertion order.
#[test]
fn exact_hits_are_idempotent_for_any_insertion_order() {
    let keyframes = [
        Keyframe::new(0.0, x(1.0), EasingKind::EaseIn).unwrap(),
        Keyframe::new(1.5, x(-4.0), EasingKind::EaseOut).unwrap(),
        Keyframe::new(3.25, x(7.5), EasingKind::Step).unwrap(),
        Keyframe::new(6.0, x(2.0), EasingKind::EaseInOut).unwrap(),
    ];
    let orders: [[usize; 4]; 4] = [[0, 1, 2, 3], [3, 2, 1, 0], [2, 0, 3, 1], [1, 3, 0, 2]];

    for order in orders {
        let mut track = KeyframeTrack::new();
        for i in order {
            track.add(keyframes[i].clone());
        }
        let times: Vec<f64> = track.keyframes().iter().map(Keyframe::time).collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]), "track not sorted: {times:?}");
        for keyframe in &keyframes {
            assert_eq!(
                &track.resolve(keyframe.time()),
                keyframe.properties(),
                "order {order:?} at t={}",
                keyframe.time()
            );
        }
    }
}

/// Numbers blend while strings flip at the halfway point.
#[test]
fn mixed_properties_blend_per_key() {
    let start = props(&[
        ("x", PropertyValue::Number(0.0)),
        ("image", PropertyValue::from("a.png")),
    ]);
    let end = props(&[
        ("x", PropertyValue::Number(100.0)),
        ("image", PropertyValue::from("b.png")),
        ("extra", PropertyValue::Number(3.0)),
    ]);
    let track = KeyframeTrack::from_keyframes([
        Keyframe::new(0.0, start, EasingKind::Linear).unwrap(),
        Keyframe::new(10.0, end, EasingKind::Linear).unwrap(),
    ]);

    let early = track.resolve(2.5);
    assert_eq!(number(&early, "x"), 25.0);
    assert_eq!(early["image"], PropertyValue::from("a.png"));
    assert_eq!(number(&early, "extra"), 3.0, "one-sided keys pass through");

    let late = track.resolve(7.5);
    assert_eq!(late["image"], PropertyValue::from("b.png"));
}

/// The easing of the earlier keyframe shapes the segment after it.
#[test]
fn segment_uses_earlier_keyframe_easing() {
    let track = KeyframeTrack::from_keyframes([
        Keyframe::new(0.0, x(0.0), EasingKind::EaseIn).unwrap(),
        Keyframe::new(1.0, x(100.0), EasingKind::Linear).unwrap(),
        Keyframe::new(2.0, x(0.0), EasingKind::Step).unwrap(),
    ]);
    assert!((number(&track.resolve(0.5), "x") - 25.0).abs() < 1e-9);
    assert!((number(&track.resolve(1.5), "x") - 50.0).abs() < 1e-9);
}

#[test]
fn invalid_times_are_rejected() {
    assert!(Keyframe::new(-0.5, x(0.0), EasingKind::Linear).is_err());
    assert!(Keyframe::new(f64::INFINITY, x(0.0), EasingKind::Linear).is_err());
}
