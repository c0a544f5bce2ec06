//! Presentation Engine Tests
//!
//! Covers element registration, the shared-`now` tick, keyframe properties
//! at local time, timing text and the single removal path.

use chrono::{TimeDelta, TimeZone, Utc};
use marquee_core::{
    AnimationConfig, AnimationPhase, EasingKind, EffectName, ElementSpec, EngineConfig, Keyframe,
    KeyframeTrack, PresentationEngine, PropertyMap, PropertyValue, TimingFormat, TimingMode,
    TimingSpec, Timestamp,
};

fn epoch() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 2, 29, 18, 30, 0).unwrap()
}

fn engine() -> PresentationEngine {
    PresentationEngine::new(EngineConfig {
        seed: Some(7),
        ..EngineConfig::default()
    })
}

fn slideshow(items: usize) -> ElementSpec {
    ElementSpec {
        animation: AnimationConfig {
            entrance: EffectName::CoverLeft.into(),
            exit: EffectName::CoverRight.into(),
            entrance_speed: Some(0),
            exit_speed: Some(0),
            hold_seconds: 1.0,
            ..AnimationConfig::default()
        },
        item_count: items,
        ..ElementSpec::default()
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn at(millis: i64) -> Timestamp {
    epoch() + TimeDelta::milliseconds(millis)
}

/// Every element is advanced from the same instant, in id order.
#[test]
fn tick_advances_all_elements_together() {
    let mut engine = engine();
    for id in [3, 1, 2] {
        engine.upsert_element(id, slideshow(2), epoch());
    }

    let frames = engine.tick(at(400));
    let ids: Vec<u64> = frames.iter().map(|f| f.element_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    for frame in &frames {
        assert_eq!(frame.phase, AnimationPhase::Entrance);
        assert!((frame.progress - 0.4).abs() < 1e-9);
    }
    assert_eq!(engine.last_tick(), Some(at(400)));
}

/// The item index advance is visible to `evaluate` right after the tick.
#[test]
fn evaluate_sees_item_advance() {
    init_tracing();
    let mut engine = engine();
    engine.upsert_element(1, slideshow(2), epoch());

    // Entrance 1 s, hold 1 s, exit 1 s.
    engine.tick(at(1_000));
    assert_eq!(engine.evaluate(1).unwrap().phase, AnimationPhase::Hold);
    engine.tick(at(2_000));
    assert_eq!(engine.evaluate(1).unwrap().phase, AnimationPhase::Exit);
    engine.tick(at(3_000));

    let frame = engine.evaluate(1).unwrap();
    assert_eq!(frame.phase, AnimationPhase::Entrance);
    assert_eq!(frame.progress, 0.0);
    assert_eq!(frame.item_index, 1);
}

/// Removed elements lose their state; re-adding starts a fresh cycle.
#[test]
fn readded_element_starts_from_entrance() {
    let mut engine = engine();
    engine.upsert_element(1, slideshow(2), epoch());
    engine.tick(at(1_500));
    assert_eq!(engine.evaluate(1).unwrap().phase, AnimationPhase::Hold);

    assert!(engine.remove_element(1));
    assert!(!engine.remove_element(1));
    assert!(engine.evaluate(1).is_none());

    engine.upsert_element(1, slideshow(2), at(1_500));
    let frame = engine.evaluate(1).unwrap();
    assert_eq!(frame.phase, AnimationPhase::Entrance);
    assert_eq!(frame.progress, 0.0);
    assert_eq!(frame.item_index, 0);
}

/// `retain_active` is the program-change path: everything else is dropped.
#[test]
fn retain_active_drops_inactive_elements() {
    let mut engine = engine();
    for id in 1..=5 {
        engine.upsert_element(id, slideshow(1), epoch());
    }
    assert_eq!(engine.retain_active([2, 4, 99]), 3);
    assert_eq!(engine.element_ids().collect::<Vec<_>>(), vec![2, 4]);

    engine.clear();
    assert!(engine.is_empty());
    assert!(engine.tick(at(10)).is_empty());
}

/// Keyframe properties follow the element's local clock.
#[test]
fn frames_carry_keyframe_properties() {
    let keyframe_props = |value: f64| {
        let mut map = PropertyMap::new();
        map.insert("x".to_string(), PropertyValue::Number(value));
        map
    };
    let track = KeyframeTrack::from_keyframes([
        Keyframe::new(0.0, keyframe_props(0.0), EasingKind::Linear).unwrap(),
        Keyframe::new(2.0, keyframe_props(10.0), EasingKind::Linear).unwrap(),
    ]);
    let mut engine = engine();
    engine.upsert_element(
        8,
        ElementSpec {
            keyframes: Some(track),
            ..slideshow(1)
        },
        at(5_000),
    );

    let frames = engine.tick(at(6_000));
    let properties = frames[0].properties.as_ref().unwrap();
    assert_eq!(properties["x"], PropertyValue::Number(5.0));

    engine.tick(at(9_000));
    let properties = engine.evaluate(8).unwrap().properties.unwrap();
    assert_eq!(properties["x"], PropertyValue::Number(10.0));
}

/// Countdown text reaches zero and stays there.
#[test]
fn timing_text_counts_down() {
    let spec = TimingSpec {
        mode: TimingMode::CountDown {
            target: at(90_000),
        },
        format: TimingFormat {
            minutes: true,
            seconds: true,
            ..TimingFormat::none()
        },
        prefix: String::new(),
        suffix: String::new(),
    };
    let mut engine = engine();
    engine.upsert_element(
        4,
        ElementSpec {
            timing: Some(spec),
            ..ElementSpec::default()
        },
        epoch(),
    );

    assert_eq!(engine.timing_text(4, epoch()).as_deref(), Some("1M 30S"));
    assert_eq!(engine.timing_text(4, at(91_000)).as_deref(), Some("0S"));
    assert_eq!(engine.timing_text(99, epoch()), None);
}

/// Fixed periods are anchored per element and re-anchored when the period changes.
#[test]
fn fixed_timing_anchor_follows_period() {
    let fixed = |period_seconds| ElementSpec {
        timing: Some(TimingSpec {
            mode: TimingMode::FixedTime {
                period_seconds,
                repeat: false,
            },
            format: TimingFormat::default(),
            prefix: "Next show".into(),
            suffix: String::new(),
        }),
        ..ElementSpec::default()
    };
    let mut engine = engine();
    engine.upsert_element(6, fixed(3_600), epoch());

    assert_eq!(engine.timing_text(6, epoch()).as_deref(), Some("Next show 01:00:00"));
    assert_eq!(engine.timing_text(6, at(61_000)).as_deref(), Some("Next show 00:58:59"));

    engine.upsert_element(6, fixed(90), at(61_000));
    assert_eq!(engine.timing_text(6, at(71_000)).as_deref(), Some("Next show 00:01:30"));
    assert_eq!(engine.timing_anchor(6).unwrap().anchor_start, at(71_000));
}
