//! Program JSON Tests
//!
//! Parses programs written the way the program editor stores them, including
//! legacy effect labels, textual speed codes and timing elements.

use chrono::{TimeZone, Utc};
use marquee_core::{EffectName, EffectSelection, ElementKind, TimingMode};
use marquee_schema::ProgramRequest;

const LOBBY: &str = r#"{
  "name": "Lobby",
  "width": 256,
  "height": 64,
  "engine": { "seed": 42 },
  "elements": [
    {
      "id": 10,
      "type": "photo",
      "rect": { "x": 0, "y": 0, "width": 128, "height": 64 },
      "entrance": "Move Left",
      "exit": "Immediate Clear",
      "entrance_speed": "3",
      "exit_speed": "fast",
      "hold_seconds": 5,
      "items": ["a.jpg", "b.jpg", "c.jpg"]
    },
    {
      "id": 11,
      "type": "text",
      "entrance": "random",
      "exit": "no-such-effect",
      "entrance_speed": 2,
      "items": ["Welcome"],
      "keyframes": [
        { "time": 2, "properties": { "x": 10 } },
        { "time": 0, "properties": { "x": 0 }, "interpolation": "EaseOut" }
      ]
    },
    {
      "id": 12,
      "type": "timing",
      "timing": {
        "mode": "count_down",
        "target": "2025-01-01T00:00:00Z",
        "format": { "days": true, "hours": true, "minutes": false, "seconds": false },
        "prefix": "New year in"
      }
    }
  ]
}"#;

#[test]
fn parses_editor_program() {
    let program = ProgramRequest::from_json(LOBBY).expect("lobby program should parse");
    assert_eq!(program.engine.seed, Some(42));
    assert_eq!(program.engine.tick_interval_ms, 33, "tick interval should default");
    assert_eq!(program.elements.len(), 3);

    let photo = program.elements[0].animation_config();
    assert_eq!(photo.entrance, EffectSelection::Fixed(EffectName::MoveLeft));
    assert_eq!(photo.exit, EffectSelection::Fixed(EffectName::ImmediateShowClear));
    assert_eq!(photo.entrance_speed, Some(3));
    assert_eq!(photo.exit_speed, None, "malformed speed should be dropped");
    assert_eq!(photo.hold_seconds, 5.0);
    assert_eq!(program.elements[0].item_count(), 3);
}

#[test]
fn unknown_effects_fall_back_and_keyframes_sort() {
    let program = ProgramRequest::from_json(LOBBY).unwrap();
    let text = &program.elements[1];
    assert_eq!(text.kind, ElementKind::Text);
    assert_eq!(text.entrance, EffectSelection::Random);
    assert_eq!(text.exit, EffectSelection::Fixed(EffectName::ImmediateShowClear));

    let track = text.keyframe_track().unwrap().expect("text element has keyframes");
    let times: Vec<f64> = track.keyframes().iter().map(|k| k.time()).collect();
    assert_eq!(times, vec![0.0, 2.0]);
}

#[test]
fn timing_element_round_trips() {
    let program = ProgramRequest::from_json(LOBBY).unwrap();
    let timing = program.elements[2].timing.clone().expect("timing spec");
    assert_eq!(
        timing.mode,
        TimingMode::CountDown {
            target: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        }
    );
    assert!(timing.format.days && !timing.format.minutes);
    assert_eq!(timing.prefix, "New year in");
    assert_eq!(program.elements[2].item_count(), 1);

    let json = serde_json::to_string(&program).unwrap();
    let again = ProgramRequest::from_json(&json).unwrap();
    assert_eq!(again.elements[2].timing, Some(timing));
}
