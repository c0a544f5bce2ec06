//! Keyframe tracks for authoring-timeline animation.
//!
//! A track owns an ordered list of property snapshots and resolves the
//! blended snapshot at any point in time.

use crate::animation::{blend_maps, EasingKind, PropertyMap};
use crate::errors::{EngineError, EngineResult};

/// Times closer than this to a keyframe resolve to that keyframe verbatim.
pub const EXACT_HIT_EPSILON: f64 = 0.001;

/// A timestamped property snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct Keyframe {
    time: f64,
    properties: PropertyMap,
    easing: EasingKind,
}

impl Keyframe {
    /// Creates a keyframe at `time` seconds. The time must be finite and non-negative.
    pub fn new(time: f64, properties: PropertyMap, easing: EasingKind) -> EngineResult<Self> {
        if !time.is_finite() || time < 0.0 {
            return Err(EngineError::InvalidKeyframeTime(time));
        }
        Ok(Self {
            time,
            properties,
            easing,
        })
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    /// Easing applied on the segment that starts at this keyframe.
    pub fn easing(&self) -> EasingKind {
        self.easing
    }
}

/// An ordered collection of keyframes for one element.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyframeTrack {
    keyframes: Vec<Keyframe>,
}

impl KeyframeTrack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a track from keyframes in any order.
    pub fn from_keyframes(keyframes: impl IntoIterator<Item = Keyframe>) -> Self {
        let mut track = Self::new();
        for keyframe in keyframes {
            track.add(keyframe);
        }
        track
    }

    /// Inserts a keyframe, keeping the track sorted by time.
    ///
    /// Keyframes sharing a time are all kept, in insertion order.
    pub fn add(&mut self, keyframe: Keyframe) {
        self.keyframes.push(keyframe);
        // `sort_by` is stable; times are finite so `total_cmp` agrees with `<`.
        self.keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    /// Removes every keyframe within `tolerance` of `time`, returning how many went.
    pub fn remove_near(&mut self, time: f64, tolerance: f64) -> usize {
        let before = self.keyframes.len();
        self.keyframes.retain(|k| (k.time - time).abs() > tolerance);
        before - self.keyframes.len()
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Time of the last keyframe, or `0.0` for an empty track.
    pub fn duration(&self) -> f64 {
        self.keyframes.last().map(|k| k.time).unwrap_or(0.0)
    }

    pub fn clear(&mut self) {
        self.keyframes.clear();
    }

    /// Resolves the property snapshot at time `t` (seconds).
    ///
    /// Before the first and after the last keyframe the nearest keyframe is
    /// returned verbatim; there is no extrapolation.
    pub fn resolve(&self, t: f64) -> PropertyMap {
        let (first, last) = match (self.keyframes.first(), self.keyframes.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return PropertyMap::new(),
        };
        if t.is_nan() || t < first.time {
            return first.properties.clone();
        }
        if t >= last.time {
            return last.properties.clone();
        }

        // First keyframe strictly after `t`; the one before it is the greatest `time <= t`.
        let after_idx = self.keyframes.partition_point(|k| k.time <= t);
        let before = &self.keyframes[after_idx - 1];
        let after = &self.keyframes[after_idx];

        if (t - before.time).abs() < EXACT_HIT_EPSILON {
            return before.properties.clone();
        }

        let span = after.time - before.time;
        if span <= 0.0 {
            return before.properties.clone();
        }
        let progress = (t - before.time) / span;
        blend_maps(&before.properties, &after.properties, progress, before.easing)
    }
}
