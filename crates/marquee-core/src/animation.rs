//! # Animation Module
//!
//! Easing curves and the property interpolator used by keyframe tracks.
//!
//! ## Key Types
//! - `EasingKind`: The five supported easing curves, usable anywhere a
//!   `keyframe::EasingFunction` is expected.
//! - `PropertyValue`: A numeric or opaque animated value, implementing
//!   `keyframe::CanTween`.
//! - `PropertyMap`: Named property snapshot carried by a keyframe.

use crate::errors::EngineError;
use keyframe::{CanTween, EasingFunction};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Supported easing functions for keyframe interpolation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingKind {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    /// Holds the starting value for the whole segment.
    Step,
}

impl EasingFunction for EasingKind {
    fn y(&self, x: f64) -> f64 {
        match self {
            EasingKind::Linear => x,
            EasingKind::EaseIn => x * x,
            EasingKind::EaseOut => 1.0 - (1.0 - x) * (1.0 - x),
            EasingKind::EaseInOut => {
                if x < 0.5 {
                    2.0 * x * x
                } else {
                    1.0 - 2.0 * (1.0 - x) * (1.0 - x)
                }
            }
            EasingKind::Step => 0.0,
        }
    }
}

impl EasingKind {
    pub const ALL: [EasingKind; 5] = [
        EasingKind::Linear,
        EasingKind::EaseIn,
        EasingKind::EaseOut,
        EasingKind::EaseInOut,
        EasingKind::Step,
    ];

    /// Reshapes a normalized progress value. Input is clamped to `[0, 1]`
    /// and NaN is treated as `0`.
    pub fn apply(&self, t: f64) -> f64 {
        self.y(clamp_unit(t))
    }

    /// Persisted name of this curve.
    pub fn as_str(&self) -> &'static str {
        match self {
            EasingKind::Linear => "linear",
            EasingKind::EaseIn => "ease_in",
            EasingKind::EaseOut => "ease_out",
            EasingKind::EaseInOut => "ease_in_out",
            EasingKind::Step => "step",
        }
    }

    /// Parses a persisted interpolation name, failing closed to `Linear`.
    pub fn parse_lenient(name: &str) -> EasingKind {
        name.parse().unwrap_or_else(|_| {
            warn!(interpolation = name, "unknown interpolation name, using linear");
            EasingKind::Linear
        })
    }
}

impl FromStr for EasingKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "linear" => Ok(EasingKind::Linear),
            "easein" => Ok(EasingKind::EaseIn),
            "easeout" => Ok(EasingKind::EaseOut),
            "easeinout" => Ok(EasingKind::EaseInOut),
            "step" => Ok(EasingKind::Step),
            _ => Err(EngineError::UnknownEasing(s.to_string())),
        }
    }
}

impl fmt::Display for EasingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single animated property value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Interpolated linearly, then reshaped by the easing curve.
    Number(f64),
    /// Flips from `before` to `after` once eased progress reaches `0.5`.
    Opaque(String),
}

impl PropertyValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            PropertyValue::Opaque(_) => None,
        }
    }
}

impl Default for PropertyValue {
    fn default() -> Self {
        PropertyValue::Number(0.0)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Opaque(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Opaque(value)
    }
}

impl CanTween for PropertyValue {
    fn ease(from: Self, to: Self, time: impl keyframe::num_traits::Float) -> Self {
        let t = time.to_f64().unwrap_or(0.0);
        match (from, to) {
            (PropertyValue::Number(a), PropertyValue::Number(b)) => {
                // Exact endpoints, `a + (b - a) * 1.0` is not always `b`.
                if t <= 0.0 {
                    PropertyValue::Number(a)
                } else if t >= 1.0 {
                    PropertyValue::Number(b)
                } else {
                    PropertyValue::Number(a + (b - a) * t)
                }
            }
            (from, to) => {
                if t < 0.5 {
                    from
                } else {
                    to
                }
            }
        }
    }
}

/// Named property snapshot. Ordered so resolved frames serialize deterministically.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// Blends two property values at normalized time `t` under `easing`.
pub fn blend(
    before: &PropertyValue,
    after: &PropertyValue,
    t: f64,
    easing: EasingKind,
) -> PropertyValue {
    PropertyValue::ease(before.clone(), after.clone(), easing.apply(t))
}

/// Blends the union of two property maps key by key.
///
/// A key present on only one side is returned unblended.
pub fn blend_maps(
    before: &PropertyMap,
    after: &PropertyMap,
    t: f64,
    easing: EasingKind,
) -> PropertyMap {
    let mut out = PropertyMap::new();
    for (key, a) in before {
        let value = match after.get(key) {
            Some(b) => blend(a, b, t, easing),
            None => a.clone(),
        };
        out.insert(key.clone(), value);
    }
    for (key, b) in after {
        if !before.contains_key(key) {
            out.insert(key.clone(), b.clone());
        }
    }
    out
}

pub(crate) fn clamp_unit(t: f64) -> f64 {
    if t.is_nan() {
        0.0
    } else {
        t.clamp(0.0, 1.0)
    }
}
