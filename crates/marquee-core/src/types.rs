//! # Types Module
//!
//! Shared data types used across the engine.
//!
//! ## Key Types
//! - `ElementId`: Identifier of a content element inside a program.
//! - `Timestamp`: Wall-clock instant supplied by the scheduler.
//! - `ElementKind`: The content type of an element (video, photo, text, ...).
//! - `Rect`: Axis-aligned rectangle in screen pixels.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A unique identifier for a content element within the active program.
pub type ElementId = u64;

/// Instant supplied by the clock source. Wall-clock time is acceptable; the
/// engine clamps backward jumps to a zero delta.
pub type Timestamp = DateTime<Utc>;

/// Non-negative delta between two timestamps.
///
/// Returns `Duration::ZERO` when `later` precedes `earlier`.
pub fn elapsed_between(earlier: Timestamp, later: Timestamp) -> Duration {
    (later - earlier).to_std().unwrap_or(Duration::ZERO)
}

/// The content type of a program element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Video,
    #[default]
    Photo,
    Text,
    Clock,
    Timing,
    Sensor,
    Html,
    Hdmi,
}

impl ElementKind {
    /// Whether marquee-style continuous effects may be used by this element.
    pub fn supports_continuous_effects(&self) -> bool {
        matches!(self, ElementKind::Text)
    }
}

/// Axis-aligned rectangle in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}
