//! # Marquee Core
//!
//! `marquee-core` is the presentation animation engine behind LED signage programs.
//!
//! It decides, for every visible content element, which entrance/hold/exit state the
//! element is in at a given instant, independent of how it is painted. All results are
//! deterministic for a given sequence of timestamps and RNG seed.
//!
//! ## Core Features
//!
//! *   **Keyframes**: Property tracks with five easing curves built on
//!     [`keyframe`](https://crates.io/crates/keyframe).
//! *   **Effects**: A closed catalog of 24 transitions with random selection per cycle.
//! *   **Controllers**: A three-phase state machine per element with slideshow advancement.
//! *   **Timing**: Count-up, countdown and anchored fixed-period arithmetic.
//! *   **Geometry**: The effect → clip/offset/opacity table shared by renderers.
//!
//! ## Usage
//!
//! ```rust
//! use marquee_core::{ElementSpec, EngineConfig, PresentationEngine};
//! use chrono::Utc;
//!
//! let now = Utc::now();
//! let mut engine = PresentationEngine::new(EngineConfig { seed: Some(7), ..Default::default() });
//! engine.upsert_element(1, ElementSpec { item_count: 3, ..Default::default() }, now);
//! let frames = engine.tick(now);
//! assert_eq!(frames.len(), 1);
//! ```

/// Easing curves, property values and interpolation.
pub mod animation;

/// Ordered keyframe tracks.
pub mod keyframe;

/// The effect catalog, random pools and speed mapping.
pub mod effects;

/// Per-tick output handed to renderers.
pub mod frame;

/// The per-element entrance/hold/exit state machine.
pub mod controller;

/// Countdown, count-up and fixed-period timing.
pub mod timing;

/// Effect geometry shared by renderers.
pub mod geometry;

/// Registry of active elements and the tick loop.
pub mod engine;

pub mod errors;
pub mod types;

pub use animation::{blend, blend_maps, EasingKind, PropertyMap, PropertyValue};
pub use controller::{AnimationConfig, AnimationState, ElementAnimationController};
pub use effects::{EffectName, EffectRole, EffectSelection};
pub use engine::{ElementSpec, EngineConfig, PresentationEngine};
pub use errors::{EngineError, EngineResult};
pub use frame::{AnimationPhase, PresentationFrame};
pub use geometry::{effect_geometry, frame_geometry, EffectGeometry};
pub use keyframe::{Keyframe, KeyframeTrack};
pub use timing::{TimingAnchor, TimingCalculator, TimingFormat, TimingMode, TimingSpec};
pub use types::{ElementId, ElementKind, Rect, Timestamp};
