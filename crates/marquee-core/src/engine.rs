//! # Presentation Engine
//!
//! Owns the animation state of every active element, keyed by element id.
//!
//! ## Responsibilities
//! - **Ticking**: advances every element from one shared `now` per tick.
//! - **Lifecycle**: removal (`remove_element`, `retain_active`, or `clear` on a
//!   program switch) drops animation state and timing anchors immediately.
//! - **Evaluation**: serves the latest frame per element, with keyframe
//!   properties resolved at the element's local time.
//! - **Timing text**: evaluates timing elements against their anchors.

use crate::animation::PropertyMap;
use crate::controller::{AnimationConfig, AnimationState, ElementAnimationController};
use crate::errors::{EngineError, EngineResult};
use crate::frame::PresentationFrame;
use crate::keyframe::KeyframeTrack;
use crate::timing::{TimingAnchor, TimingCalculator, TimingSpec};
use crate::types::{elapsed_between, ElementId, Timestamp};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;
use tracing::{debug, instrument};

/// Engine-wide settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Interval of the animation ticker in milliseconds.
    pub tick_interval_ms: u64,
    /// Seed for random effect selection. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 33,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

/// Everything the engine needs to animate one element.
#[derive(Clone, Debug, Default)]
pub struct ElementSpec {
    pub animation: AnimationConfig,
    /// Length of the slideshow item list (photos, videos, text pages).
    pub item_count: usize,
    pub keyframes: Option<KeyframeTrack>,
    pub timing: Option<TimingSpec>,
}

#[derive(Debug)]
struct ElementSlot {
    spec: ElementSpec,
    controller: ElementAnimationController,
    activated_at: Timestamp,
    timing_anchor: Option<TimingAnchor>,
    last_frame: Option<PresentationFrame>,
}

impl ElementSlot {
    fn new(id: ElementId, spec: ElementSpec, now: Timestamp) -> Self {
        Self {
            spec,
            controller: ElementAnimationController::new(id, now),
            activated_at: now,
            timing_anchor: None,
            last_frame: None,
        }
    }

    fn properties_at(&self, now: Timestamp) -> Option<PropertyMap> {
        self.spec
            .keyframes
            .as_ref()
            .map(|track| track.resolve(elapsed_between(self.activated_at, now).as_secs_f64()))
    }
}

/// Drives every visible element of the active program.
#[derive(Debug)]
pub struct PresentationEngine {
    config: EngineConfig,
    // Ordered so random draws happen in a reproducible order.
    elements: BTreeMap<ElementId, ElementSlot>,
    rng: StdRng,
    last_tick: Option<Timestamp>,
}

impl PresentationEngine {
    pub fn new(config: EngineConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            elements: BTreeMap::new(),
            rng,
            last_tick: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn element_ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.elements.keys().copied()
    }

    /// Timestamp of the most recent tick.
    pub fn last_tick(&self) -> Option<Timestamp> {
        self.last_tick
    }

    /// Adds an element, or replaces the settings of an existing one without
    /// restarting its cycle (an in-program edit). Returns `true` when the element
    /// is new. Program switches go through [`Self::clear`] first.
    pub fn upsert_element(&mut self, id: ElementId, spec: ElementSpec, now: Timestamp) -> bool {
        match self.elements.get_mut(&id) {
            Some(slot) => {
                slot.spec = spec;
                false
            }
            None => {
                debug!(element = id, "element activated");
                let mut slot = ElementSlot::new(id, spec, now);
                slot.controller.prime(&slot.spec.animation, &mut self.rng);
                self.elements.insert(id, slot);
                true
            }
        }
    }

    pub fn update_animation(
        &mut self,
        id: ElementId,
        animation: AnimationConfig,
    ) -> EngineResult<()> {
        let slot = self.slot_mut(id)?;
        slot.spec.animation = animation;
        Ok(())
    }

    pub fn set_item_count(&mut self, id: ElementId, item_count: usize) -> EngineResult<()> {
        let slot = self.slot_mut(id)?;
        slot.spec.item_count = item_count;
        Ok(())
    }

    pub fn set_keyframes(
        &mut self,
        id: ElementId,
        track: Option<KeyframeTrack>,
    ) -> EngineResult<()> {
        let slot = self.slot_mut(id)?;
        slot.spec.keyframes = track;
        Ok(())
    }

    /// Drops the element and all of its state. Returns whether it was present.
    pub fn remove_element(&mut self, id: ElementId) -> bool {
        let removed = self.elements.remove(&id).is_some();
        if removed {
            debug!(element = id, "element deactivated");
        }
        removed
    }

    /// Keeps only the elements in `active`, dropping the rest. Returns how many were dropped.
    pub fn retain_active(&mut self, active: impl IntoIterator<Item = ElementId>) -> usize {
        let keep: HashSet<ElementId> = active.into_iter().collect();
        let before = self.elements.len();
        self.elements.retain(|id, _| keep.contains(id));
        let dropped = before - self.elements.len();
        if dropped > 0 {
            debug!(dropped, "inactive elements dropped");
        }
        dropped
    }

    /// Drops every element, e.g. when the program switches.
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Advances every element to `now` and returns their frames in id order.
    #[instrument(level = "debug", skip(self), fields(elements = self.elements.len()))]
    pub fn tick(&mut self, now: Timestamp) -> Vec<PresentationFrame> {
        self.last_tick = Some(now);
        let rng = &mut self.rng;
        self.elements
            .values_mut()
            .map(|slot| {
                let mut frame = slot
                    .controller
                    .advance(now, &slot.spec.animation, slot.spec.item_count, &mut *rng);
                frame.properties = slot.properties_at(now);
                slot.last_frame = Some(frame.clone());
                frame
            })
            .collect()
    }

    /// Latest frame for `id`; elements not yet ticked report their initial frame.
    pub fn evaluate(&self, id: ElementId) -> Option<PresentationFrame> {
        let slot = self.elements.get(&id)?;
        slot.last_frame.clone().or_else(|| {
            let mut frame = slot
                .controller
                .frame(&slot.spec.animation, slot.spec.item_count);
            frame.properties = slot.properties_at(slot.activated_at);
            Some(frame)
        })
    }

    pub fn state(&self, id: ElementId) -> Option<&AnimationState> {
        self.elements.get(&id)?.controller.state()
    }

    /// Display text of a timing element at `now`, or `None` if `id` has no timing spec.
    pub fn timing_text(&mut self, id: ElementId, now: Timestamp) -> Option<String> {
        let slot = self.elements.get_mut(&id)?;
        let spec = slot.spec.timing.as_ref()?;
        Some(TimingCalculator::render(spec, now, &mut slot.timing_anchor))
    }

    pub fn timing_anchor(&self, id: ElementId) -> Option<TimingAnchor> {
        self.elements.get(&id)?.timing_anchor
    }

    fn slot_mut(&mut self, id: ElementId) -> EngineResult<&mut ElementSlot> {
        self.elements
            .get_mut(&id)
            .ok_or(EngineError::UnknownElement(id))
    }
}

impl Default for PresentationEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
