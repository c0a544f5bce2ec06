//! # Element Animation Controller
//!
//! Per-element entrance → hold → exit state machine.
//!
//! ## Responsibilities
//! - **Phase timing**: converts speed codes and hold seconds into phase lengths.
//! - **Random effects**: collapses `Random` selectors once per cycle and caches the result.
//! - **Slideshows**: advances the item index each time a cycle completes.
//! - **Immediate bypass**: an immediate show/clear pair skips the machine entirely.

use crate::animation::clamp_unit;
use crate::effects::{phase_duration, random_pool, EffectName, EffectSelection};
use crate::frame::{AnimationPhase, PresentationFrame};
use crate::types::{elapsed_between, ElementId, ElementKind, Timestamp};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Per-element animation settings, read fresh on every tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    #[serde(default)]
    pub entrance: EffectSelection,
    #[serde(default)]
    pub exit: EffectSelection,
    #[serde(default)]
    pub entrance_speed: Option<i64>,
    #[serde(default)]
    pub exit_speed: Option<i64>,
    #[serde(default)]
    pub hold_seconds: f64,
    #[serde(default)]
    pub kind: ElementKind,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            entrance: EffectSelection::default(),
            exit: EffectSelection::default(),
            entrance_speed: None,
            exit_speed: None,
            hold_seconds: 0.0,
            kind: ElementKind::default(),
        }
    }
}

impl AnimationConfig {
    /// Immediate show paired with immediate clear: the element is simply shown.
    pub fn is_immediate_pair(&self) -> bool {
        self.entrance == EffectSelection::Fixed(EffectName::ImmediateShowClear)
            && self.exit == EffectSelection::Fixed(EffectName::ImmediateShowClear)
    }

    /// Hold length; negative and NaN values collapse to zero. `None` holds forever.
    pub fn hold_duration(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.hold_seconds.max(0.0)).ok()
    }
}

/// Mutable animation state of one visible element.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationState {
    pub phase: AnimationPhase,
    pub progress: f64,
    /// Time spent in the current phase.
    pub elapsed: Duration,
    pub cycle_start: Timestamp,
    pub current_item_index: usize,
    pub selected_entrance: Option<EffectName>,
    pub selected_exit: Option<EffectName>,
    pub cycles_completed: u64,
}

impl AnimationState {
    pub fn new(now: Timestamp) -> Self {
        Self {
            phase: AnimationPhase::Entrance,
            progress: 0.0,
            elapsed: Duration::ZERO,
            cycle_start: now,
            current_item_index: 0,
            selected_entrance: None,
            selected_exit: None,
            cycles_completed: 0,
        }
    }
}

/// Drives one element through its animation cycle.
#[derive(Clone, Debug)]
pub struct ElementAnimationController {
    element_id: ElementId,
    /// `None` while the immediate show/clear bypass is active.
    state: Option<AnimationState>,
    clock: Timestamp,
}

impl ElementAnimationController {
    pub fn new(element_id: ElementId, now: Timestamp) -> Self {
        Self {
            element_id,
            state: Some(AnimationState::new(now)),
            clock: now,
        }
    }

    pub fn element_id(&self) -> ElementId {
        self.element_id
    }

    pub fn state(&self) -> Option<&AnimationState> {
        self.state.as_ref()
    }

    /// Time of the last tick seen by this controller.
    pub fn clock(&self) -> Timestamp {
        self.clock
    }

    /// Restarts the cycle from `Entrance` at `now`.
    pub fn reset(&mut self, now: Timestamp) {
        self.state = Some(AnimationState::new(now));
        self.clock = now;
    }

    /// Advances to `now`. Backward clock jumps count as a zero delta.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        now: Timestamp,
        config: &AnimationConfig,
        item_count: usize,
        rng: &mut R,
    ) -> PresentationFrame {
        let dt = elapsed_between(self.clock, now);
        self.clock = now;
        self.step(dt, config, item_count, rng)
    }

    /// Advances by `dt`, moving the controller clock forward by the same amount.
    pub fn advance_by<R: Rng + ?Sized>(
        &mut self,
        dt: Duration,
        config: &AnimationConfig,
        item_count: usize,
        rng: &mut R,
    ) -> PresentationFrame {
        if let Some(clock) = chrono::Duration::from_std(dt)
            .ok()
            .and_then(|delta| self.clock.checked_add_signed(delta))
        {
            self.clock = clock;
        }
        self.step(dt, config, item_count, rng)
    }

    /// Rolls a `Random` entrance ahead of the first tick so the initial frame
    /// names the effect that will actually play.
    pub fn prime<R: Rng + ?Sized>(&mut self, config: &AnimationConfig, rng: &mut R) {
        if config.is_immediate_pair() {
            return;
        }
        if let Some(state) = self.state.as_mut() {
            if state.phase == AnimationPhase::Entrance {
                resolve_entrance(self.element_id, state, config, rng);
            }
        }
    }

    /// Frame for the current state without advancing time.
    ///
    /// A `Random` selector that has not been rolled yet (see [`Self::prime`])
    /// reports `ImmediateShowClear` as a placeholder.
    pub fn frame(&self, config: &AnimationConfig, item_count: usize) -> PresentationFrame {
        match &self.state {
            None => PresentationFrame::steady(self.element_id, EffectName::ImmediateShowClear, 0),
            Some(state) => {
                let resolved_effect = match state.phase {
                    AnimationPhase::Entrance | AnimationPhase::Hold => {
                        config.entrance.fixed().or(state.selected_entrance)
                    }
                    AnimationPhase::Exit => config.exit.fixed().or(state.selected_exit),
                }
                .unwrap_or(EffectName::ImmediateShowClear);
                PresentationFrame {
                    element_id: self.element_id,
                    phase: state.phase,
                    progress: clamp_unit(state.progress),
                    resolved_effect,
                    item_index: if item_count == 0 {
                        0
                    } else {
                        state.current_item_index % item_count
                    },
                    properties: None,
                }
            }
        }
    }

    fn step<R: Rng + ?Sized>(
        &mut self,
        dt: Duration,
        config: &AnimationConfig,
        item_count: usize,
        rng: &mut R,
    ) -> PresentationFrame {
        if config.is_immediate_pair() {
            if self.state.take().is_some() {
                debug!(
                    element = self.element_id,
                    "immediate show/clear pair, dropping animation state"
                );
            }
            return PresentationFrame::steady(self.element_id, EffectName::ImmediateShowClear, 0);
        }

        let now = self.clock;
        let element_id = self.element_id;
        let state = self.state.get_or_insert_with(|| AnimationState::new(now));
        state.elapsed = state.elapsed.saturating_add(dt);

        match state.phase {
            AnimationPhase::Entrance => {
                let entrance = resolve_entrance(element_id, state, config, rng);
                let duration = phase_duration(entrance, config.entrance_speed);
                if state.elapsed >= duration {
                    debug!(element = element_id, effect = %entrance, "entrance complete");
                    state.phase = AnimationPhase::Hold;
                    state.progress = 1.0;
                    state.elapsed = Duration::ZERO;
                } else {
                    state.progress = ratio(state.elapsed, duration);
                }
            }
            AnimationPhase::Hold => {
                state.progress = 1.0;
                let expired = config
                    .hold_duration()
                    .map_or(false, |hold| state.elapsed >= hold);
                if expired {
                    state.elapsed = Duration::ZERO;
                    if resolve_entrance(element_id, state, config, rng).is_immediate() {
                        // Immediately shown content never plays an exit.
                        debug!(
                            element = element_id,
                            "hold expired, exit skipped for immediate show"
                        );
                    } else {
                        let exit = resolve_exit(element_id, state, config, rng);
                        debug!(element = element_id, effect = %exit, "hold complete");
                        state.phase = AnimationPhase::Exit;
                        state.progress = 0.0;
                    }
                }
            }
            AnimationPhase::Exit => {
                if resolve_entrance(element_id, state, config, rng).is_immediate() {
                    state.phase = AnimationPhase::Hold;
                    state.progress = 1.0;
                    state.elapsed = Duration::ZERO;
                } else {
                    let exit = resolve_exit(element_id, state, config, rng);
                    let duration = phase_duration(exit, config.exit_speed);
                    if state.elapsed >= duration {
                        start_next_cycle(element_id, state, now, item_count);
                        resolve_entrance(element_id, state, config, rng);
                    } else {
                        state.progress = ratio(state.elapsed, duration);
                    }
                }
            }
        }

        self.frame(config, item_count)
    }
}

fn ratio(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64()).min(1.0)
}

fn resolve_entrance<R: Rng + ?Sized>(
    element_id: ElementId,
    state: &mut AnimationState,
    config: &AnimationConfig,
    rng: &mut R,
) -> EffectName {
    match config.entrance {
        EffectSelection::Fixed(effect) => effect,
        EffectSelection::Random => *state
            .selected_entrance
            .get_or_insert_with(|| roll(element_id, "entrance", config, rng)),
    }
}

fn resolve_exit<R: Rng + ?Sized>(
    element_id: ElementId,
    state: &mut AnimationState,
    config: &AnimationConfig,
    rng: &mut R,
) -> EffectName {
    match config.exit {
        EffectSelection::Fixed(effect) => effect,
        EffectSelection::Random => *state
            .selected_exit
            .get_or_insert_with(|| roll(element_id, "exit", config, rng)),
    }
}

fn roll<R: Rng + ?Sized>(
    element_id: ElementId,
    role: &str,
    config: &AnimationConfig,
    rng: &mut R,
) -> EffectName {
    let effect = random_pool(config.kind)
        .choose(rng)
        .copied()
        .unwrap_or(EffectName::ImmediateShowClear);
    debug!(element = element_id, role, effect = %effect, "random effect selected");
    effect
}

fn start_next_cycle(
    element_id: ElementId,
    state: &mut AnimationState,
    now: Timestamp,
    item_count: usize,
) {
    state.current_item_index = if item_count == 0 {
        warn!(element = element_id, "cycle completed with an empty item list, index stays at 0");
        0
    } else {
        (state.current_item_index + 1) % item_count
    };
    state.phase = AnimationPhase::Entrance;
    state.progress = 0.0;
    state.elapsed = Duration::ZERO;
    state.selected_entrance = None;
    state.selected_exit = None;
    state.cycles_completed += 1;
    state.cycle_start = now;
    debug!(
        element = element_id,
        item = state.current_item_index,
        cycle = state.cycles_completed,
        "cycle complete"
    );
}
