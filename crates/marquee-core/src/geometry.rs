//! # Effect Geometry
//!
//! The mapping a renderer applies to turn `(effect, phase, progress)` into
//! drawable geometry. Kept here as a pure function so every renderer shares
//! the same table; nothing in this module touches a surface.

use crate::effects::EffectName;
use crate::frame::{AnimationPhase, PresentationFrame};
use crate::types::Rect;
use serde::Serialize;

/// Number of slats used by the blinds effects.
pub const BLIND_COUNT: usize = 8;

/// How to draw an element for one frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EffectGeometry {
    /// Translation applied to the content, in pixels.
    pub offset: (f64, f64),
    /// Visible regions in screen pixels. Content outside every clip is hidden.
    pub clips: Vec<Rect>,
    pub opacity: f64,
    /// Whether the element area is cleared once the exit completes.
    pub clear_after_exit: bool,
}

impl EffectGeometry {
    fn full(rect: Rect) -> Self {
        Self {
            offset: (0.0, 0.0),
            clips: vec![rect],
            opacity: 1.0,
            clear_after_exit: true,
        }
    }
}

/// Geometry for a presentation frame inside `rect`.
pub fn frame_geometry(frame: &PresentationFrame, rect: Rect) -> EffectGeometry {
    effect_geometry(frame.resolved_effect, frame.phase, frame.progress, rect)
}

/// Geometry for `effect` at `progress` during `phase`.
///
/// Coverage is `progress` while entering, `1 - progress` while exiting and
/// full while holding. Moves slide in from the side opposite their direction
/// and slide out along it.
pub fn effect_geometry(
    effect: EffectName,
    phase: AnimationPhase,
    progress: f64,
    rect: Rect,
) -> EffectGeometry {
    let p = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
    let coverage = match phase {
        AnimationPhase::Entrance => p,
        AnimationPhase::Hold => 1.0,
        AnimationPhase::Exit => 1.0 - p,
    };
    let (w, h) = (rect.width, rect.height);
    let mut geometry = EffectGeometry::full(rect);

    match effect {
        EffectName::ImmediateShowClear => {
            if phase == AnimationPhase::Exit && p > 0.0 {
                geometry.opacity = 0.0;
            }
        }
        EffectName::MoveLeft
        | EffectName::MoveRight
        | EffectName::MoveUp
        | EffectName::MoveDown => {
            // Unit vector of travel.
            let (ux, uy) = match effect {
                EffectName::MoveLeft => (-1.0, 0.0),
                EffectName::MoveRight => (1.0, 0.0),
                EffectName::MoveUp => (0.0, -1.0),
                _ => (0.0, 1.0),
            };
            let distance = match phase {
                AnimationPhase::Entrance => -(1.0 - p),
                AnimationPhase::Hold => 0.0,
                AnimationPhase::Exit => p,
            };
            geometry.offset = (ux * distance * w, uy * distance * h);
        }
        EffectName::CoverLeft => {
            geometry.clips = vec![Rect::new(rect.x, rect.y, coverage * w, h)];
        }
        EffectName::CoverRight => {
            geometry.clips = vec![Rect::new(rect.right() - coverage * w, rect.y, coverage * w, h)];
        }
        EffectName::CoverUp => {
            geometry.clips = vec![Rect::new(rect.x, rect.bottom() - coverage * h, w, coverage * h)];
        }
        EffectName::CoverDown => {
            geometry.clips = vec![Rect::new(rect.x, rect.y, w, coverage * h)];
        }
        EffectName::TopLeftCover => {
            geometry.clips = vec![Rect::new(rect.x, rect.y, coverage * w, coverage * h)];
        }
        EffectName::TopRightCover => {
            geometry.clips = vec![Rect::new(
                rect.right() - coverage * w,
                rect.y,
                coverage * w,
                coverage * h,
            )];
        }
        EffectName::BottomLeftCover => {
            geometry.clips = vec![Rect::new(
                rect.x,
                rect.bottom() - coverage * h,
                coverage * w,
                coverage * h,
            )];
        }
        EffectName::BottomRightCover => {
            geometry.clips = vec![Rect::new(
                rect.right() - coverage * w,
                rect.bottom() - coverage * h,
                coverage * w,
                coverage * h,
            )];
        }
        EffectName::OpenFromMiddle => {
            let visible = coverage * w;
            geometry.clips = vec![Rect::new(rect.x + (w - visible) / 2.0, rect.y, visible, h)];
        }
        EffectName::UpDownOpen => {
            let visible = coverage * h;
            geometry.clips = vec![Rect::new(rect.x, rect.y + (h - visible) / 2.0, w, visible)];
        }
        EffectName::CloseFromMiddle => {
            let half = coverage * w / 2.0;
            geometry.clips = vec![
                Rect::new(rect.x, rect.y, half, h),
                Rect::new(rect.right() - half, rect.y, half, h),
            ];
        }
        EffectName::UpDownClose => {
            let half = coverage * h / 2.0;
            geometry.clips = vec![
                Rect::new(rect.x, rect.y, w, half),
                Rect::new(rect.x, rect.bottom() - half, w, half),
            ];
        }
        EffectName::GradualChange => {
            geometry.opacity = coverage;
        }
        EffectName::VerticalBlinds => {
            let slat = w / BLIND_COUNT as f64;
            geometry.clips = (0..BLIND_COUNT)
                .map(|i| Rect::new(rect.x + i as f64 * slat, rect.y, coverage * slat, h))
                .collect();
        }
        EffectName::HorizontalBlinds => {
            let slat = h / BLIND_COUNT as f64;
            geometry.clips = (0..BLIND_COUNT)
                .map(|i| Rect::new(rect.x, rect.y + i as f64 * slat, w, coverage * slat))
                .collect();
        }
        EffectName::Twinkle => {
            geometry.opacity = twinkle_opacity(p);
        }
        EffectName::ContinuousMoveLeft => {
            geometry.offset = ((1.0 - 2.0 * p) * w, 0.0);
        }
        EffectName::ContinuousMoveRight => {
            geometry.offset = (-(1.0 - 2.0 * p) * w, 0.0);
        }
        EffectName::DontClearScreen => {
            geometry.clear_after_exit = false;
        }
    }
    geometry
}

/// Triangle wave between 0.5 and 1.0, two full blinks per phase.
pub fn twinkle_opacity(progress: f64) -> f64 {
    0.5 + 0.5 * (((progress * 4.0) % 2.0) - 1.0).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECT: Rect = Rect::new(10.0, 20.0, 200.0, 100.0);

    #[test]
    fn hold_is_fully_visible_for_once_through_effects() {
        for effect in EffectName::ALL {
            if effect == EffectName::Twinkle || effect.is_continuous() {
                continue;
            }
            let g = effect_geometry(effect, AnimationPhase::Hold, 1.0, RECT);
            assert_eq!(g.offset, (0.0, 0.0), "{effect}");
            assert_eq!(g.opacity, 1.0, "{effect}");
            let area: f64 = g.clips.iter().map(|c| c.width * c.height).sum();
            assert!((area - RECT.width * RECT.height).abs() < 1e-9, "{effect}");
        }
    }

    #[test]
    fn dont_clear_keeps_content() {
        let g = effect_geometry(EffectName::DontClearScreen, AnimationPhase::Exit, 0.7, RECT);
        assert!(!g.clear_after_exit);
        assert_eq!(g.opacity, 1.0);
    }

    #[test]
    fn progress_is_clamped() {
        let g = effect_geometry(EffectName::CoverLeft, AnimationPhase::Entrance, 1.7, RECT);
        assert_eq!(g.clips[0].width, 200.0);
        let g = effect_geometry(EffectName::CoverLeft, AnimationPhase::Entrance, f64::NAN, RECT);
        assert_eq!(g.clips[0].width, 0.0);
    }
}
