use crate::animation::PropertyMap;
use crate::effects::EffectName;
use crate::types::ElementId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three phases of an element's animation cycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationPhase {
    #[default]
    Entrance,
    Hold,
    Exit,
}

impl fmt::Display for AnimationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnimationPhase::Entrance => "entrance",
            AnimationPhase::Hold => "hold",
            AnimationPhase::Exit => "exit",
        };
        f.write_str(name)
    }
}

/// Read-only result handed to the renderer for one element on one tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PresentationFrame {
    pub element_id: ElementId,
    pub phase: AnimationPhase,
    /// Normalized phase progress, always within `[0, 1]`.
    pub progress: f64,
    /// Concrete effect for the current phase, after `Random` has been collapsed.
    pub resolved_effect: EffectName,
    /// Slideshow item currently on screen.
    pub item_index: usize,
    /// Interpolated keyframe properties for keyframe-driven elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<PropertyMap>,
}

impl PresentationFrame {
    /// Frame for content that is fully on screen with no transition running.
    pub fn steady(element_id: ElementId, effect: EffectName, item_index: usize) -> Self {
        Self {
            element_id,
            phase: AnimationPhase::Hold,
            progress: 1.0,
            resolved_effect: effect,
            item_index,
            properties: None,
        }
    }
}
