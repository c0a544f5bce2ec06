//! # Effect Catalog
//!
//! Closed registry of the named entrance/exit transitions an element can use.
//!
//! ## Responsibilities
//! - **Names**: `EffectName` with stable persisted labels and accepted aliases.
//! - **Selection**: `EffectSelection` is either a concrete effect or the `Random` selector.
//! - **Catalogs**: which effects are valid as entrance, exit, or random candidates.
//! - **Speed**: mapping from speed codes to phase durations.

use crate::errors::EngineError;
use crate::types::ElementKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Base duration of an entrance or exit phase before the speed multiplier is applied.
pub const BASE_PHASE_DURATION: Duration = Duration::from_millis(1000);

/// Multiplier used when a speed code is missing or malformed.
pub const DEFAULT_SPEED_MULTIPLIER: f64 = 0.9;

/// A concrete transition effect.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectName {
    /// Show instantly on entrance, clear instantly on exit.
    ImmediateShowClear,
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    CoverLeft,
    CoverRight,
    CoverUp,
    CoverDown,
    TopLeftCover,
    TopRightCover,
    BottomLeftCover,
    BottomRightCover,
    OpenFromMiddle,
    UpDownOpen,
    CloseFromMiddle,
    UpDownClose,
    GradualChange,
    VerticalBlinds,
    HorizontalBlinds,
    Twinkle,
    /// Marquee scroll, text elements only.
    ContinuousMoveLeft,
    /// Marquee scroll, text elements only.
    ContinuousMoveRight,
    /// Exit only: leaves the last frame on screen.
    DontClearScreen,
}

/// Whether an effect is being used to bring content in or take it away.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EffectRole {
    Entrance,
    Exit,
}

const ONCE_THROUGH_RANDOM: [EffectName; 20] = [
    EffectName::MoveLeft,
    EffectName::MoveRight,
    EffectName::MoveUp,
    EffectName::MoveDown,
    EffectName::CoverLeft,
    EffectName::CoverRight,
    EffectName::CoverUp,
    EffectName::CoverDown,
    EffectName::TopLeftCover,
    EffectName::TopRightCover,
    EffectName::BottomLeftCover,
    EffectName::BottomRightCover,
    EffectName::OpenFromMiddle,
    EffectName::UpDownOpen,
    EffectName::CloseFromMiddle,
    EffectName::UpDownClose,
    EffectName::GradualChange,
    EffectName::VerticalBlinds,
    EffectName::HorizontalBlinds,
    EffectName::Twinkle,
];

const TEXT_RANDOM: [EffectName; 22] = [
    EffectName::MoveLeft,
    EffectName::MoveRight,
    EffectName::MoveUp,
    EffectName::MoveDown,
    EffectName::CoverLeft,
    EffectName::CoverRight,
    EffectName::CoverUp,
    EffectName::CoverDown,
    EffectName::TopLeftCover,
    EffectName::TopRightCover,
    EffectName::BottomLeftCover,
    EffectName::BottomRightCover,
    EffectName::OpenFromMiddle,
    EffectName::UpDownOpen,
    EffectName::CloseFromMiddle,
    EffectName::UpDownClose,
    EffectName::GradualChange,
    EffectName::VerticalBlinds,
    EffectName::HorizontalBlinds,
    EffectName::Twinkle,
    EffectName::ContinuousMoveLeft,
    EffectName::ContinuousMoveRight,
];

impl EffectName {
    pub const ALL: [EffectName; 24] = [
        EffectName::ImmediateShowClear,
        EffectName::MoveLeft,
        EffectName::MoveRight,
        EffectName::MoveUp,
        EffectName::MoveDown,
        EffectName::CoverLeft,
        EffectName::CoverRight,
        EffectName::CoverUp,
        EffectName::CoverDown,
        EffectName::TopLeftCover,
        EffectName::TopRightCover,
        EffectName::BottomLeftCover,
        EffectName::BottomRightCover,
        EffectName::OpenFromMiddle,
        EffectName::UpDownOpen,
        EffectName::CloseFromMiddle,
        EffectName::UpDownClose,
        EffectName::GradualChange,
        EffectName::VerticalBlinds,
        EffectName::HorizontalBlinds,
        EffectName::Twinkle,
        EffectName::ContinuousMoveLeft,
        EffectName::ContinuousMoveRight,
        EffectName::DontClearScreen,
    ];

    /// Stable persisted label.
    pub fn label(self) -> &'static str {
        match self {
            EffectName::ImmediateShowClear => "immediate_show_clear",
            EffectName::MoveLeft => "move_left",
            EffectName::MoveRight => "move_right",
            EffectName::MoveUp => "move_up",
            EffectName::MoveDown => "move_down",
            EffectName::CoverLeft => "cover_left",
            EffectName::CoverRight => "cover_right",
            EffectName::CoverUp => "cover_up",
            EffectName::CoverDown => "cover_down",
            EffectName::TopLeftCover => "top_left_cover",
            EffectName::TopRightCover => "top_right_cover",
            EffectName::BottomLeftCover => "bottom_left_cover",
            EffectName::BottomRightCover => "bottom_right_cover",
            EffectName::OpenFromMiddle => "open_from_middle",
            EffectName::UpDownOpen => "up_down_open",
            EffectName::CloseFromMiddle => "close_from_middle",
            EffectName::UpDownClose => "up_down_close",
            EffectName::GradualChange => "gradual_change",
            EffectName::VerticalBlinds => "vertical_blinds",
            EffectName::HorizontalBlinds => "horizontal_blinds",
            EffectName::Twinkle => "twinkle",
            EffectName::ContinuousMoveLeft => "continuous_move_left",
            EffectName::ContinuousMoveRight => "continuous_move_right",
            EffectName::DontClearScreen => "dont_clear_screen",
        }
    }

    /// Marquee-style effects that loop for the whole phase.
    pub fn is_continuous(self) -> bool {
        matches!(
            self,
            EffectName::ContinuousMoveLeft | EffectName::ContinuousMoveRight
        )
    }

    pub fn is_exit_only(self) -> bool {
        self == EffectName::DontClearScreen
    }

    pub fn is_immediate(self) -> bool {
        self == EffectName::ImmediateShowClear
    }

    /// Whether this effect may be configured in `role`.
    pub fn allowed_in(self, role: EffectRole) -> bool {
        match role {
            EffectRole::Entrance => !self.is_exit_only(),
            EffectRole::Exit => true,
        }
    }

    /// Parses a persisted name, defaulting unknown strings to `ImmediateShowClear`.
    pub fn parse_lenient(name: &str) -> EffectName {
        name.parse().unwrap_or_else(|_| {
            warn!(effect = name, "unknown effect name, using immediate show/clear");
            EffectName::ImmediateShowClear
        })
    }
}

/// Lowercases and strips separators so `"Move Left"`, `"move-left"` and
/// `"MoveLeft"` compare equal.
fn normalize(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl FromStr for EffectName {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize(s);
        let aliased = match key.as_str() {
            "immediateshow" | "immediateclear" | "immediate" => {
                Some(EffectName::ImmediateShowClear)
            }
            "topleft" => Some(EffectName::TopLeftCover),
            "topright" => Some(EffectName::TopRightCover),
            "bottomleft" => Some(EffectName::BottomLeftCover),
            "bottomright" => Some(EffectName::BottomRightCover),
            "fade" | "gradual" => Some(EffectName::GradualChange),
            "dontclear" => Some(EffectName::DontClearScreen),
            _ => None,
        };
        if let Some(effect) = aliased {
            return Ok(effect);
        }
        EffectName::ALL
            .iter()
            .copied()
            .find(|effect| normalize(effect.label()) == key)
            .ok_or_else(|| EngineError::UnknownEffect(s.to_string()))
    }
}

impl fmt::Display for EffectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The configured effect for one role: a concrete effect or the `Random` selector.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EffectSelection {
    Fixed(EffectName),
    /// Resolved to a concrete effect once per cycle.
    Random,
}

impl Default for EffectSelection {
    fn default() -> Self {
        EffectSelection::Fixed(EffectName::ImmediateShowClear)
    }
}

impl EffectSelection {
    pub fn parse_lenient(name: &str) -> EffectSelection {
        if normalize(name) == "random" {
            EffectSelection::Random
        } else {
            EffectSelection::Fixed(EffectName::parse_lenient(name))
        }
    }

    /// The concrete effect, if this is not the `Random` selector.
    pub fn fixed(self) -> Option<EffectName> {
        match self {
            EffectSelection::Fixed(effect) => Some(effect),
            EffectSelection::Random => None,
        }
    }
}

impl From<EffectName> for EffectSelection {
    fn from(effect: EffectName) -> Self {
        EffectSelection::Fixed(effect)
    }
}

impl From<String> for EffectSelection {
    fn from(value: String) -> Self {
        EffectSelection::parse_lenient(&value)
    }
}

impl From<EffectSelection> for String {
    fn from(value: EffectSelection) -> Self {
        match value {
            EffectSelection::Fixed(effect) => effect.label().to_string(),
            EffectSelection::Random => "random".to_string(),
        }
    }
}

/// Effects that may be configured as an entrance.
pub fn entrance_catalog() -> impl Iterator<Item = EffectName> {
    EffectName::ALL
        .into_iter()
        .filter(|e| e.allowed_in(EffectRole::Entrance))
}

/// Effects that may be configured as an exit.
pub fn exit_catalog() -> impl Iterator<Item = EffectName> {
    EffectName::ALL.into_iter()
}

/// Candidates for the `Random` selector.
///
/// Continuous effects are only offered to text elements. The immediate and
/// don't-clear sentinels are never picked at random.
pub fn random_pool(kind: ElementKind) -> &'static [EffectName] {
    if kind.supports_continuous_effects() {
        &TEXT_RANDOM
    } else {
        &ONCE_THROUGH_RANDOM
    }
}

/// `max(0.1, 1 - code * 0.1)`; missing or negative codes map to `0.9`.
pub fn speed_multiplier(code: Option<i64>) -> f64 {
    match code {
        Some(code) if code >= 0 => (1.0 - code.min(100) as f64 * 0.1).max(0.1),
        _ => DEFAULT_SPEED_MULTIPLIER,
    }
}

/// Parses a persisted speed code such as `"3"`; anything else is treated as missing.
pub fn parse_speed_code(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|code| *code >= 0)
}

/// Length of an entrance or exit phase using `effect` at speed `code`.
pub fn phase_duration(effect: EffectName, code: Option<i64>) -> Duration {
    if effect.is_immediate() {
        return Duration::ZERO;
    }
    BASE_PHASE_DURATION.div_f64(speed_multiplier(code))
}
