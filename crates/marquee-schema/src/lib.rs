use marquee_core::animation::{EasingKind, PropertyMap, PropertyValue};
use marquee_core::effects::{parse_speed_code, EffectSelection};
use marquee_core::{
    AnimationConfig, ElementId, ElementKind, EngineConfig, EngineError, EngineResult, Keyframe,
    KeyframeTrack, Rect, TimingSpec,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::HashSet;
use tracing::warn;

/// A complete signage program as stored by the program editor.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProgramRequest {
    #[serde(default)]
    pub name: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub elements: Vec<ElementDef>,
}

impl ProgramRequest {
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let request: ProgramRequest = serde_json::from_str(json)?;
        request.validate()?;
        Ok(request)
    }

    /// Rejects programs the engine cannot lay out.
    pub fn validate(&self) -> EngineResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::InvalidProgram(format!(
                "screen size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        let mut seen = HashSet::new();
        for element in &self.elements {
            if !seen.insert(element.id) {
                return Err(EngineError::InvalidProgram(format!(
                    "duplicate element id {}",
                    element.id
                )));
            }
        }
        Ok(())
    }

    pub fn screen(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

/// Speed code as persisted: older programs store it as text.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum SpeedValue {
    Code(i64),
    Text(String),
}

impl SpeedValue {
    /// The numeric code, or `None` when it cannot be parsed.
    pub fn code(&self) -> Option<i64> {
        match self {
            SpeedValue::Code(code) => Some(*code),
            SpeedValue::Text(raw) => parse_speed_code(raw),
        }
    }
}

/// One content element placed on the program canvas.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ElementDef {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    #[serde(default)]
    pub rect: Rect,
    /// Effect name, alias, or "random".
    #[serde(default)]
    pub entrance: EffectSelection,
    #[serde(default)]
    pub exit: EffectSelection,
    #[serde(default)]
    pub entrance_speed: Option<SpeedValue>,
    #[serde(default)]
    pub exit_speed: Option<SpeedValue>,
    #[serde(default)]
    pub hold_seconds: f64,
    /// Media paths or text pages shown as a slideshow.
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub keyframes: Vec<KeyframeDef>,
    #[serde(default)]
    pub timing: Option<TimingSpec>,
}

impl ElementDef {
    pub fn animation_config(&self) -> AnimationConfig {
        AnimationConfig {
            entrance: self.entrance,
            exit: self.exit,
            entrance_speed: self.entrance_speed.as_ref().and_then(SpeedValue::code),
            exit_speed: self.exit_speed.as_ref().and_then(SpeedValue::code),
            hold_seconds: self.hold_seconds,
            kind: self.kind,
        }
    }

    /// Number of slideshow items. Elements without an item list show one piece of content.
    pub fn item_count(&self) -> usize {
        self.items.len().max(1)
    }

    /// The element's keyframe track, or `None` when it has no keyframes.
    pub fn keyframe_track(&self) -> EngineResult<Option<KeyframeTrack>> {
        if self.keyframes.is_empty() {
            return Ok(None);
        }
        let keyframes = self
            .keyframes
            .iter()
            .map(KeyframeDef::to_keyframe)
            .collect::<EngineResult<Vec<_>>>()?;
        Ok(Some(KeyframeTrack::from_keyframes(keyframes)))
    }
}

/// Persisted form of a keyframe.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct KeyframeDef {
    pub time: f64,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default = "default_interpolation")]
    pub interpolation: String,
}

fn default_interpolation() -> String {
    EasingKind::Linear.as_str().to_string()
}

impl KeyframeDef {
    /// Converts to an engine keyframe. Unknown interpolation names fall back to linear.
    pub fn to_keyframe(&self) -> EngineResult<Keyframe> {
        let properties: PropertyMap = self
            .properties
            .iter()
            .map(|(key, value)| (key.clone(), property_from_json(value)))
            .collect();
        Keyframe::new(self.time, properties, EasingKind::parse_lenient(&self.interpolation))
    }
}

impl From<&Keyframe> for KeyframeDef {
    fn from(keyframe: &Keyframe) -> Self {
        Self {
            time: keyframe.time(),
            properties: keyframe
                .properties()
                .iter()
                .map(|(key, value)| (key.clone(), property_to_json(value)))
                .collect(),
            interpolation: keyframe.easing().as_str().to_string(),
        }
    }
}

fn property_from_json(value: &Value) -> PropertyValue {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(v) => PropertyValue::Number(v),
            None => PropertyValue::Opaque(n.to_string()),
        },
        Value::String(s) => PropertyValue::Opaque(s.clone()),
        other => PropertyValue::Opaque(other.to_string()),
    }
}

fn property_to_json(value: &PropertyValue) -> Value {
    match value {
        PropertyValue::Number(v) => Number::from_f64(*v).map(Value::Number).unwrap_or_else(|| {
            warn!(value = *v, "non-finite keyframe value stored as null");
            Value::Null
        }),
        PropertyValue::Opaque(s) => Value::String(s.clone()),
    }
}
