use crate::types::ElementId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Keyframe time must be finite and non-negative, got {0}")]
    InvalidKeyframeTime(f64),
    #[error("Unknown effect name: {0}")]
    UnknownEffect(String),
    #[error("Unknown easing name: {0}")]
    UnknownEasing(String),
    #[error("Element not found: {0}")]
    UnknownElement(ElementId),
    #[error("Invalid program: {0}")]
    InvalidProgram(String),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
