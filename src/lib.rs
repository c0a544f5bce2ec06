//! # Marquee Engine
//!
//! `marquee-engine` bundles the presentation animation engine with its program
//! schema and loader.
//!
//! Load a program with [`pipeline::load_program`], call
//! [`PresentationEngine::tick`] at the configured interval and paint each frame
//! with [`effect_geometry`].

pub use marquee_core::*;

/// Program data as stored by the editor.
pub use marquee_schema as schema;

/// Program loading and switching.
pub use marquee_pipeline as pipeline;
