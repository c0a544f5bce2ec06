use marquee_core::{ElementSpec, EngineResult, PresentationEngine, Timestamp};
use marquee_schema::{ElementDef, ProgramRequest};
use std::path::Path;
use tracing::{info, instrument};

/// Converts a program request into an engine with every element active at `now`.
#[instrument(
    level = "info",
    skip(request),
    fields(program = %request.name, elements = request.elements.len())
)]
pub fn load_program(request: &ProgramRequest, now: Timestamp) -> EngineResult<PresentationEngine> {
    request.validate()?;
    let mut engine = PresentationEngine::new(request.engine.clone());
    for element in &request.elements {
        engine.upsert_element(element.id, element_spec(element)?, now);
    }
    info!(width = request.width, height = request.height, "program loaded");
    Ok(engine)
}

/// Reads a program JSON file and loads it.
pub fn load_program_from_path(
    path: impl AsRef<Path>,
    now: Timestamp,
) -> EngineResult<PresentationEngine> {
    let json = std::fs::read_to_string(path.as_ref())?;
    let request = ProgramRequest::from_json(&json)?;
    load_program(&request, now)
}

/// Switches a running engine to `request`.
///
/// Every element of the previous program is dropped together with its animation state,
/// keyframe clock and timing anchor. Elements of the new program, including ids shared
/// with the old one, start a fresh cycle at `now`. The engine keeps its RNG so seeded
/// runs stay replayable across switches.
#[instrument(level = "info", skip(engine, request), fields(program = %request.name))]
pub fn apply_program(
    engine: &mut PresentationEngine,
    request: &ProgramRequest,
    now: Timestamp,
) -> EngineResult<()> {
    request.validate()?;
    let specs = request
        .elements
        .iter()
        .map(|element| Ok((element.id, element_spec(element)?)))
        .collect::<EngineResult<Vec<_>>>()?;

    let dropped = engine.len();
    engine.clear();
    for (id, spec) in specs {
        engine.upsert_element(id, spec, now);
    }
    info!(dropped, added = engine.len(), "program applied");
    Ok(())
}

/// Engine-side spec for one element definition.
pub fn element_spec(element: &ElementDef) -> EngineResult<ElementSpec> {
    Ok(ElementSpec {
        animation: element.animation_config(),
        item_count: element.item_count(),
        keyframes: element.keyframe_track()?,
        timing: element.timing.clone(),
    })
}
