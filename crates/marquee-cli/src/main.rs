use anyhow::{bail, Context};
use chrono::{DateTime, TimeDelta, Utc};
use clap::{Parser, ValueEnum};
use marquee_core::{
    frame_geometry, AnimationPhase, EffectGeometry, ElementId, PresentationFrame, Rect,
};
use marquee_pipeline::load_program;
use marquee_schema::ProgramRequest;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the program JSON
    #[arg(value_name = "PROGRAM")]
    program: PathBuf,

    /// Simulated run length in seconds
    #[arg(long, default_value_t = 10.0)]
    duration: f64,

    /// Tick interval in milliseconds (overrides the program's engine config)
    #[arg(long)]
    tick_ms: Option<u64>,

    /// RNG seed for random effects (overrides the program's engine config)
    #[arg(long, env = "MARQUEE_SEED")]
    seed: Option<u64>,

    /// Simulated start instant (RFC 3339). Defaults to the current time.
    #[arg(long)]
    start: Option<DateTime<Utc>>,

    /// What to print on stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Frames)]
    output_format: OutputFormat,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum OutputFormat {
    /// One NDJSON line per tick
    Frames,
    /// One JSON document with per-element totals
    Summary,
}

#[derive(Serialize)]
struct TickRecord<'a> {
    elapsed_ms: i64,
    frames: Vec<FrameRecord<'a>>,
}

#[derive(Serialize)]
struct FrameRecord<'a> {
    #[serde(flatten)]
    frame: &'a PresentationFrame,
    geometry: EffectGeometry,
    #[serde(skip_serializing_if = "Option::is_none")]
    timing_text: Option<String>,
}

#[derive(Serialize, Default)]
struct ElementSummary {
    entrance_ticks: u64,
    hold_ticks: u64,
    exit_ticks: u64,
    cycles_completed: u64,
    last_item_index: usize,
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(cli.log_level.to_string().parse()?)
        .from_env_lossy();

    let subscriber_builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match cli.log_format {
        LogFormat::Json => subscriber_builder.json().init(),
        LogFormat::Pretty => subscriber_builder.pretty().init(),
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    if !cli.duration.is_finite() || cli.duration < 0.0 {
        bail!("--duration must be a non-negative number of seconds");
    }

    info!("Program: {:?}", cli.program);
    let json = fs::read_to_string(&cli.program)
        .with_context(|| format!("reading program {}", cli.program.display()))?;
    let mut request = ProgramRequest::from_json(&json).context("parsing program")?;
    if let Some(tick_ms) = cli.tick_ms {
        request.engine.tick_interval_ms = tick_ms;
    }
    if cli.seed.is_some() {
        request.engine.seed = cli.seed;
    }
    if request.engine.seed.is_none() {
        warn!("no seed configured, random effects will not be reproducible");
    }

    let start = cli.start.unwrap_or_else(Utc::now);
    let mut engine = load_program(&request, start)?;
    let rects: BTreeMap<ElementId, Rect> =
        request.elements.iter().map(|e| (e.id, e.rect)).collect();

    let tick = TimeDelta::from_std(engine.config().tick_interval())
        .context("tick interval out of range")?;
    let tick_ms = tick.num_milliseconds().max(1);
    let ticks = ((cli.duration * 1000.0) / tick_ms as f64).floor() as i64;
    info!(ticks, tick_ms, "Starting simulation...");

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut summary: BTreeMap<ElementId, ElementSummary> = BTreeMap::new();

    for i in 1..=ticks {
        let elapsed = TimeDelta::milliseconds(i * tick_ms);
        let now = start + elapsed;
        let frames = engine.tick(now);

        match cli.output_format {
            OutputFormat::Frames => {
                let records = frames
                    .iter()
                    .map(|frame| FrameRecord {
                        frame,
                        geometry: frame_geometry(
                            frame,
                            rects.get(&frame.element_id).copied().unwrap_or_default(),
                        ),
                        timing_text: engine.timing_text(frame.element_id, now),
                    })
                    .collect();
                let record = TickRecord {
                    elapsed_ms: elapsed.num_milliseconds(),
                    frames: records,
                };
                serde_json::to_writer(&mut out, &record)?;
                writeln!(out)?;
            }
            OutputFormat::Summary => {
                for frame in &frames {
                    let entry = summary.entry(frame.element_id).or_default();
                    match frame.phase {
                        AnimationPhase::Entrance => entry.entrance_ticks += 1,
                        AnimationPhase::Hold => entry.hold_ticks += 1,
                        AnimationPhase::Exit => entry.exit_ticks += 1,
                    }
                    entry.cycles_completed = engine
                        .state(frame.element_id)
                        .map_or(0, |state| state.cycles_completed);
                    entry.last_item_index = frame.item_index;
                }
            }
        }
    }

    if cli.output_format == OutputFormat::Summary {
        serde_json::to_writer_pretty(&mut out, &summary)?;
        writeln!(out)?;
    }
    out.flush()?;
    info!("Simulation complete.");
    Ok(())
}
