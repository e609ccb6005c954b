//! slkmap-bench: CLI tool for annotating saved frames and collecting diagnostics.
//!
//! Loads a scene file (a frame captured from the map host: resolution,
//! viewport, settings and projected road features), annotates it and
//! prints per-frame diagnostics. Useful for:
//!
//! - Checking which features get ticks at a given resolution
//! - Measuring annotation time on large frames
//! - Rendering a frame to SVG or PNG without the host
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin slkmap-bench -- [OPTIONS] <SCENE_JSON>
//! ```
//!
//! Set `RUST_LOG=slkmap_core=debug` to see per-feature log output.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use slkmap_core::{Clock, FrameContext, FrameDiagnostics, RoadSettings, Viewport};
use slkmap_export::{Scene, SceneFile, SvgMetadata};
use tracing_subscriber::EnvFilter;

/// Chainage tick annotation diagnostics for slkmap.
///
/// Annotates a saved frame and prints feature counts, tick counts and
/// timing. Flags override the values stored in the scene file.
#[derive(Parser)]
#[command(name = "slkmap-bench", version)]
struct Cli {
    /// Path to the scene JSON file.
    scene_path: PathBuf,

    /// Map resolution in metres per pixel.
    #[arg(long)]
    resolution: Option<f64>,

    /// Viewport width in pixels.
    #[arg(long)]
    width: Option<f64>,

    /// Viewport height in pixels.
    #[arg(long)]
    height: Option<f64>,

    /// Display settings as a JSON string.
    ///
    /// Fields left out take their defaults. Replaces any settings stored
    /// in the scene file.
    #[arg(long)]
    settings_json: Option<String>,

    /// Write SVG output to file.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Write a PNG preview to file.
    #[arg(long)]
    png: Option<PathBuf>,

    /// Output pixels per scene pixel for the PNG preview.
    #[arg(long, default_value_t = 1.0)]
    png_scale: f64,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output diagnostics as JSON instead of human-readable report.
    #[arg(long)]
    json: bool,
}

/// Build the frame context from the scene file and CLI overrides.
fn context_from_cli(cli: &Cli, scene: &SceneFile) -> Result<FrameContext, String> {
    let mut ctx = scene.context();
    if let Some(resolution) = cli.resolution {
        ctx.resolution = resolution;
    }
    if cli.width.is_some() || cli.height.is_some() {
        ctx.viewport = Viewport::new(
            cli.width.unwrap_or(ctx.viewport.width),
            cli.height.unwrap_or(ctx.viewport.height),
        );
    }
    if let Some(ref json) = cli.settings_json {
        ctx.settings = serde_json::from_str::<RoadSettings>(json)
            .map_err(|e| format!("Error parsing --settings-json: {e}"))?;
    }
    if !(ctx.resolution.is_finite() && ctx.resolution > 0.0) {
        return Err(format!(
            "Resolution must be a positive number, got {}",
            ctx.resolution
        ));
    }
    Ok(ctx)
}

fn load_scene(path: &Path) -> Result<SceneFile, String> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    serde_json::from_str(&json).map_err(|e| format!("Error parsing {}: {e}", path.display()))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let scene = match load_scene(&cli.scene_path) {
        Ok(scene) => scene,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };
    let ctx = match context_from_cli(&cli, &scene) {
        Ok(ctx) => ctx,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    eprintln!(
        "Scene: {} ({} features)",
        cli.scene_path.display(),
        scene.features.len(),
    );
    eprintln!(
        "Resolution: {} m/px, viewport {}x{}",
        ctx.resolution, ctx.viewport.width, ctx.viewport.height,
    );
    eprintln!("Settings: {:#?}", ctx.settings);
    eprintln!("Runs: {}", cli.runs);
    eprintln!();

    let mut all_diagnostics = Vec::with_capacity(cli.runs);

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        let (frame, diagnostics) =
            slkmap_core::annotate_frame_with_diagnostics(&scene.features, &ctx, &StdClock);

        if cli.json {
            match serde_json::to_string_pretty(&diagnostics) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("Error serializing diagnostics: {e}");
                    return ExitCode::FAILURE;
                }
            }
        } else {
            println!("{}", diagnostics.report());
            for skipped in &frame.skipped {
                println!("  skipped feature {}: {}", skipped.index, skipped.error);
            }
        }

        all_diagnostics.push(diagnostics);

        if cli.runs > 1 {
            eprintln!();
        }
    }

    // Draw once, after timing, so rendering does not skew the runs.
    if (cli.svg.is_some() || cli.png.is_some()) && !write_outputs(&cli, &scene, &ctx) {
        return ExitCode::FAILURE;
    }

    if cli.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    ExitCode::SUCCESS
}

/// Write the requested SVG and PNG files. Returns `false` on failure.
fn write_outputs(cli: &Cli, scene_file: &SceneFile, ctx: &FrameContext) -> bool {
    let scene = Scene::build(&scene_file.features, ctx);

    if let Some(ref svg_path) = cli.svg {
        let title = cli
            .scene_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("frame");
        let desc = format!("resolution {} m/px", ctx.resolution);
        let settings_json = serde_json::to_string(&ctx.settings).ok();
        let metadata = SvgMetadata {
            title: Some(title),
            description: Some(&desc),
            settings_json: settings_json.as_deref(),
        };
        let svg = slkmap_export::to_svg(&scene, &metadata);
        if let Err(e) = std::fs::write(svg_path, &svg) {
            eprintln!("Error writing SVG to {}: {e}", svg_path.display());
            return false;
        }
        eprintln!(
            "SVG written to {} ({} bytes)",
            svg_path.display(),
            svg.len(),
        );
    }

    if let Some(ref png_path) = cli.png {
        let png = match slkmap_export::render_png(&scene, cli.png_scale) {
            Ok(png) => png,
            Err(e) => {
                eprintln!("Error rendering PNG: {e}");
                return false;
            }
        };
        if let Err(e) = std::fs::write(png_path, &png) {
            eprintln!("Error writing PNG to {}: {e}", png_path.display());
            return false;
        }
        eprintln!(
            "PNG written to {} ({} bytes)",
            png_path.display(),
            png.len(),
        );
    }

    true
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Print aggregated statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[FrameDiagnostics]) {
    debug_assert!(!all_diagnostics.is_empty(), "no diagnostics to summarize");

    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(40),
    );

    if all_diagnostics.is_empty() {
        println!("Warning: no diagnostics to summarize");
        return;
    }

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");

    let ticks = all_diagnostics[0].tick_count;
    if mean > 0.0 {
        let throughput = ticks as f64 / mean;
        println!("Throughput: {throughput:.0} ticks/ms");
    }
}
