use clap::Parser;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;

use svgtrace::cli::{handle_error, init_logging, Args, CliConfig, CliUtils};
use svgtrace::conversion::SessionStatistics;
use svgtrace::error::{ConversionError, ConversionErrorKind};
use svgtrace::presentation::{SharedSink, TerminalSink};
use svgtrace::runner::{LocalScheduler, RestartOutcome, SessionCoordinator};
use svgtrace::surface::{RasterSurface, Surfaces};
use svgtrace::VisionCortexFactory;

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match CliConfig::from_args(args) {
        Ok(config) => config,
        Err(err) => {
            handle_error(&err);
            std::process::exit(2);
        }
    };

    if config.print_config_only() {
        println!("{}", config.conversion_config().to_wire()?);
        return Ok(());
    }

    init_logging(config.log_filter());

    match convert(&config) {
        Ok(stats) => {
            if config.want_stats() && !config.is_quiet() {
                output_statistics(&stats)?;
            }
            Ok(())
        }
        Err(err) => {
            handle_error(&err);
            std::process::exit(1);
        }
    }
}

fn convert(config: &CliConfig) -> Result<SessionStatistics, ConversionError> {
    let started = Instant::now();
    let conversion = config.conversion_config();

    let raster = RasterSurface::open(config.input())?;
    let surfaces = Surfaces::new();
    let (width, height) = (raster.width(), raster.height());
    surfaces.load_raster(conversion.canvas_id(), raster);
    let vector = surfaces.attach_vector(conversion.svg_id(), width, height);
    info!(
        input = %config.input().display(),
        width,
        height,
        "source raster loaded"
    );

    let sink = if CliUtils::should_draw_progress(config.is_quiet()) {
        TerminalSink::new()
    } else {
        TerminalSink::hidden()
    };
    let sink: SharedSink = Rc::new(RefCell::new(sink.with_vector_surface(vector.clone())));

    let scheduler = LocalScheduler::new();
    let mut coordinator = SessionCoordinator::new(
        VisionCortexFactory::new(surfaces),
        Rc::new(scheduler.clone()),
        sink,
    )
    .with_slice_config(config.slice);

    if coordinator.restart(conversion)? == RestartOutcome::NoSource {
        return Err(ConversionError::conversion(
            ConversionErrorKind::NoSourceLoaded {
                canvas_id: config.surfaces.canvas_id.clone(),
            },
        ));
    }
    scheduler.run_until_idle()?;

    let output = config.output_path(chrono::Utc::now());
    vector.save(&output)?;

    CliUtils::show_success(
        &format!(
            "{} paths written to {} in {}",
            vector.len(),
            output.display(),
            CliUtils::format_duration(started.elapsed())
        ),
        config.is_quiet(),
    );

    Ok(coordinator.statistics())
}

fn output_statistics(stats: &SessionStatistics) -> Result<()> {
    println!("\nConversion Statistics:");
    println!("{}", stats.summary());
    println!(
        "{}",
        stats.to_json().context("Failed to serialize statistics")?
    );
    Ok(())
}
