//! Command-line interface module

use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::conversion::{
    build_config, ClusteringMode, ControlValues, ConversionConfig, ConversionResult, Hierarchy,
    PathMode, Preset, SurfaceIds,
};
use crate::error::{ConversionError, ConversionErrorKind};
use crate::runner::SliceConfig;
use crate::surface::export_filename;

/// Main CLI arguments
#[derive(Parser, Debug, Clone)]
#[command(name = "svgtrace")]
#[command(about = "Convert raster images to SVG, one time-sliced quantum at a time")]
#[command(version = "0.1.0")]
#[command(long_about = None)]
pub struct Args {
    /// Input raster image (PNG, JPEG, BMP, ...)
    #[arg()]
    pub input: PathBuf,

    /// Output SVG file (default: export-<timestamp>.svg)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Start from a preset, individual flags override it
    #[arg(long)]
    pub preset: Option<PresetArg>,

    /// Clustering: color or binary
    #[arg(long)]
    pub colormode: Option<ColorModeArg>,

    /// Clustering hierarchy: stacked or cutout
    #[arg(long)]
    pub hierarchical: Option<HierarchyArg>,

    /// Curve fitting mode: pixel, polygon or spline
    #[arg(short, long)]
    pub mode: Option<ModeArg>,

    /// Discard patches smaller than X px in size (0-16)
    #[arg(short = 'f', long)]
    pub filter_speckle: Option<u32>,

    /// Number of significant bits per RGB channel (1-8)
    #[arg(short = 'p', long)]
    pub color_precision: Option<i32>,

    /// Color difference between gradient layers (0-255)
    #[arg(short = 'g', long)]
    pub gradient_step: Option<i32>,

    /// Minimum momentary angle in degrees to be considered a corner (0-180)
    #[arg(short = 'c', long)]
    pub corner_threshold: Option<i32>,

    /// Perform iterative subdivide smooth until all segments are shorter than this (3.5-10)
    #[arg(short = 'l', long)]
    pub segment_length: Option<f64>,

    /// Minimum angle displacement in degrees to splice a spline (0-180)
    #[arg(short = 's', long)]
    pub splice_threshold: Option<i32>,

    /// Number of decimal places in path coordinates
    #[arg(long)]
    pub path_precision: Option<u32>,

    /// Maximum spline fitting iterations
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Wall-clock budget of one conversion quantum in milliseconds (default: 25)
    #[arg(long)]
    pub budget_ms: Option<u64>,

    /// Print the conversion config as JSON and exit
    #[arg(long)]
    pub print_config: bool,

    /// Output session statistics
    #[arg(long)]
    pub stats: bool,

    /// Enable verbose logging
    #[arg(long)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(long)]
    pub quiet: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetArg {
    Bw,
    Poster,
    Photo,
}

impl From<PresetArg> for Preset {
    fn from(preset: PresetArg) -> Self {
        match preset {
            PresetArg::Bw => Preset::Bw,
            PresetArg::Poster => Preset::Poster,
            PresetArg::Photo => Preset::Photo,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorModeArg {
    Color,
    #[value(alias = "bw")]
    Binary,
}

impl From<ColorModeArg> for ClusteringMode {
    fn from(mode: ColorModeArg) -> Self {
        match mode {
            ColorModeArg::Color => ClusteringMode::Color,
            ColorModeArg::Binary => ClusteringMode::Binary,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HierarchyArg {
    Stacked,
    Cutout,
}

impl From<HierarchyArg> for Hierarchy {
    fn from(hierarchy: HierarchyArg) -> Self {
        match hierarchy {
            HierarchyArg::Stacked => Hierarchy::Stacked,
            HierarchyArg::Cutout => Hierarchy::Cutout,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    #[value(alias = "none")]
    Pixel,
    Polygon,
    Spline,
}

impl From<ModeArg> for PathMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Pixel => PathMode::None,
            ModeArg::Polygon => PathMode::Polygon,
            ModeArg::Spline => PathMode::Spline,
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub args: Args,
    pub controls: ControlValues,
    pub slice: SliceConfig,
    pub surfaces: SurfaceIds,
}

impl CliConfig {
    /// Create CLI configuration from arguments
    pub fn from_args(args: Args) -> ConversionResult<Self> {
        let controls = Self::create_control_values(&args);
        controls
            .validate()
            .map_err(|e| ConversionError::conversion(ConversionErrorKind::configuration(e)))?;

        let mut slice = SliceConfig::default();
        if let Some(budget) = args.budget_ms {
            slice = slice.with_budget(Duration::from_millis(budget));
        }
        slice.validate()?;

        Ok(Self {
            args,
            controls,
            slice,
            surfaces: SurfaceIds::default(),
        })
    }

    /// Preset values first, then every flag given on the command line
    fn create_control_values(args: &Args) -> ControlValues {
        let mut controls = args
            .preset
            .map(|preset| ControlValues::from_preset(preset.into()))
            .unwrap_or_default();

        if let Some(mode) = args.colormode {
            controls = controls.with_clustering_mode(mode.into());
        }
        if let Some(hierarchy) = args.hierarchical {
            controls = controls.with_hierarchy(hierarchy.into());
        }
        if let Some(mode) = args.mode {
            controls = controls.with_mode(mode.into());
        }
        if let Some(size) = args.filter_speckle {
            controls = controls.with_filter_speckle(size);
        }
        if let Some(bits) = args.color_precision {
            controls = controls.with_color_precision(bits);
        }
        if let Some(step) = args.gradient_step {
            controls = controls.with_layer_difference(step);
        }
        if let Some(degrees) = args.corner_threshold {
            controls = controls.with_corner_threshold(degrees);
        }
        if let Some(length) = args.segment_length {
            controls = controls.with_length_threshold(length);
        }
        if let Some(degrees) = args.splice_threshold {
            controls = controls.with_splice_threshold(degrees);
        }
        if let Some(decimals) = args.path_precision {
            controls = controls.with_path_precision(decimals);
        }
        if let Some(iterations) = args.max_iterations {
            controls = controls.with_max_iterations(iterations);
        }

        controls
    }

    /// The engine configuration for the current control values
    pub fn conversion_config(&self) -> ConversionConfig {
        build_config(&self.controls, &self.surfaces)
    }

    pub fn input(&self) -> &Path {
        &self.args.input
    }

    /// Where the SVG goes, a timestamped name unless `--output` was given
    pub fn output_path(&self, now: DateTime<Utc>) -> PathBuf {
        self.args
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(export_filename(now)))
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.args.quiet
    }

    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.args.verbose
    }

    /// Check if stats output is requested
    pub fn want_stats(&self) -> bool {
        self.args.stats
    }

    pub fn print_config_only(&self) -> bool {
        self.args.print_config
    }

    /// Default log filter when `RUST_LOG` is unset
    pub fn log_filter(&self) -> &'static str {
        if self.is_quiet() {
            "warn"
        } else if self.is_verbose() {
            "svgtrace=debug"
        } else {
            "svgtrace=info"
        }
    }
}

/// Install the `tracing` subscriber, logging to stderr
pub fn init_logging(default_filter: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// CLI utilities and helpers
pub struct CliUtils;

impl CliUtils {
    /// Format a duration in human-readable format
    pub fn format_duration(duration: Duration) -> String {
        let total_millis = duration.as_millis();

        if total_millis < 1000 {
            format!("{}ms", total_millis)
        } else if total_millis < 60_000 {
            format!("{:.1}s", total_millis as f64 / 1000.0)
        } else {
            let minutes = total_millis / 60_000;
            let seconds = (total_millis % 60_000) / 1000;
            format!("{}m {}s", minutes, seconds)
        }
    }

    /// Show a success message (if not in quiet mode)
    pub fn show_success(message: &str, quiet: bool) {
        if !quiet {
            println!("✓ {}", message);
        }
    }

    /// Show an error message
    pub fn show_error(message: &str) {
        eprintln!("✗ {}", message);
    }

    /// Whether a live progress bar should be drawn on stderr
    pub fn should_draw_progress(quiet: bool) -> bool {
        !quiet && atty::is(atty::Stream::Stderr)
    }
}

/// Handle CLI errors with user-friendly messages
pub fn handle_error(error: &ConversionError) {
    CliUtils::show_error(&error.user_message());

    match error.kind() {
        Some(ConversionErrorKind::Configuration { .. }) => {
            eprintln!("\nTip: Use --print-config to inspect the effective settings");
        }
        Some(ConversionErrorKind::ImageDecode { .. }) => {
            eprintln!("\nTip: Supported inputs include PNG, JPEG, GIF, BMP and WebP");
        }
        _ => {}
    }

    eprintln!("\nTry 'svgtrace --help' for usage information.");
}
