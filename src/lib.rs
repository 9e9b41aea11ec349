//! svgtrace: interactive raster to SVG conversion
//!
//! Converts a raster image into an SVG document incrementally. The engine
//! advances in short time slices on a cooperative scheduler so the host stays
//! responsive, and any configuration change cancels the running conversion
//! before a new one starts.

pub mod cli;
pub mod conversion;
pub mod error;
pub mod presentation;
pub mod runner;
pub mod surface;

// Re-export commonly used types
pub use conversion::{
    build_config, deg2rad, ClusteringEngine, ControlValues, ConversionConfig, ConversionResult,
    Engine, EngineFactory, Preset, SessionStatistics, SurfaceIds, VisionCortexFactory,
};
pub use error::{ConversionError, ConversionErrorKind};
pub use presentation::{PresentationSink, PreviewPanel, SharedSink, TerminalSink};
pub use runner::{
    ConversionSession, LocalScheduler, RestartOutcome, Scheduler, SessionCoordinator,
    SessionState, SliceConfig,
};
pub use surface::{export_filename, RasterSurface, Surfaces, VectorSurface};
