//! Engine capability interface and engine construction

use tracing::debug;

use crate::conversion::binary::BinaryImageEngine;
use crate::conversion::color::ColorImageEngine;
use crate::conversion::config::{ClusteringMode, ConversionConfig};
use crate::error::{ConversionError, ConversionErrorKind, ConversionResult};
use crate::surface::Surfaces;

/// Progress value reported by an engine that has finished its work
pub const PROGRESS_MAX: u32 = 100;

/// A stateful, incremental conversion computation.
///
/// `tick` performs one bounded, uninterruptible step. `free` consumes the
/// engine, so it runs at most once and nothing can touch the engine after it.
pub trait Engine {
    /// One-time setup before the first tick
    fn init(&mut self) -> ConversionResult<()>;

    /// Advance one step, returns `true` once all work is done
    fn tick(&mut self) -> ConversionResult<bool>;

    /// Current progress in `[0, progress_max()]`
    fn progress(&self) -> u32;

    fn progress_max(&self) -> u32 {
        PROGRESS_MAX
    }

    /// Release every resource held by the engine
    fn free(self: Box<Self>);
}

/// The engine variant, resolved once from the clustering mode
pub enum ClusteringEngine {
    Binary(BinaryImageEngine),
    Color(ColorImageEngine),
}

impl ClusteringEngine {
    /// Build the engine for `config`, reading and writing the surfaces it names
    pub fn new(config: &ConversionConfig, surfaces: &Surfaces) -> ConversionResult<Self> {
        let raster = surfaces.raster(config.canvas_id()).ok_or_else(|| {
            ConversionError::conversion(ConversionErrorKind::NoSourceLoaded {
                canvas_id: config.canvas_id().to_string(),
            })
        })?;
        let svg = surfaces.vector(config.svg_id()).ok_or_else(|| {
            ConversionError::configuration(format!(
                "Unknown vector surface '{}'",
                config.svg_id()
            ))
        })?;

        debug!(
            clustering = config.clustering_mode().as_str(),
            width = raster.width(),
            height = raster.height(),
            "creating engine"
        );

        Ok(match config.clustering_mode() {
            ClusteringMode::Binary => {
                ClusteringEngine::Binary(BinaryImageEngine::new(config, raster, svg))
            }
            ClusteringMode::Color => {
                ClusteringEngine::Color(ColorImageEngine::new(config, raster, svg))
            }
        })
    }

    pub fn clustering_mode(&self) -> ClusteringMode {
        match self {
            ClusteringEngine::Binary(_) => ClusteringMode::Binary,
            ClusteringEngine::Color(_) => ClusteringMode::Color,
        }
    }
}

impl Engine for ClusteringEngine {
    fn init(&mut self) -> ConversionResult<()> {
        match self {
            ClusteringEngine::Binary(engine) => engine.init(),
            ClusteringEngine::Color(engine) => engine.init(),
        }
    }

    fn tick(&mut self) -> ConversionResult<bool> {
        match self {
            ClusteringEngine::Binary(engine) => engine.tick(),
            ClusteringEngine::Color(engine) => engine.tick(),
        }
    }

    fn progress(&self) -> u32 {
        match self {
            ClusteringEngine::Binary(engine) => engine.progress(),
            ClusteringEngine::Color(engine) => engine.progress(),
        }
    }

    fn free(self: Box<Self>) {
        debug!(clustering = self.clustering_mode().as_str(), "engine released");
        drop(self);
    }
}

/// Creates engines for the session coordinator
pub trait EngineFactory {
    fn create(&self, config: &ConversionConfig) -> ConversionResult<Box<dyn Engine>>;

    /// Whether a source raster is available for `config`
    fn source_ready(&self, _config: &ConversionConfig) -> bool {
        true
    }
}

impl<F> EngineFactory for F
where
    F: Fn(&ConversionConfig) -> ConversionResult<Box<dyn Engine>>,
{
    fn create(&self, config: &ConversionConfig) -> ConversionResult<Box<dyn Engine>> {
        self(config)
    }
}

/// Factory for the `visioncortex` backed engines
#[derive(Debug, Clone, Default)]
pub struct VisionCortexFactory {
    surfaces: Surfaces,
}

impl VisionCortexFactory {
    pub fn new(surfaces: Surfaces) -> Self {
        Self { surfaces }
    }

    pub fn surfaces(&self) -> &Surfaces {
        &self.surfaces
    }
}

impl EngineFactory for VisionCortexFactory {
    fn create(&self, config: &ConversionConfig) -> ConversionResult<Box<dyn Engine>> {
        Ok(Box::new(ClusteringEngine::new(config, &self.surfaces)?))
    }

    fn source_ready(&self, config: &ConversionConfig) -> bool {
        self.surfaces.has_raster(config.canvas_id())
    }
}
