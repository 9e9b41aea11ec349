//! Black and white clustering engine

use tracing::{debug, trace};
use visioncortex::clusters::Clusters;
use visioncortex::{Color, ColorName, PathSimplifyMode};

use crate::conversion::config::ConversionConfig;
use crate::conversion::engine::PROGRESS_MAX;
use crate::error::{ConversionError, ConversionResult};
use crate::surface::{RasterSurface, VectorSurface};

/// Luminance cut-off below which a pixel counts as ink
const INK_THRESHOLD: u8 = 128;

/// Traces one black cluster per tick
pub struct BinaryImageEngine {
    raster: Option<RasterSurface>,
    svg: VectorSurface,
    clusters: Clusters,
    counter: usize,
    mode: PathSimplifyMode,
    corner_threshold: f64,
    length_threshold: f64,
    max_iterations: usize,
    splice_threshold: f64,
    filter_speckle: usize,
    path_precision: u32,
}

impl BinaryImageEngine {
    pub fn new(config: &ConversionConfig, raster: RasterSurface, svg: VectorSurface) -> Self {
        Self {
            raster: Some(raster),
            svg,
            clusters: Clusters::default(),
            counter: 0,
            mode: config.mode().simplify_mode(),
            corner_threshold: config.corner_threshold(),
            length_threshold: config.length_threshold(),
            max_iterations: config.max_iterations(),
            splice_threshold: config.splice_threshold(),
            filter_speckle: config.filter_speckle(),
            path_precision: config.path_precision(),
        }
    }

    pub fn init(&mut self) -> ConversionResult<()> {
        let raster = self
            .raster
            .take()
            .ok_or_else(|| ConversionError::engine_fault("binary engine initialized twice"))?;

        let image = raster.to_color_image();
        let binary_image = image.to_binary_image(|pixel| pixel.r < INK_THRESHOLD);
        self.clusters = binary_image.to_clusters(false);

        debug!(clusters = self.clusters.len(), "binary clustering done");
        Ok(())
    }

    pub fn tick(&mut self) -> ConversionResult<bool> {
        if self.counter >= self.clusters.len() {
            return Ok(true);
        }

        trace!(cluster = self.counter, "vectorize");
        let cluster = self.clusters.get_cluster(self.counter);
        if cluster.size() >= self.filter_speckle {
            let paths = cluster.to_compound_path(
                self.mode,
                self.corner_threshold,
                self.length_threshold,
                self.max_iterations,
                self.splice_threshold,
            );
            let color = Color::color(&ColorName::Black);
            self.svg
                .prepend_path(&paths, &color, Some(self.path_precision));
        }
        self.counter += 1;

        Ok(false)
    }

    pub fn progress(&self) -> u32 {
        let total = self.clusters.len();
        if total == 0 {
            return PROGRESS_MAX;
        }
        (PROGRESS_MAX as usize * self.counter / total) as u32
    }
}
