//! True color clustering engine

use tracing::{debug, trace};
use visioncortex::color_clusters::{
    Clusters, IncrementalBuilder, KeyingAction, Runner, RunnerConfig, HIERARCHICAL_MAX,
};
use visioncortex::{Color, ColorImage, PathSimplifyMode};

use crate::conversion::config::{ConversionConfig, Hierarchy};
use crate::conversion::engine::PROGRESS_MAX;
use crate::error::{ConversionError, ConversionResult};
use crate::surface::{RasterSurface, VectorSurface};

/// Fraction of sampled pixels that must be transparent before the image is keyed
const KEYING_THRESHOLD: f32 = 0.2;

/// Key candidates, tried in order
const KEY_COLORS: [(u8, u8, u8); 7] = [
    (255, 0, 0),
    (0, 255, 0),
    (0, 0, 255),
    (255, 255, 0),
    (0, 255, 255),
    (255, 0, 255),
    (128, 128, 128),
];

enum Stage {
    New(RasterSurface),
    Clustering(IncrementalBuilder),
    Reclustering(IncrementalBuilder),
    Vectorize(Clusters),
}

/// Clusters by color, then traces one cluster per tick
pub struct ColorImageEngine {
    svg: VectorSurface,
    stage: Stage,
    counter: usize,
    key_color: Color,
    hierarchy: Hierarchy,
    mode: PathSimplifyMode,
    corner_threshold: f64,
    length_threshold: f64,
    max_iterations: usize,
    splice_threshold: f64,
    filter_speckle: usize,
    color_precision: i32,
    layer_difference: i32,
    path_precision: u32,
}

impl ColorImageEngine {
    pub fn new(config: &ConversionConfig, raster: RasterSurface, svg: VectorSurface) -> Self {
        Self {
            svg,
            stage: Stage::New(raster),
            counter: 0,
            key_color: Color::default(),
            hierarchy: config.hierarchical(),
            mode: config.mode().simplify_mode(),
            corner_threshold: config.corner_threshold(),
            length_threshold: config.length_threshold(),
            max_iterations: config.max_iterations(),
            splice_threshold: config.splice_threshold(),
            filter_speckle: config.filter_speckle(),
            color_precision: config.color_precision(),
            layer_difference: config.layer_difference(),
            path_precision: config.path_precision(),
        }
    }

    pub fn init(&mut self) -> ConversionResult<()> {
        let mut image = match &self.stage {
            Stage::New(raster) => raster.to_color_image(),
            _ => return Err(ConversionError::engine_fault("color engine initialized twice")),
        };
        let (width, height) = (image.width, image.height);

        // All zeroes means no keying to the clustering runner
        self.key_color = if should_key_image(&image) {
            match find_unused_color(&image) {
                Some(key_color) => {
                    for y in 0..height {
                        for x in 0..width {
                            if image.get_pixel(x, y).a == 0 {
                                image.set_pixel(x, y, &key_color);
                            }
                        }
                    }
                    debug!(key = %key_color.to_hex_string(), "keying transparent pixels");
                    key_color
                }
                None => Color::default(),
            }
        } else {
            Color::default()
        };

        let runner = Runner::new(
            RunnerConfig {
                diagonal: self.layer_difference == 0,
                hierarchical: HIERARCHICAL_MAX,
                batch_size: 25600,
                good_min_area: self.filter_speckle,
                good_max_area: width * height,
                is_same_color_a: self.color_precision,
                is_same_color_b: 1,
                deepen_diff: self.layer_difference,
                hollow_neighbours: 1,
                key_color: self.key_color,
                keying_action: match self.hierarchy {
                    Hierarchy::Cutout => KeyingAction::Keep,
                    Hierarchy::Stacked => KeyingAction::Discard,
                },
            },
            image,
        );
        self.stage = Stage::Clustering(runner.start());

        Ok(())
    }

    pub fn tick(&mut self) -> ConversionResult<bool> {
        let next = match &mut self.stage {
            Stage::New(_) => {
                return Err(ConversionError::engine_fault(
                    "color engine ticked before init",
                ))
            }
            Stage::Clustering(builder) => {
                trace!("clustering tick");
                if !builder.tick() {
                    return Ok(false);
                }
                let clusters = builder.result();
                match self.hierarchy {
                    Hierarchy::Stacked => Stage::Vectorize(clusters),
                    Hierarchy::Cutout => {
                        Stage::Reclustering(recluster_cutout(&clusters, self.key_color))
                    }
                }
            }
            Stage::Reclustering(builder) => {
                trace!("reclustering tick");
                if !builder.tick() {
                    return Ok(false);
                }
                Stage::Vectorize(builder.result())
            }
            Stage::Vectorize(clusters) => {
                let view = clusters.view();
                if self.counter >= view.clusters_output.len() {
                    return Ok(true);
                }

                trace!(cluster = self.counter, "vectorize");
                let cluster = view.get_cluster(view.clusters_output[self.counter]);
                let paths = cluster.to_compound_path(
                    &view,
                    false,
                    self.mode,
                    self.corner_threshold,
                    self.length_threshold,
                    self.max_iterations,
                    self.splice_threshold,
                );
                self.svg.prepend_path(
                    &paths,
                    &cluster.residue_color(),
                    Some(self.path_precision),
                );
                self.counter += 1;
                return Ok(false);
            }
        };

        if let Stage::Vectorize(clusters) = &next {
            debug!(
                clusters = clusters.view().clusters_output.len(),
                "color clustering done"
            );
        }
        self.stage = next;
        Ok(false)
    }

    pub fn progress(&self) -> u32 {
        let half = PROGRESS_MAX / 2;
        match &self.stage {
            Stage::New(_) => 0,
            Stage::Clustering(builder) => builder.progress() / 2,
            Stage::Reclustering(_) => half,
            Stage::Vectorize(clusters) => {
                let total = clusters.view().clusters_output.len();
                if total == 0 {
                    return PROGRESS_MAX;
                }
                half + (half as usize * self.counter / total) as u32
            }
        }
    }
}

/// Rebuild a cutout hierarchy from the flattened stacked view
fn recluster_cutout(clusters: &Clusters, key_color: Color) -> IncrementalBuilder {
    let view = clusters.view();
    let image = view.to_color_image();
    let area = image.width * image.height;

    Runner::new(
        RunnerConfig {
            diagonal: false,
            hierarchical: 64,
            batch_size: 25600,
            good_min_area: 0,
            good_max_area: area,
            is_same_color_a: 0,
            is_same_color_b: 1,
            deepen_diff: 0,
            hollow_neighbours: 0,
            key_color,
            keying_action: KeyingAction::Discard,
        },
        image,
    )
    .start()
}

fn color_exists_in_image(image: &ColorImage, color: &Color) -> bool {
    for y in 0..image.height {
        for x in 0..image.width {
            let pixel = image.get_pixel(x, y);
            if pixel.r == color.r && pixel.g == color.g && pixel.b == color.b {
                return true;
            }
        }
    }
    false
}

fn find_unused_color(image: &ColorImage) -> Option<Color> {
    KEY_COLORS
        .iter()
        .map(|&(r, g, b)| Color::new(r, g, b))
        .find(|color| !color_exists_in_image(image, color))
}

/// Sample five scanlines and key the image if enough of them is transparent
fn should_key_image(image: &ColorImage) -> bool {
    if image.width == 0 || image.height == 0 {
        return false;
    }

    let threshold = ((image.width * 2) as f32 * KEYING_THRESHOLD) as usize;
    let mut transparent = 0;
    let rows = [
        0,
        image.height / 4,
        image.height / 2,
        3 * image.height / 4,
        image.height - 1,
    ];
    for y in rows {
        for x in 0..image.width {
            if image.get_pixel(x, y).a == 0 {
                transparent += 1;
            }
            if transparent >= threshold {
                return true;
            }
        }
    }

    false
}
