//! Control values, presets and the engine-ready conversion config

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use visioncortex::PathSimplifyMode;

use crate::error::{ConversionError, ConversionResult};

/// Number of significant bits per RGB channel the color clustering works with
pub const COLOR_PRECISION_BITS: i32 = 8;

/// Curve fitting mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathMode {
    /// Pixel-exact staircase outlines
    None,
    /// Simplified polygons
    Polygon,
    /// Smoothed splines
    Spline,
}

impl PathMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathMode::None => "none",
            PathMode::Polygon => "polygon",
            PathMode::Spline => "spline",
        }
    }

    pub fn simplify_mode(&self) -> PathSimplifyMode {
        match self {
            PathMode::None => PathSimplifyMode::None,
            PathMode::Polygon => PathSimplifyMode::Polygon,
            PathMode::Spline => PathSimplifyMode::Spline,
        }
    }
}

/// Clustering mode, selects the engine variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusteringMode {
    /// Black and white clustering
    Binary,
    /// True color clustering
    Color,
}

impl ClusteringMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusteringMode::Binary => "binary",
            ClusteringMode::Color => "color",
        }
    }
}

/// Clustering hierarchy, only meaningful for color clustering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hierarchy {
    /// Shapes are stacked on top of each other
    Stacked,
    /// Shapes are cut out of each other and do not overlap
    Cutout,
}

impl Hierarchy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Hierarchy::Stacked => "stacked",
            Hierarchy::Cutout => "cutout",
        }
    }
}

/// Named sets of control values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Bw,
    Poster,
    Photo,
}

/// Identifiers of the raster source and vector output surfaces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceIds {
    pub canvas_id: String,
    pub svg_id: String,
}

impl SurfaceIds {
    pub fn new(canvas_id: impl Into<String>, svg_id: impl Into<String>) -> Self {
        Self {
            canvas_id: canvas_id.into(),
            svg_id: svg_id.into(),
        }
    }
}

impl Default for SurfaceIds {
    fn default() -> Self {
        Self::new("frame", "svg")
    }
}

/// Raw control values, in the units the controls present them
#[derive(Debug, Clone, PartialEq)]
pub struct ControlValues {
    pub mode: PathMode,
    pub clustering_mode: ClusteringMode,
    pub hierarchy: Hierarchy,
    /// Minimum momentary angle in degrees to be considered a corner
    pub corner_threshold: i32,
    /// Subdivide until all segments are shorter than this length
    pub length_threshold: f64,
    /// Minimum angle displacement in degrees to splice a spline
    pub splice_threshold: i32,
    /// Discard patches smaller than this many pixels on a side
    pub filter_speckle: u32,
    /// Significant bits per RGB channel, higher is more precise
    pub color_precision: i32,
    /// Color difference between gradient layers
    pub layer_difference: i32,
    /// Decimal places in path strings
    pub path_precision: u32,
    pub max_iterations: usize,
}

impl Default for ControlValues {
    fn default() -> Self {
        Self {
            mode: PathMode::Spline,
            clustering_mode: ClusteringMode::Color,
            hierarchy: Hierarchy::Stacked,
            corner_threshold: 60,
            length_threshold: 4.0,
            splice_threshold: 45,
            filter_speckle: 4,
            color_precision: 6,
            layer_difference: 16,
            path_precision: 8,
            max_iterations: 10,
        }
    }
}

impl ControlValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a complete set of values from a preset
    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Bw => Self {
                clustering_mode: ClusteringMode::Binary,
                ..Default::default()
            },
            Preset::Poster => Self {
                color_precision: 8,
                ..Default::default()
            },
            Preset::Photo => Self {
                filter_speckle: 10,
                color_precision: 8,
                layer_difference: 48,
                corner_threshold: 180,
                ..Default::default()
            },
        }
    }

    pub fn with_mode(mut self, mode: PathMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_clustering_mode(mut self, clustering_mode: ClusteringMode) -> Self {
        self.clustering_mode = clustering_mode;
        self
    }

    pub fn with_hierarchy(mut self, hierarchy: Hierarchy) -> Self {
        self.hierarchy = hierarchy;
        self
    }

    pub fn with_corner_threshold(mut self, degrees: i32) -> Self {
        self.corner_threshold = degrees;
        self
    }

    pub fn with_length_threshold(mut self, length: f64) -> Self {
        self.length_threshold = length;
        self
    }

    pub fn with_splice_threshold(mut self, degrees: i32) -> Self {
        self.splice_threshold = degrees;
        self
    }

    pub fn with_filter_speckle(mut self, size: u32) -> Self {
        self.filter_speckle = size;
        self
    }

    pub fn with_color_precision(mut self, bits: i32) -> Self {
        self.color_precision = bits;
        self
    }

    pub fn with_layer_difference(mut self, difference: i32) -> Self {
        self.layer_difference = difference;
        self
    }

    pub fn with_path_precision(mut self, decimals: u32) -> Self {
        self.path_precision = decimals;
        self
    }

    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Check every value against the range its control offers.
    ///
    /// [`build_config`] never calls this, out-of-range values pass through
    /// unchanged. Hosts that accept free-form input call it themselves.
    pub fn validate(&self) -> Result<(), String> {
        if self.filter_speckle > 16 {
            return Err(format!(
                "Filter speckle is invalid at {}. It must be within [0,16]",
                self.filter_speckle
            ));
        }

        if !(1..=COLOR_PRECISION_BITS).contains(&self.color_precision) {
            return Err(format!(
                "Color precision is invalid at {}. It must be within [1,8]",
                self.color_precision
            ));
        }

        if !(0..=255).contains(&self.layer_difference) {
            return Err(format!(
                "Gradient step is invalid at {}. It must be within [0,255]",
                self.layer_difference
            ));
        }

        if !(0..=180).contains(&self.corner_threshold) {
            return Err(format!(
                "Corner threshold is invalid at {}. It must be within [0,180]",
                self.corner_threshold
            ));
        }

        if !(3.5..=10.0).contains(&self.length_threshold) {
            return Err(format!(
                "Segment length is invalid at {}. It must be within [3.5,10]",
                self.length_threshold
            ));
        }

        if !(0..=180).contains(&self.splice_threshold) {
            return Err(format!(
                "Splice threshold is invalid at {}. It must be within [0,180]",
                self.splice_threshold
            ));
        }

        Ok(())
    }
}

/// Convert degrees to radians
pub fn deg2rad(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

/// Engine-ready conversion configuration.
///
/// Built once per session start and never changed afterwards. A different
/// parameter means a different config and a different session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionConfig {
    canvas_id: String,
    svg_id: String,
    mode: PathMode,
    clustering_mode: ClusteringMode,
    hierarchical: Hierarchy,
    corner_threshold: f64,
    length_threshold: f64,
    max_iterations: usize,
    splice_threshold: f64,
    filter_speckle: usize,
    color_precision: i32,
    layer_difference: i32,
    path_precision: u32,
}

/// Turn raw control values into the engine config.
///
/// Angles go from degrees to radians, the speckle size is squared into an
/// area and the color precision is inverted into bits of precision loss.
pub fn build_config(controls: &ControlValues, surfaces: &SurfaceIds) -> ConversionConfig {
    let speckle = controls.filter_speckle as usize;

    ConversionConfig {
        canvas_id: surfaces.canvas_id.clone(),
        svg_id: surfaces.svg_id.clone(),
        mode: controls.mode,
        clustering_mode: controls.clustering_mode,
        hierarchical: controls.hierarchy,
        corner_threshold: deg2rad(f64::from(controls.corner_threshold)),
        length_threshold: controls.length_threshold,
        max_iterations: controls.max_iterations,
        splice_threshold: deg2rad(f64::from(controls.splice_threshold)),
        filter_speckle: speckle * speckle,
        color_precision: COLOR_PRECISION_BITS - controls.color_precision,
        layer_difference: controls.layer_difference,
        path_precision: controls.path_precision,
    }
}

impl ConversionConfig {
    /// Serialize to the flat key-value wire form
    pub fn to_wire(&self) -> ConversionResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse the flat key-value wire form
    pub fn from_wire(wire: &str) -> ConversionResult<Self> {
        serde_json::from_str(wire)
            .map_err(|e| ConversionError::configuration(format!("Malformed config record: {}", e)))
    }

    pub fn canvas_id(&self) -> &str {
        &self.canvas_id
    }

    pub fn svg_id(&self) -> &str {
        &self.svg_id
    }

    pub fn mode(&self) -> PathMode {
        self.mode
    }

    pub fn clustering_mode(&self) -> ClusteringMode {
        self.clustering_mode
    }

    pub fn hierarchical(&self) -> Hierarchy {
        self.hierarchical
    }

    /// Corner threshold in radians
    pub fn corner_threshold(&self) -> f64 {
        self.corner_threshold
    }

    pub fn length_threshold(&self) -> f64 {
        self.length_threshold
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Splice threshold in radians
    pub fn splice_threshold(&self) -> f64 {
        self.splice_threshold
    }

    /// Minimum patch area in pixels
    pub fn filter_speckle(&self) -> usize {
        self.filter_speckle
    }

    /// Bits of precision dropped per channel
    pub fn color_precision(&self) -> i32 {
        self.color_precision
    }

    pub fn layer_difference(&self) -> i32 {
        self.layer_difference
    }

    pub fn path_precision(&self) -> u32 {
        self.path_precision
    }
}
