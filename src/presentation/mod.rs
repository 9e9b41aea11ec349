//! Presentation sink: visual feedback pushed by a running session

pub mod terminal;

pub use terminal::TerminalSink;

use std::cell::RefCell;
use std::rc::Rc;

use crate::conversion::ClusteringMode;
use crate::surface::VectorSurface;

/// Background painted behind the vector output of binary conversions
pub const BINARY_BACKGROUND: &str = "#fff";

/// Receives progress and turns it into visual state.
///
/// Sessions call these between quanta only, never while an engine step runs.
pub trait PresentationSink {
    /// A session started: show the processing visual and clear the vector output
    fn processing_started(&mut self, clustering: ClusteringMode);

    /// Progress sampled after a quantum
    fn progress_changed(&mut self, value: u32, max: u32);

    /// Preview raster opacity while progress is below the halfway mark
    fn preview_faded(&mut self, opacity: f64);

    /// Progress reached the halfway mark, vector output takes over
    fn preview_hidden(&mut self);

    /// Progress reached its maximum: reset and hide the indicator
    fn progress_finished(&mut self);
}

pub type SharedSink = Rc<RefCell<dyn PresentationSink>>;

/// Everything a user would see of a conversion
#[derive(Debug, Clone, PartialEq)]
pub struct VisualState {
    pub preview_visible: bool,
    /// Opacity of the preview raster in `[0, 1]`
    pub preview_opacity: f64,
    pub vector_background: Option<&'static str>,
    pub progress_visible: bool,
    pub progress_value: u32,
    pub progress_max: u32,
}

impl Default for VisualState {
    fn default() -> Self {
        Self {
            preview_visible: false,
            preview_opacity: 1.0,
            vector_background: None,
            progress_visible: false,
            progress_value: 0,
            progress_max: crate::conversion::PROGRESS_MAX,
        }
    }
}

/// Models the preview area: raster preview, vector output and progress bar
#[derive(Debug, Default)]
pub struct PreviewPanel {
    state: VisualState,
    vector: Option<VectorSurface>,
}

impl PreviewPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear this surface whenever a session starts
    pub fn with_vector_surface(mut self, vector: VectorSurface) -> Self {
        self.vector = Some(vector);
        self
    }

    pub fn state(&self) -> &VisualState {
        &self.state
    }

    pub fn shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }
}

impl PresentationSink for PreviewPanel {
    fn processing_started(&mut self, clustering: ClusteringMode) {
        if let Some(vector) = &self.vector {
            vector.clear();
        }

        match clustering {
            ClusteringMode::Binary => {
                self.state.vector_background = Some(BINARY_BACKGROUND);
                self.state.preview_visible = false;
            }
            ClusteringMode::Color => {
                self.state.vector_background = None;
                self.state.preview_visible = true;
            }
        }
        self.state.preview_opacity = 1.0;
        self.state.progress_value = 0;
        self.state.progress_visible = true;
    }

    fn progress_changed(&mut self, value: u32, max: u32) {
        self.state.progress_value = value;
        self.state.progress_max = max;
    }

    fn preview_faded(&mut self, opacity: f64) {
        self.state.preview_opacity = opacity.clamp(0.0, 1.0);
    }

    fn preview_hidden(&mut self) {
        self.state.preview_visible = false;
    }

    fn progress_finished(&mut self) {
        self.state.progress_value = 0;
        self.state.progress_visible = false;
    }
}

/// Discards all feedback
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl PresentationSink for NullSink {
    fn processing_started(&mut self, _clustering: ClusteringMode) {}
    fn progress_changed(&mut self, _value: u32, _max: u32) {}
    fn preview_faded(&mut self, _opacity: f64) {}
    fn preview_hidden(&mut self) {}
    fn progress_finished(&mut self) {}
}
