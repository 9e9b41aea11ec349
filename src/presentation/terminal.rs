//! Terminal presentation: mirrors the preview panel onto a progress bar

use indicatif::{ProgressBar, ProgressStyle};

use super::{PresentationSink, PreviewPanel, VisualState};
use crate::conversion::{ClusteringMode, PROGRESS_MAX};
use crate::surface::VectorSurface;

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}";

pub struct TerminalSink {
    panel: PreviewPanel,
    bar: ProgressBar,
}

impl TerminalSink {
    /// Draw a progress bar on stderr
    pub fn new() -> Self {
        let bar = ProgressBar::new(u64::from(PROGRESS_MAX));
        let style = ProgressStyle::default_bar()
            .template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        bar.set_style(style);
        Self::with_bar(bar)
    }

    /// Track state without drawing anything
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden())
    }

    pub fn with_bar(bar: ProgressBar) -> Self {
        Self {
            panel: PreviewPanel::new(),
            bar,
        }
    }

    pub fn with_vector_surface(mut self, vector: VectorSurface) -> Self {
        self.panel = self.panel.with_vector_surface(vector);
        self
    }

    pub fn state(&self) -> &VisualState {
        self.panel.state()
    }
}

impl Default for TerminalSink {
    fn default() -> Self {
        Self::new()
    }
}

impl PresentationSink for TerminalSink {
    fn processing_started(&mut self, clustering: ClusteringMode) {
        self.panel.processing_started(clustering);
        self.bar.reset();
        self.bar.set_message(match clustering {
            ClusteringMode::Binary => "tracing",
            ClusteringMode::Color => "clustering",
        });
    }

    fn progress_changed(&mut self, value: u32, max: u32) {
        self.panel.progress_changed(value, max);
        self.bar.set_length(u64::from(max));
        self.bar.set_position(u64::from(value));
    }

    fn preview_faded(&mut self, opacity: f64) {
        self.panel.preview_faded(opacity);
    }

    fn preview_hidden(&mut self) {
        if self.panel.state().preview_visible {
            self.bar.set_message("tracing");
        }
        self.panel.preview_hidden();
    }

    fn progress_finished(&mut self) {
        self.panel.progress_finished();
        self.bar.finish_and_clear();
    }
}
