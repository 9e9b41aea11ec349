//! Session coordinator: keeps at most one session running

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::scheduler::Scheduler;
use super::session::{ConversionSession, SliceConfig};
use crate::conversion::{ConversionConfig, EngineFactory, SessionStatistics};
use crate::error::ConversionResult;
use crate::presentation::SharedSink;

/// Result of asking the coordinator for a new session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestartOutcome {
    /// A new session with this id is running
    Started(u64),
    /// No source raster is loaded, nothing changed
    NoSource,
}

/// Replaces the running session whenever the configuration changes.
///
/// The previous session is stopped, and its engine released, before the
/// next engine is even created. Two engines therefore never step
/// concurrently.
pub struct SessionCoordinator<F: EngineFactory> {
    factory: F,
    scheduler: Rc<dyn Scheduler>,
    sink: SharedSink,
    slice: SliceConfig,
    current: Option<ConversionSession>,
    next_id: u64,
    retired: SessionStatistics,
}

impl<F: EngineFactory> SessionCoordinator<F> {
    pub fn new(factory: F, scheduler: Rc<dyn Scheduler>, sink: SharedSink) -> Self {
        Self {
            factory,
            scheduler,
            sink,
            slice: SliceConfig::default(),
            current: None,
            next_id: 0,
            retired: SessionStatistics::new(),
        }
    }

    /// Time slicing applied to sessions started from now on
    pub fn with_slice_config(mut self, slice: SliceConfig) -> Self {
        self.slice = slice;
        self
    }

    /// Stop the current session and start a new one for `config`
    pub fn restart(&mut self, config: ConversionConfig) -> ConversionResult<RestartOutcome> {
        if !self.factory.source_ready(&config) {
            debug!(canvas = config.canvas_id(), "restart ignored, no source raster");
            return Ok(RestartOutcome::NoSource);
        }

        self.retire_current();

        let engine = self.factory.create(&config)?;
        self.next_id += 1;
        let session = ConversionSession::new(
            self.next_id,
            config,
            engine,
            self.sink.clone(),
            self.slice,
        )?;
        session.start(self.scheduler.clone())?;

        let id = session.id();
        self.current = Some(session);
        Ok(RestartOutcome::Started(id))
    }

    /// Stop the current session, returns whether anything was stopped
    pub fn stop(&mut self) -> bool {
        self.current
            .as_ref()
            .map(ConversionSession::stop)
            .unwrap_or(false)
    }

    /// The most recently started session, whatever its state
    pub fn current(&self) -> Option<&ConversionSession> {
        self.current.as_ref()
    }

    /// Statistics of every session started by this coordinator
    pub fn statistics(&self) -> SessionStatistics {
        let mut total = self.retired.clone();
        if let Some(session) = &self.current {
            total.combine(&session.stats());
        }
        total
    }

    pub fn sessions_started(&self) -> u64 {
        self.next_id
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn sink(&self) -> &SharedSink {
        &self.sink
    }

    fn retire_current(&mut self) {
        if let Some(previous) = self.current.take() {
            if previous.stop() {
                debug!(session = previous.id(), "superseded");
            }
            self.retired.combine(&previous.stats());
        }
    }
}
