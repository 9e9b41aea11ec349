//! Conversion session: drives one engine in time-sliced quanta

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::scheduler::Scheduler;
use crate::conversion::{ConversionConfig, Engine, SessionOutcome, SessionStatistics};
use crate::error::{ConversionError, ConversionErrorKind, ConversionResult};
use crate::presentation::SharedSink;

/// Wall-clock budget of one quantum
pub const DEFAULT_BUDGET: Duration = Duration::from_millis(25);

/// Delay before the next quantum
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1);

/// Time slicing of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceConfig {
    budget: Duration,
    delay: Duration,
}

impl Default for SliceConfig {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET,
            delay: DEFAULT_DELAY,
        }
    }
}

impl SliceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn validate(&self) -> ConversionResult<()> {
        if self.budget.is_zero() {
            return Err(ConversionError::configuration(
                "Quantum budget must be greater than zero",
            ));
        }
        if self.delay > Duration::from_secs(1) {
            return Err(ConversionError::configuration(format!(
                "Quantum delay of {}ms exceeds 1000ms",
                self.delay.as_millis()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Created,
    Running,
    Completed,
    Stopped,
    Faulted,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Created => "created",
            SessionState::Running => "running",
            SessionState::Completed => "completed",
            SessionState::Stopped => "stopped",
            SessionState::Faulted => "faulted",
        }
    }

    /// No further quanta will ever run
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Stopped | SessionState::Faulted
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct SessionCore {
    state: Rc<Cell<SessionState>>,
    engine: Option<Box<dyn Engine>>,
    /// Progress cached when the engine is released
    progress: u32,
    progress_max: u32,
    stats: SessionStatistics,
}

impl SessionCore {
    /// Release the engine, if still held, keeping its last progress
    fn release(&mut self) -> bool {
        match self.engine.take() {
            Some(engine) => {
                self.progress = engine.progress();
                self.progress_max = engine.progress_max();
                engine.free();
                true
            }
            None => false,
        }
    }

    fn finish(&mut self, state: SessionState, outcome: SessionOutcome) {
        self.release();
        self.state.set(state);
        self.stats.finish(outcome);
    }
}

/// One conversion run with one configuration.
///
/// The session owns its engine exclusively. It is single-threaded: quanta
/// are deferred onto a [`Scheduler`] and never overlap.
pub struct ConversionSession {
    id: u64,
    config: ConversionConfig,
    /// Readable while a quantum holds `core`
    state: Rc<Cell<SessionState>>,
    core: Rc<RefCell<SessionCore>>,
    cancelled: Rc<Cell<bool>>,
    sink: SharedSink,
    slice: SliceConfig,
}

impl ConversionSession {
    /// Take ownership of `engine` and initialize it.
    ///
    /// An engine whose `init` fails is released before the error is returned.
    pub fn new(
        id: u64,
        config: ConversionConfig,
        mut engine: Box<dyn Engine>,
        sink: SharedSink,
        slice: SliceConfig,
    ) -> ConversionResult<Self> {
        if let Err(err) = engine.init() {
            warn!(session = id, error = %err, "engine init failed");
            engine.free();
            return Err(err);
        }

        let progress_max = engine.progress_max();
        let state = Rc::new(Cell::new(SessionState::Created));
        let core = SessionCore {
            state: state.clone(),
            progress: 0,
            progress_max,
            engine: Some(engine),
            stats: SessionStatistics::for_session(),
        };

        Ok(Self {
            id,
            config,
            state,
            core: Rc::new(RefCell::new(core)),
            cancelled: Rc::new(Cell::new(false)),
            sink,
            slice,
        })
    }

    /// Switch the sink to the processing visual and defer the first quantum
    pub fn start(&self, scheduler: Rc<dyn Scheduler>) -> ConversionResult<()> {
        let state = self.state.get();
        if state != SessionState::Created {
            return Err(ConversionError::conversion(
                ConversionErrorKind::InvalidState {
                    session: self.id,
                    state: state.to_string(),
                    action: "start".to_string(),
                },
            ));
        }
        self.state.set(SessionState::Running);
        let progress_max = self.core.borrow().progress_max;

        {
            let mut sink = self.sink.borrow_mut();
            sink.processing_started(self.config.clustering_mode());
            sink.progress_changed(0, progress_max);
        }

        info!(
            session = self.id,
            mode = self.config.mode().as_str(),
            clustering = self.config.clustering_mode().as_str(),
            hierarchy = self.config.hierarchical().as_str(),
            "session started"
        );

        let quantum = Quantum {
            session: self.id,
            core: self.core.clone(),
            cancelled: self.cancelled.clone(),
            sink: self.sink.clone(),
            slice: self.slice,
            scheduler: scheduler.clone(),
        };
        scheduler.defer(self.slice.delay(), Box::new(move || quantum.run()));
        Ok(())
    }

    /// Cancel the session and release its engine.
    ///
    /// Returns `false` when there was nothing to stop: the session already
    /// reached a terminal state or was stopped before. Called from inside a
    /// running quantum, the engine is released when that quantum ends.
    pub fn stop(&self) -> bool {
        if self.cancelled.get() || self.state.get().is_terminal() {
            return false;
        }
        self.cancelled.set(true);

        let Ok(mut core) = self.core.try_borrow_mut() else {
            // The quantum holding the core sees the flag after its current step
            debug!(session = self.id, "stop requested during a quantum");
            return true;
        };
        core.finish(SessionState::Stopped, SessionOutcome::Stopped);
        info!(session = self.id, progress = core.progress, "session stopped");
        true
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn slice(&self) -> SliceConfig {
        self.slice
    }

    pub fn state(&self) -> SessionState {
        self.state.get()
    }

    /// Whether the session still holds its engine
    pub fn holds_engine(&self) -> bool {
        self.core.borrow().engine.is_some()
    }

    /// Current progress, or the progress cached when the engine was released
    pub fn progress(&self) -> u32 {
        let core = self.core.borrow();
        match &core.engine {
            Some(engine) => engine.progress(),
            None => core.progress,
        }
    }

    pub fn progress_max(&self) -> u32 {
        self.core.borrow().progress_max
    }

    pub fn stats(&self) -> SessionStatistics {
        self.core.borrow().stats.clone()
    }
}

impl fmt::Debug for ConversionSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionSession")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("cancelled", &self.cancelled.get())
            .field("slice", &self.slice)
            .finish()
    }
}

/// The deferred continuation of a running session
struct Quantum {
    session: u64,
    core: Rc<RefCell<SessionCore>>,
    cancelled: Rc<Cell<bool>>,
    sink: SharedSink,
    slice: SliceConfig,
    scheduler: Rc<dyn Scheduler>,
}

/// What a burst of engine steps ended with
struct Burst {
    done: bool,
    steps: u64,
    progress: u32,
    max: u32,
}

impl Quantum {
    fn run(self) -> ConversionResult<()> {
        if self.cancelled.get() {
            self.release_if_held();
            debug!(session = self.session, "quantum skipped, session stopped");
            return Ok(());
        }

        let burst = self.burst()?;
        debug!(
            session = self.session,
            steps = burst.steps,
            progress = burst.progress,
            "quantum finished"
        );

        // Stopped from inside the burst
        if self.cancelled.get() {
            self.release_if_held();
            return Ok(());
        }

        self.notify(burst.progress, burst.max);

        // The sink may have stopped this session
        if self.cancelled.get() {
            self.release_if_held();
            return Ok(());
        }

        if burst.done {
            let mut core = self.core.borrow_mut();
            core.finish(SessionState::Completed, SessionOutcome::Completed);
            info!(
                session = self.session,
                quanta = core.stats.quanta,
                steps = core.stats.steps,
                "session completed"
            );
            return Ok(());
        }

        let scheduler = self.scheduler.clone();
        let delay = self.slice.delay();
        scheduler.defer(delay, Box::new(move || self.run()));
        Ok(())
    }

    /// Step the engine until done or until the budget is spent, at least once
    fn burst(&self) -> ConversionResult<Burst> {
        let started = Instant::now();
        let mut core = self.core.borrow_mut();
        let core = &mut *core;

        let Some(engine) = core.engine.as_mut() else {
            return Err(ConversionError::conversion(
                ConversionErrorKind::UseAfterRelease {
                    session: self.session,
                },
            ));
        };

        let mut steps = 0;
        let result = loop {
            steps += 1;
            match engine.tick() {
                Ok(true) => break Ok(true),
                Ok(false) if self.cancelled.get() => break Ok(false),
                Ok(false) if started.elapsed() >= self.slice.budget() => break Ok(false),
                Ok(false) => {}
                Err(err) => break Err(err),
            }
        };

        let progress = engine.progress();
        let max = engine.progress_max();
        core.stats.record_quantum(steps, started.elapsed(), progress);

        match result {
            Ok(done) => {
                core.progress = progress;
                core.progress_max = max;
                Ok(Burst {
                    done,
                    steps,
                    progress,
                    max,
                })
            }
            Err(err) => {
                core.finish(SessionState::Faulted, SessionOutcome::Faulted);
                error!(session = self.session, error = %err, "engine fault, session abandoned");
                Err(err)
            }
        }
    }

    fn notify(&self, progress: u32, max: u32) {
        let percent = if max == 0 {
            100.0
        } else {
            f64::from(progress) * 100.0 / f64::from(max)
        };

        let mut sink = self.sink.borrow_mut();
        sink.progress_changed(progress, max);
        if percent < 50.0 {
            sink.preview_faded((50.0 - percent) / 25.0);
        } else {
            sink.preview_hidden();
        }
        if progress >= max {
            sink.progress_finished();
        }
    }

    /// Finish a stop that arrived while this quantum held the session state
    fn release_if_held(&self) {
        let mut core = self.core.borrow_mut();
        if !core.state.get().is_terminal() {
            core.finish(SessionState::Stopped, SessionOutcome::Stopped);
            info!(session = self.session, "session stopped");
        }
    }
}
