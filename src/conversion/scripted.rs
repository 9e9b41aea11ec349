//! Deterministic engine with an observable probe, for tests and benchmarks

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::conversion::config::ConversionConfig;
use crate::conversion::engine::{Engine, EngineFactory, PROGRESS_MAX};
use crate::error::{ConversionError, ConversionResult};

/// Something that happened to a scripted engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeEvent {
    Created(u64),
    Init(u64),
    Tick(u64),
    Free(u64),
}

#[derive(Debug, Default)]
struct ProbeState {
    next_engine: Cell<u64>,
    ticks: Cell<u64>,
    frees: Cell<u64>,
    live: Cell<u64>,
    events: RefCell<Vec<ProbeEvent>>,
}

/// Shared record of every scripted engine created from one factory
#[derive(Debug, Clone, Default)]
pub struct EngineProbe {
    state: Rc<ProbeState>,
}

impl EngineProbe {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&self) -> u64 {
        let id = self.state.next_engine.get() + 1;
        self.state.next_engine.set(id);
        self.state.live.set(self.state.live.get() + 1);
        self.record(ProbeEvent::Created(id));
        id
    }

    fn record(&self, event: ProbeEvent) {
        match event {
            ProbeEvent::Tick(_) => self.state.ticks.set(self.state.ticks.get() + 1),
            ProbeEvent::Free(_) => {
                self.state.frees.set(self.state.frees.get() + 1);
                self.state.live.set(self.state.live.get() - 1);
            }
            _ => {}
        }
        self.state.events.borrow_mut().push(event);
    }

    /// Engines created so far
    pub fn created(&self) -> u64 {
        self.state.next_engine.get()
    }

    pub fn ticks(&self) -> u64 {
        self.state.ticks.get()
    }

    pub fn frees(&self) -> u64 {
        self.state.frees.get()
    }

    /// Engines created and not yet released
    pub fn live(&self) -> u64 {
        self.state.live.get()
    }

    pub fn events(&self) -> Vec<ProbeEvent> {
        self.state.events.borrow().clone()
    }

    /// Ticks performed by one engine
    pub fn ticks_of(&self, engine: u64) -> usize {
        self.state
            .events
            .borrow()
            .iter()
            .filter(|event| **event == ProbeEvent::Tick(engine))
            .count()
    }
}

/// Finishes after a fixed number of steps, progress grows linearly
pub struct ScriptedEngine {
    id: u64,
    probe: EngineProbe,
    steps: u32,
    done: u32,
    initialized: bool,
    fail_at: Option<u32>,
    step_delay: Duration,
}

impl ScriptedEngine {
    pub fn new(steps: u32, probe: &EngineProbe) -> Self {
        Self {
            id: probe.register(),
            probe: probe.clone(),
            steps,
            done: 0,
            initialized: false,
            fail_at: None,
            step_delay: Duration::ZERO,
        }
    }

    /// Fail with an engine fault on the given step (1-based)
    pub fn with_fault_at(mut self, step: u32) -> Self {
        self.fail_at = Some(step);
        self
    }

    /// Busy each step for `delay`
    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Engine for ScriptedEngine {
    fn init(&mut self) -> ConversionResult<()> {
        if self.initialized {
            return Err(ConversionError::engine_fault("scripted engine initialized twice"));
        }
        self.initialized = true;
        self.probe.record(ProbeEvent::Init(self.id));
        Ok(())
    }

    fn tick(&mut self) -> ConversionResult<bool> {
        if !self.initialized {
            return Err(ConversionError::engine_fault("scripted engine ticked before init"));
        }
        if self.done >= self.steps {
            return Ok(true);
        }

        self.probe.record(ProbeEvent::Tick(self.id));
        if self.fail_at == Some(self.done + 1) {
            return Err(ConversionError::engine_fault(format!(
                "scripted fault at step {}",
                self.done + 1
            )));
        }
        if !self.step_delay.is_zero() {
            std::thread::sleep(self.step_delay);
        }

        self.done += 1;
        Ok(self.done >= self.steps)
    }

    fn progress(&self) -> u32 {
        if self.steps == 0 {
            return PROGRESS_MAX;
        }
        PROGRESS_MAX * self.done / self.steps
    }

    fn free(self: Box<Self>) {
        self.probe.record(ProbeEvent::Free(self.id));
    }
}

/// Factory handing out [`ScriptedEngine`]s that share one probe
#[derive(Debug, Clone)]
pub struct ScriptedFactory {
    probe: EngineProbe,
    steps: u32,
    fail_at: Option<u32>,
    step_delay: Duration,
    source_loaded: Rc<Cell<bool>>,
}

impl ScriptedFactory {
    pub fn new(steps: u32) -> Self {
        Self {
            probe: EngineProbe::new(),
            steps,
            fail_at: None,
            step_delay: Duration::ZERO,
            source_loaded: Rc::new(Cell::new(true)),
        }
    }

    pub fn with_fault_at(mut self, step: u32) -> Self {
        self.fail_at = Some(step);
        self
    }

    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    pub fn probe(&self) -> &EngineProbe {
        &self.probe
    }

    /// Simulate loading or unloading the source raster
    pub fn set_source_loaded(&self, loaded: bool) {
        self.source_loaded.set(loaded);
    }
}

impl EngineFactory for ScriptedFactory {
    fn create(&self, _config: &ConversionConfig) -> ConversionResult<Box<dyn Engine>> {
        let mut engine =
            ScriptedEngine::new(self.steps, &self.probe).with_step_delay(self.step_delay);
        if let Some(step) = self.fail_at {
            engine = engine.with_fault_at(step);
        }
        Ok(Box::new(engine))
    }

    fn source_ready(&self, _config: &ConversionConfig) -> bool {
        self.source_loaded.get()
    }
}
