//! Cooperative, single-threaded deferred task scheduling

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::error::ConversionResult;

/// A deferred continuation
pub type Task = Box<dyn FnOnce() -> ConversionResult<()>>;

/// The host's cooperative scheduler.
///
/// `defer` never runs the task inline; it runs later, on the same thread,
/// once the host gets back to its event loop.
pub trait Scheduler {
    fn defer(&self, delay: Duration, task: Task);
}

struct Deferred {
    due: Instant,
    task: Task,
}

#[derive(Default)]
struct Queue {
    tasks: RefCell<VecDeque<Deferred>>,
}

/// Single-threaded event loop running deferred tasks in due order.
///
/// Tasks with the same due time run in the order they were deferred.
/// Clones share the same queue.
#[derive(Clone, Default)]
pub struct LocalScheduler {
    queue: Rc<Queue>,
}

impl LocalScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tasks waiting to run
    pub fn pending(&self) -> usize {
        self.queue.tasks.borrow().len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    /// Run the next task, sleeping until it is due.
    ///
    /// Returns `Ok(false)` when the queue is empty. A failing task's error is
    /// handed to the caller; tasks still queued stay queued.
    pub fn run_next(&self) -> ConversionResult<bool> {
        // The borrow must end before the task runs, tasks defer more tasks
        let next = self.queue.tasks.borrow_mut().pop_front();
        let Some(deferred) = next else {
            return Ok(false);
        };

        let now = Instant::now();
        if deferred.due > now {
            std::thread::sleep(deferred.due - now);
        }

        (deferred.task)()?;
        Ok(true)
    }

    /// Run tasks until the queue drains, returns how many ran
    pub fn run_until_idle(&self) -> ConversionResult<u64> {
        let mut ran = 0;
        while self.run_next()? {
            ran += 1;
        }
        Ok(ran)
    }

    /// Run at most `limit` tasks, returns how many ran
    pub fn run_for(&self, limit: usize) -> ConversionResult<usize> {
        let mut ran = 0;
        while ran < limit && self.run_next()? {
            ran += 1;
        }
        Ok(ran)
    }
}

impl Scheduler for LocalScheduler {
    fn defer(&self, delay: Duration, task: Task) {
        let due = Instant::now() + delay;
        let mut tasks = self.queue.tasks.borrow_mut();
        let position = tasks
            .iter()
            .position(|queued| queued.due > due)
            .unwrap_or(tasks.len());
        tasks.insert(position, Deferred { due, task });
    }
}
