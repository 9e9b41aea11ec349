//! Incremental conversion runner
//!
//! A [`ConversionSession`] advances one engine in short, time-boxed quanta
//! on a cooperative [`Scheduler`]. The [`SessionCoordinator`] makes sure a
//! configuration change stops the old session before a new one starts.

pub mod coordinator;
pub mod scheduler;
pub mod session;

pub use coordinator::{RestartOutcome, SessionCoordinator};
pub use scheduler::{LocalScheduler, Scheduler, Task};
pub use session::{ConversionSession, SessionState, SliceConfig, DEFAULT_BUDGET, DEFAULT_DELAY};
