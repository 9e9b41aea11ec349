//! Statistics and performance tracking for conversion sessions

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionOutcome {
    Pending,
    Completed,
    Stopped,
    Faulted,
}

/// Performance statistics for one or more conversion sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatistics {
    /// Number of sessions folded into these statistics
    pub session_count: usize,
    /// Scheduling quanta executed
    pub quanta: u64,
    /// Engine steps executed
    pub steps: u64,
    /// Wall-clock time spent inside quanta, in milliseconds
    pub busy_time_ms: f64,
    /// Longest single quantum, in milliseconds
    pub longest_quantum_ms: f64,
    /// Last sampled progress
    pub final_progress: u32,
    pub outcome: SessionOutcome,
    /// Timestamp of when the first session started
    pub started_at: chrono::DateTime<chrono::Utc>,
    /// Timestamp of when the last session reached a terminal state
    pub finished_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Default for SessionStatistics {
    fn default() -> Self {
        Self {
            session_count: 0,
            quanta: 0,
            steps: 0,
            busy_time_ms: 0.0,
            longest_quantum_ms: 0.0,
            final_progress: 0,
            outcome: SessionOutcome::Pending,
            started_at: chrono::Utc::now(),
            finished_at: None,
        }
    }
}

impl SessionStatistics {
    /// Create new empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Statistics for a single session that is about to run
    pub fn for_session() -> Self {
        Self {
            session_count: 1,
            ..Self::default()
        }
    }

    /// Account for one quantum
    pub fn record_quantum(&mut self, steps: u64, elapsed: Duration, progress: u32) {
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        self.quanta += 1;
        self.steps += steps;
        self.busy_time_ms += elapsed_ms;
        self.longest_quantum_ms = self.longest_quantum_ms.max(elapsed_ms);
        self.final_progress = progress;
    }

    /// Mark the session as finished
    pub fn finish(&mut self, outcome: SessionOutcome) {
        self.outcome = outcome;
        self.finished_at = Some(chrono::Utc::now());
    }

    /// Combine statistics from multiple sessions
    pub fn combine(&mut self, other: &Self) {
        if self.session_count == 0 {
            self.started_at = other.started_at;
        } else {
            self.started_at = self.started_at.min(other.started_at);
        }
        self.session_count += other.session_count;
        self.quanta += other.quanta;
        self.steps += other.steps;
        self.busy_time_ms += other.busy_time_ms;
        self.longest_quantum_ms = self.longest_quantum_ms.max(other.longest_quantum_ms);
        self.final_progress = other.final_progress;
        self.outcome = other.outcome;
        self.finished_at = other.finished_at.or(self.finished_at);
    }

    /// Average engine steps per quantum
    pub fn avg_steps_per_quantum(&self) -> f64 {
        if self.quanta > 0 {
            self.steps as f64 / self.quanta as f64
        } else {
            0.0
        }
    }

    /// Average time per quantum
    pub fn avg_quantum_ms(&self) -> f64 {
        if self.quanta > 0 {
            self.busy_time_ms / self.quanta as f64
        } else {
            0.0
        }
    }

    /// Get a formatted summary
    pub fn summary(&self) -> String {
        format!(
            "{} session(s), {} quanta, {} steps ({:.1} steps/quantum) in {:.1}ms busy, longest quantum {:.1}ms",
            self.session_count,
            self.quanta,
            self.steps,
            self.avg_steps_per_quantum(),
            self.busy_time_ms,
            self.longest_quantum_ms
        )
    }

    /// Export to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Import from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
