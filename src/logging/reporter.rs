//! Progress reporting for queue execution.

use tracing::{debug, info, warn};

use super::Verbosity;
use crate::actions::{Action, ExecutionError};

/// Default number of completed actions between progress lines.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 10;

/// Receives queue lifecycle events.
pub trait Reporter {
    /// Execution is about to start. `total` includes actions already
    /// executed immediately.
    fn queue_started(&mut self, total: usize);

    /// `completed` of `total` actions have been resolved so far.
    fn progress(&mut self, completed: usize, total: usize);

    /// An action bypassed the queue; `completed` immediate actions are done.
    fn executed_immediately(&mut self, action: &Action, completed: usize);

    /// The API rejected an action.
    fn action_failed(&mut self, action: &Action, errors: &[ExecutionError]);
}

/// Reporter that emits `tracing` events at a bounded cadence.
#[derive(Debug, Clone)]
pub struct TracingReporter {
    verbosity: Verbosity,
    interval: usize,
    last_reported: usize,
}

impl TracingReporter {
    #[must_use]
    pub const fn new(verbosity: Verbosity) -> Self {
        Self::with_interval(verbosity, DEFAULT_PROGRESS_INTERVAL)
    }

    /// Report progress every `interval` completed actions (minimum 1).
    #[must_use]
    pub const fn with_interval(verbosity: Verbosity, interval: usize) -> Self {
        Self {
            verbosity,
            interval: if interval == 0 { 1 } else { interval },
            last_reported: 0,
        }
    }

    /// Whether a progress line is due.
    ///
    /// Due when `completed` crossed a multiple of the interval since the last
    /// line, or when everything is done.
    #[must_use]
    pub const fn is_due(&self, completed: usize, total: usize) -> bool {
        if completed <= self.last_reported {
            return false;
        }
        completed >= total || completed / self.interval > self.last_reported / self.interval
    }
}

impl Reporter for TracingReporter {
    fn queue_started(&mut self, total: usize) {
        self.last_reported = 0;
        if self.verbosity >= Verbosity::Info {
            info!(total, "Number of actions to execute: {total}");
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn progress(&mut self, completed: usize, total: usize) {
        if !self.is_due(completed, total) {
            return;
        }
        self.last_reported = completed;
        if self.verbosity >= Verbosity::Info {
            let percent = if total == 0 {
                100.0
            } else {
                (completed as f64 / total as f64 * 10_000.0).round() / 100.0
            };
            info!(completed, total, "Completion: {completed}/{total} ({percent}%)");
        }
    }

    fn executed_immediately(&mut self, action: &Action, completed: usize) {
        if self.verbosity >= Verbosity::Info {
            info!(
                key = action.key(),
                completed,
                "{} executed immediately ({completed} so far)",
                action.operation()
            );
        }
    }

    fn action_failed(&mut self, action: &Action, errors: &[ExecutionError]) {
        match self.verbosity {
            Verbosity::Quiet => {},
            Verbosity::Info => {
                warn!(key = action.key(), errors = errors.len(), "{} failed", action.operation());
            },
            Verbosity::Debug => {
                for error in errors {
                    debug!(key = action.key(), kind = %error.kind, "{}", error.message);
                }
            },
        }
    }
}

/// Reporter that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn queue_started(&mut self, _total: usize) {}

    fn progress(&mut self, _completed: usize, _total: usize) {}

    fn executed_immediately(&mut self, _action: &Action, _completed: usize) {}

    fn action_failed(&mut self, _action: &Action, _errors: &[ExecutionError]) {}
}
