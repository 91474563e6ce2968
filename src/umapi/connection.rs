//! The connection contract consumed by the action queue.

use crate::actions::{Action, ActionId, ExecutionError};

/// Errors reported for one action by a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionFailure {
    pub id: ActionId,
    pub errors: Vec<ExecutionError>,
}

/// What a connection did during one call.
///
/// Counts are per action. A call that only buffered its action reports
/// all zeros.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// Actions physically transmitted by this call.
    pub submitted: usize,
    /// Transmitted actions the API applied.
    pub succeeded: usize,
    /// Transmitted actions the API rejected (or that never got an answer).
    pub failed: usize,
    /// Per-action errors for the failed actions.
    pub failures: Vec<ActionFailure>,
}

impl ExecutionOutcome {
    /// An outcome where nothing was transmitted.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            submitted: 0,
            succeeded: 0,
            failed: 0,
            failures: Vec::new(),
        }
    }

    /// Actions resolved by this call, successfully or not.
    #[must_use]
    pub const fn completed(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Fold another outcome into this one.
    pub fn merge(&mut self, other: Self) {
        self.submitted += other.submitted;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.failures.extend(other.failures);
    }
}

/// A session with the remote API.
///
/// Implementations may buffer actions and transmit several in one request;
/// errors for a buffered action come back in the outcome of whichever call
/// transmits it.
#[cfg_attr(test, mockall::automock)]
pub trait Connection {
    /// Offer one action. May only buffer it.
    fn execute_single(&mut self, id: ActionId, action: &Action) -> ExecutionOutcome;

    /// Transmit everything still buffered.
    fn execute_queued(&mut self) -> ExecutionOutcome;

    /// Transmit one action on its own, outside of any batch.
    fn execute_immediate(&mut self, id: ActionId, action: &Action) -> ExecutionOutcome {
        let mut outcome = self.execute_single(id, action);
        outcome.merge(self.execute_queued());
        outcome
    }
}
