//! Task identity and the active-pool record

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;

/// Unique identifier for a task in the active pool
///
/// Assigned monotonically by the machine the moment a task enters the pool
/// (not at registration time for delayed or queued tasks). Never reused
/// within a run.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Pid(u64);

impl Pid {
    /// Get the numeric ID value
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Create a Pid from a u64 value
    pub fn from_u64(id: u64) -> Self {
        Pid(id)
    }
}

/// Result of one step-function invocation: the new state and whether the
/// task has reached its terminal state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step<V> {
    /// State the task carries into the next tick
    pub state: V,
    /// True when the task terminates on this step
    pub done: bool,
}

impl<V> Step<V> {
    /// Continue running with a new state
    pub fn running(state: V) -> Self {
        Step { state, done: false }
    }

    /// Terminate with a final state
    pub fn done(state: V) -> Self {
        Step { state, done: true }
    }
}

/// A task's transition function
///
/// Pure: consumes the current state and an optional input signal, produces
/// the new state and a termination flag. Must not touch machine state.
pub type StepFn<V> = Arc<dyn Fn(&V, Option<&V>) -> Step<V>>;

/// A task resident in the active pool
///
/// Owned exclusively by the pool; created on dispatch, removed the same
/// tick it terminates.
pub struct ActiveTask<V> {
    pub(crate) step: StepFn<V>,
    pub(crate) state: V,
    pub(crate) pending: VecDeque<V>,
}

impl<V> ActiveTask<V> {
    /// Create a pool record with an initial state and pending signals
    pub(crate) fn new(step: StepFn<V>, state: V, signals: Vec<V>) -> Self {
        Self {
            step,
            state,
            pending: signals.into(),
        }
    }

    /// The task's current state
    pub fn state(&self) -> &V {
        &self.state
    }

    /// Signals waiting to be consumed, front first
    pub fn pending(&self) -> &VecDeque<V> {
        &self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pid_roundtrip() {
        let pid = Pid::from_u64(3);
        assert_eq!(pid.as_u64(), 3);
    }

    #[test]
    fn test_pid_ordering() {
        assert!(Pid::from_u64(0) < Pid::from_u64(1));
        assert_eq!(Pid::from_u64(2), Pid::from_u64(2));
    }

    #[test]
    fn test_step_constructors() {
        let step = Step::running("0");
        assert_eq!(step.state, "0");
        assert!(!step.done);

        let step = Step::done("1");
        assert_eq!(step.state, "1");
        assert!(step.done);
    }

    #[test]
    fn test_active_task_pending_order() {
        let step: StepFn<&str> = Arc::new(|state, _| Step::running(*state));
        let task = ActiveTask::new(step, "0", vec!["a", "b", "c"]);

        assert_eq!(task.state(), &"0");
        assert_eq!(task.pending().len(), 3);
        assert_eq!(task.pending().front(), Some(&"a"));
    }
}
