//! External input boundary
//!
//! When IO is enabled the machine pulls at most one event per tick from an
//! installed [`InputSource`]. An absent event is the normal idle result,
//! not an error.

use crate::machine::task::Pid;
use std::collections::VecDeque;

/// Provider of external input events
pub trait InputSource<V> {
    /// Pull the next input event: a target task and the signals to append
    /// to its pending queue, in order. `None` means no input this tick.
    fn pull(&mut self) -> Option<(Pid, Vec<V>)>;
}

/// Replays a fixed per-tick script of input events
///
/// Each entry corresponds to one pull; `None` entries are idle ticks. Once
/// the script runs out every further pull is idle. Deterministic stand-in
/// for a console source in tests.
pub struct ScriptedInput<V> {
    events: VecDeque<Option<(Pid, Vec<V>)>>,
}

impl<V> ScriptedInput<V> {
    /// Create a script from per-tick entries
    pub fn new(events: Vec<Option<(Pid, Vec<V>)>>) -> Self {
        Self {
            events: events.into(),
        }
    }
}

impl<V> InputSource<V> for ScriptedInput<V> {
    fn pull(&mut self) -> Option<(Pid, Vec<V>)> {
        self.events.pop_front().flatten()
    }
}
