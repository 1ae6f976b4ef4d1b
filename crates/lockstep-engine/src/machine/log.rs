//! Tick-indexed execution log
//!
//! The sole observable artifact of a run: an append-only record of which
//! tasks were dispatched and which terminated, bucketed per tick.

use crate::machine::task::Pid;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One discrete unit of simulated time
pub type Tick = u64;

/// What happened to a task
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// The task entered the active pool
    Execute,
    /// The task returned its termination flag
    Terminate,
}

/// A single log entry
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// What happened
    pub kind: EventKind,
    /// To whom
    pub pid: Pid,
}

/// Append-only per-tick record of Execute/Terminate events
///
/// Buckets are created lazily the first time a tick is touched; a touched
/// tick with no events still appears, with an empty bucket.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionLog {
    ticks: BTreeMap<Tick, Vec<Event>>,
}

impl ExecutionLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure a bucket exists for the given tick
    pub(crate) fn touch(&mut self, tick: Tick) {
        self.ticks.entry(tick).or_default();
    }

    /// Append an event to the given tick's bucket
    pub(crate) fn record(&mut self, tick: Tick, kind: EventKind, pid: Pid) {
        self.ticks.entry(tick).or_default().push(Event { kind, pid });
    }

    /// Events recorded at a tick, in append order; empty if the tick was
    /// never touched
    pub fn events_at(&self, tick: Tick) -> &[Event] {
        self.ticks.get(&tick).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate over touched ticks in ascending order
    pub fn ticks(&self) -> impl Iterator<Item = (Tick, &[Event])> {
        self.ticks.iter().map(|(tick, events)| (*tick, events.as_slice()))
    }

    /// Number of touched ticks
    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    /// Whether any tick has been touched
    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }
}
