//! Dispatch registries feeding tasks into the active pool
//!
//! Three independent structures with different timing rules: the delay
//! registry promotes a task when its countdown reaches zero, the dispatch
//! queue admits at most one task at a time, and the channel map links
//! producer output to consumer input each tick.

use crate::machine::task::{Pid, StepFn};
use std::collections::{BTreeMap, VecDeque};

/// Registration-time key for a delayed task
///
/// Numbered independently of [`Pid`]; a delayed task gets its Pid only when
/// it is promoted into the active pool.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DelayKey(u64);

impl DelayKey {
    /// Get the numeric key value
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Create a DelayKey from a u64 value
    pub fn from_u64(key: u64) -> Self {
        DelayKey(key)
    }
}

/// A task waiting out its delay countdown
pub(crate) struct DelayedTask<V> {
    step: StepFn<V>,
    init: V,
    /// Ticks left before promotion. Keeps decrementing below zero after
    /// promotion; negative entries are inert.
    remaining: i64,
}

/// Registry of delayed registrations, in registration order
///
/// Entries are never removed: a promoted entry's counter simply goes
/// negative and stays inert for the rest of the run.
#[derive(Default)]
pub(crate) struct DelayRegistry<V> {
    entries: BTreeMap<DelayKey, DelayedTask<V>>,
    next_key: u64,
}

impl<V: Clone> DelayRegistry<V> {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_key: 0,
        }
    }

    /// Store a registration under the next key
    pub(crate) fn register(&mut self, step: StepFn<V>, init: V, delay: u64) -> DelayKey {
        let key = DelayKey(self.next_key);
        self.next_key += 1;
        self.entries.insert(
            key,
            DelayedTask {
                step,
                init,
                remaining: delay as i64,
            },
        );
        key
    }

    /// One tick of the registry: collect entries due now, in registration
    /// order, then decrement every counter (promoted ones included)
    pub(crate) fn advance(&mut self) -> Vec<(StepFn<V>, V)> {
        let mut due = Vec::new();
        for entry in self.entries.values_mut() {
            if entry.remaining == 0 {
                due.push((entry.step.clone(), entry.init.clone()));
            }
            entry.remaining -= 1;
        }
        due
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// A task waiting in the dispatch queue
pub(crate) struct QueuedTask<V> {
    pub(crate) step: StepFn<V>,
    pub(crate) signals: Vec<V>,
    pub(crate) init: V,
}

/// FIFO dispatch queue with a single active slot
///
/// At most one queue-sourced task occupies the active pool at a time; the
/// `current` slot tracks its Pid between promotion and termination.
#[derive(Default)]
pub(crate) struct DispatchQueue<V> {
    entries: VecDeque<QueuedTask<V>>,
    current: Option<Pid>,
}

impl<V> DispatchQueue<V> {
    pub(crate) fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            current: None,
        }
    }

    pub(crate) fn push(&mut self, task: QueuedTask<V>) {
        self.entries.push_back(task);
    }

    pub(crate) fn pop_front(&mut self) -> Option<QueuedTask<V>> {
        self.entries.pop_front()
    }

    pub(crate) fn current(&self) -> Option<Pid> {
        self.current
    }

    pub(crate) fn set_current(&mut self, pid: Pid) {
        self.current = Some(pid);
    }

    pub(crate) fn clear_current(&mut self) {
        self.current = None;
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Producer-to-consumer links, established at consumer registration
///
/// Append-only for the lifetime of a run: links outlive both endpoints and
/// go inert once either side leaves the pool.
#[derive(Default)]
pub(crate) struct ChannelMap {
    links: BTreeMap<Pid, Vec<Pid>>,
}

impl ChannelMap {
    pub(crate) fn new() -> Self {
        Self {
            links: BTreeMap::new(),
        }
    }

    pub(crate) fn link(&mut self, producer: Pid, consumer: Pid) {
        self.links.entry(producer).or_default().push(consumer);
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (Pid, &[Pid])> {
        self.links.iter().map(|(pid, consumers)| (*pid, consumers.as_slice()))
    }
}
