//! The machine: registration surface and the per-tick scheduler loop

use crate::error::MachineError;
use crate::machine::input::InputSource;
use crate::machine::log::{EventKind, ExecutionLog, Tick};
use crate::machine::pacer::{NoPacer, Pacer, SleepPacer};
use crate::machine::registry::{ChannelMap, DelayKey, DelayRegistry, DispatchQueue, QueuedTask};
use crate::machine::task::{ActiveTask, Pid, StepFn};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// A discrete-time cooperative multitasking simulator
///
/// Tasks register through one of four dispatch modes, then [`run`] advances
/// the tick counter from 1 to the halt bound, stepping every active task
/// once per tick in ascending-Pid order and logging Execute/Terminate
/// events. `V` is the value type carried by both task states and signals;
/// channel propagation feeds one into the other.
///
/// [`run`]: Machine::run
pub struct Machine<V> {
    /// Active pool, keyed by Pid. Pids are assigned monotonically, so key
    /// order is insertion order is stepping order.
    pool: BTreeMap<Pid, ActiveTask<V>>,
    delays: DelayRegistry<V>,
    queue: DispatchQueue<V>,
    channels: ChannelMap,
    log: ExecutionLog,
    input: Option<Box<dyn InputSource<V>>>,
    io_enabled: bool,
    pacer: Box<dyn Pacer>,
    next_pid: u64,
    tick: Tick,
    halt: Tick,
}

impl<V: Clone> Machine<V> {
    /// Create a machine that sleeps `pace` between ticks and halts
    /// unconditionally when the tick counter reaches `halt`
    ///
    /// Rejects a zero pace and a zero halt bound.
    pub fn new(pace: Duration, halt: Tick) -> Result<Self, MachineError> {
        Self::with_pacer(Box::new(SleepPacer::new(pace)?), halt)
    }

    /// Create a machine with a custom pacing collaborator
    pub fn with_pacer(pacer: Box<dyn Pacer>, halt: Tick) -> Result<Self, MachineError> {
        if halt == 0 {
            return Err(MachineError::InvalidHalt);
        }
        Ok(Self {
            pool: BTreeMap::new(),
            delays: DelayRegistry::new(),
            queue: DispatchQueue::new(),
            channels: ChannelMap::new(),
            log: ExecutionLog::new(),
            input: None,
            io_enabled: false,
            pacer,
            next_pid: 0,
            tick: 1,
            halt,
        })
    }

    /// Create an unpaced machine; the usual constructor in tests
    pub fn unpaced(halt: Tick) -> Result<Self, MachineError> {
        Self::with_pacer(Box::new(NoPacer), halt)
    }

    /// Toggle the per-tick external input pull
    pub fn set_io_enabled(&mut self, enabled: bool) {
        self.io_enabled = enabled;
    }

    /// Install the external input source
    pub fn set_input(&mut self, source: Box<dyn InputSource<V>>) {
        self.input = Some(source);
    }

    /// Register a task directly into the active pool with a fixed signal
    /// sequence
    ///
    /// Assigns a Pid immediately and logs Execute against the current tick
    /// bucket; the task is stepped starting on the next scheduler tick.
    pub fn spawn_immediate(&mut self, step: StepFn<V>, init: V, signals: Vec<V>) -> Pid {
        let pid = self.alloc_pid();
        self.pool.insert(pid, ActiveTask::new(step, init, signals));
        self.log.record(self.tick, EventKind::Execute, pid);
        pid
    }

    /// Register a task to enter the active pool after `delay` ticks
    ///
    /// No Pid is assigned yet; the task is promoted (Execute logged, empty
    /// signal queue) on the tick its countdown reaches zero. The step
    /// function is probed once at registration, result discarded; only the
    /// stored initial state matters.
    pub fn spawn_delayed(&mut self, step: StepFn<V>, init: V, delay: u64) -> DelayKey {
        let _ = (*step)(&init, None);
        self.delays.register(step, init, delay)
    }

    /// Append a task to the dispatch queue
    ///
    /// Queued tasks run one at a time: the head is promoted when no queue
    /// task occupies the pool, or on the tick the previous one terminates.
    pub fn spawn_queued(&mut self, step: StepFn<V>, init: V, signals: Vec<V>) {
        self.queue.push(QueuedTask { step, signals, init });
    }

    /// Register a consumer task fed by a producer's state
    ///
    /// Enters the active pool immediately with an empty signal queue. Every
    /// tick both endpoints are active, the producer's just-updated state is
    /// appended to this task's pending signals; channel input is the
    /// consumer's only signal source.
    pub fn spawn_channel_linked(
        &mut self,
        step: StepFn<V>,
        init: V,
        producer: Pid,
    ) -> Result<Pid, MachineError> {
        if !self.pool.contains_key(&producer) {
            return Err(MachineError::UnknownProducer(producer));
        }
        let pid = self.alloc_pid();
        self.pool.insert(pid, ActiveTask::new(step, init, Vec::new()));
        self.log.record(self.tick, EventKind::Execute, pid);
        self.channels.link(producer, pid);
        Ok(pid)
    }

    /// Run the simulation to the halt bound
    ///
    /// Performs ticks `1..halt` and stops regardless of whether tasks
    /// remain active. Fatal on an input event referencing a task absent
    /// from the pool.
    pub fn run(&mut self) -> Result<(), MachineError> {
        loop {
            self.log.touch(self.tick);

            // queue promotion (pre-step)
            if self.queue.current().is_none() {
                self.promote_queue_head();
            }

            if self.tick == self.halt {
                break;
            }

            // delay promotion, then every countdown decrements
            for (step, init) in self.delays.advance() {
                let pid = self.alloc_pid();
                self.pool.insert(pid, ActiveTask::new(step, init, Vec::new()));
                self.log.record(self.tick, EventKind::Execute, pid);
            }

            self.pull_input()?;
            let dead = self.step_all();
            self.propagate_channels();

            // eviction: delay-registry and channel-map entries referencing
            // these Pids are left in place
            for pid in dead {
                self.pool.remove(&pid);
            }

            self.tick += 1;
            self.pacer.pace();
        }
        Ok(())
    }

    /// Current tick counter
    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Configured halt bound
    pub fn halt(&self) -> Tick {
        self.halt
    }

    /// The execution log
    pub fn log(&self) -> &ExecutionLog {
        &self.log
    }

    /// An active task, if present in the pool
    pub fn task(&self, pid: Pid) -> Option<&ActiveTask<V>> {
        self.pool.get(&pid)
    }

    /// Number of tasks in the active pool
    pub fn active_count(&self) -> usize {
        self.pool.len()
    }

    /// Pid of the queue-sourced task currently in the pool
    pub fn current_queue_task(&self) -> Option<Pid> {
        self.queue.current()
    }

    /// Number of dispatch-queue entries still waiting
    pub fn queued_count(&self) -> usize {
        self.queue.len()
    }

    /// Number of delay-registry entries (stale ones included; entries are
    /// never removed)
    pub fn delayed_count(&self) -> usize {
        self.delays.len()
    }

    fn alloc_pid(&mut self) -> Pid {
        let pid = Pid::from_u64(self.next_pid);
        self.next_pid += 1;
        pid
    }

    /// Pop the queue head into the active pool and make it current
    fn promote_queue_head(&mut self) {
        if let Some(task) = self.queue.pop_front() {
            let pid = self.alloc_pid();
            self.pool
                .insert(pid, ActiveTask::new(task.step, task.init, task.signals));
            self.queue.set_current(pid);
            self.log.record(self.tick, EventKind::Execute, pid);
        }
    }

    /// Pull at most one external event and append its signals
    fn pull_input(&mut self) -> Result<(), MachineError> {
        if !self.io_enabled {
            return Ok(());
        }
        let Some(source) = self.input.as_mut() else {
            return Ok(());
        };
        if let Some((pid, signals)) = source.pull() {
            let task = self
                .pool
                .get_mut(&pid)
                .ok_or(MachineError::UnknownTask(pid))?;
            task.pending.extend(signals);
        }
        Ok(())
    }

    /// Step every task that was in the pool when this phase began, in
    /// ascending-Pid order; returns the Pids that terminated
    ///
    /// A queue task promoted here by a same-tick termination is logged
    /// Execute now but first stepped on the next tick: it is not in the
    /// snapshot.
    fn step_all(&mut self) -> Vec<Pid> {
        let snapshot: Vec<Pid> = self.pool.keys().copied().collect();
        let mut dead = Vec::new();

        for pid in snapshot {
            let Some(task) = self.pool.get_mut(&pid) else {
                continue;
            };
            let signal = task.pending.pop_front();
            let step = Arc::clone(&task.step);
            let outcome = (*step)(&task.state, signal.as_ref());
            task.state = outcome.state;

            if outcome.done {
                self.log.record(self.tick, EventKind::Terminate, pid);
                dead.push(pid);
                if self.queue.current() == Some(pid) {
                    self.queue.clear_current();
                    self.promote_queue_head();
                }
            }
        }
        dead
    }

    /// Level-triggered channel delivery: each tick both endpoints are in
    /// the pool, the producer's state is re-sent even if unchanged. Runs
    /// before eviction, so a task terminating this tick still delivers its
    /// final state.
    fn propagate_channels(&mut self) {
        let mut sends: Vec<(Pid, V)> = Vec::new();
        for (producer, consumers) in self.channels.iter() {
            if let Some(task) = self.pool.get(&producer) {
                for consumer in consumers {
                    if self.pool.contains_key(consumer) {
                        sends.push((*consumer, task.state.clone()));
                    }
                }
            }
        }
        for (consumer, signal) in sends {
            if let Some(task) = self.pool.get_mut(&consumer) {
                task.pending.push_back(signal);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::task::Step;

    fn hold() -> StepFn<&'static str> {
        Arc::new(|state, _| Step::running(*state))
    }

    fn end_on(token: &'static str) -> StepFn<&'static str> {
        Arc::new(move |state, signal| match signal {
            Some(s) if *s == token => Step::done(*s),
            _ => Step::running(*state),
        })
    }

    #[test]
    fn test_rejects_zero_halt() {
        let result: Result<Machine<&str>, _> = Machine::unpaced(0);
        assert_eq!(result.err(), Some(MachineError::InvalidHalt));
    }

    #[test]
    fn test_rejects_zero_pace() {
        let result: Result<Machine<&str>, _> = Machine::new(Duration::ZERO, 10);
        assert_eq!(result.err(), Some(MachineError::InvalidPace));
    }

    #[test]
    fn test_spawn_immediate_logs_execute_at_registration() {
        let mut machine = Machine::unpaced(10).unwrap();
        let pid = machine.spawn_immediate(hold(), "0", vec!["0"]);

        assert_eq!(pid.as_u64(), 0);
        let events = machine.log().events_at(1);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Execute);
        assert_eq!(events[0].pid, pid);
    }

    #[test]
    fn test_pids_are_monotonic_across_modes() {
        let mut machine = Machine::unpaced(10).unwrap();
        let p0 = machine.spawn_immediate(hold(), "0", vec![]);
        let p1 = machine.spawn_channel_linked(hold(), "0", p0).unwrap();

        assert_eq!(p0.as_u64(), 0);
        assert_eq!(p1.as_u64(), 1);
    }

    #[test]
    fn test_spawn_delayed_assigns_no_pid() {
        let mut machine = Machine::unpaced(10).unwrap();
        let key = machine.spawn_delayed(hold(), "0", 3);

        assert_eq!(key.as_u64(), 0);
        assert_eq!(machine.active_count(), 0);
        assert_eq!(machine.delayed_count(), 1);
        assert!(machine.log().is_empty());
    }

    #[test]
    fn test_spawn_delayed_probes_step_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        static CALLS: AtomicUsize = AtomicUsize::new(0);
        let probe: StepFn<&'static str> = Arc::new(|state, _| {
            CALLS.fetch_add(1, Ordering::Relaxed);
            Step::running(*state)
        });

        let mut machine = Machine::unpaced(10).unwrap();
        machine.spawn_delayed(probe, "0", 2);
        assert_eq!(CALLS.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_channel_link_requires_active_producer() {
        let mut machine = Machine::unpaced(10).unwrap();
        let absent = Pid::from_u64(9);

        let result = machine.spawn_channel_linked(hold(), "0", absent);
        assert_eq!(result.err(), Some(MachineError::UnknownProducer(absent)));
    }

    #[test]
    fn test_run_performs_halt_minus_one_ticks() {
        let mut machine: Machine<&str> = Machine::unpaced(5).unwrap();
        machine.run().unwrap();

        assert_eq!(machine.tick(), 5);
        // buckets 1..=5 all touched, all empty
        assert_eq!(machine.log().len(), 5);
        for tick in 1..=5 {
            assert!(machine.log().events_at(tick).is_empty());
        }
    }

    #[test]
    fn test_survivors_receive_no_events_at_halt() {
        let mut machine = Machine::unpaced(4).unwrap();
        let pid = machine.spawn_immediate(hold(), "0", vec![]);
        machine.run().unwrap();

        // still in the pool, never terminated
        assert!(machine.task(pid).is_some());
        let terminations: usize = machine
            .log()
            .ticks()
            .flat_map(|(_, events)| events)
            .filter(|event| event.kind == EventKind::Terminate)
            .count();
        assert_eq!(terminations, 0);
    }

    #[test]
    fn test_unknown_input_reference_is_fatal() {
        use crate::machine::input::ScriptedInput;

        let mut machine = Machine::unpaced(10).unwrap();
        machine.spawn_immediate(end_on("1"), "0", vec![]);
        machine.set_io_enabled(true);
        machine.set_input(Box::new(ScriptedInput::new(vec![Some((
            Pid::from_u64(42),
            vec!["0"],
        ))])));

        let result = machine.run();
        assert_eq!(
            result.err(),
            Some(MachineError::UnknownTask(Pid::from_u64(42)))
        );
    }

    #[test]
    fn test_io_enabled_without_source_is_idle() {
        let mut machine = Machine::unpaced(5).unwrap();
        machine.spawn_immediate(hold(), "0", vec![]);
        machine.set_io_enabled(true);

        assert!(machine.run().is_ok());
    }

    #[test]
    fn test_signal_consumed_one_per_tick() {
        let mut machine = Machine::unpaced(10).unwrap();
        let pid = machine.spawn_immediate(end_on("1"), "0", vec!["0", "0", "1", "0"]);
        machine.run().unwrap();

        // three signals consumed over ticks 1-3, terminal on the third
        let events = machine.log().events_at(3);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Terminate);
        assert_eq!(events[0].pid, pid);
        assert!(machine.task(pid).is_none());
    }
}
