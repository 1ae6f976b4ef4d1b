//! Lockstep Engine
//!
//! A discrete-time cooperative multitasking simulator. Tasks are pure step
//! functions `(state, signal) -> (new state, terminated)`; the machine
//! advances a global tick counter and steps every active task exactly once
//! per tick, in ascending-Pid order, producing a tick-indexed
//! Execute/Terminate log.
//!
//! # Example
//!
//! ```rust,ignore
//! use lockstep_engine::{Machine, Step, StepFn};
//! use std::sync::Arc;
//!
//! let mut machine: Machine<&str> = Machine::unpaced(10)?;
//!
//! let counter: StepFn<&str> = Arc::new(|state, signal| match signal {
//!     Some(&"1") => Step::done("1"),
//!     _ => Step::running(*state),
//! });
//!
//! machine.spawn_immediate(counter, "0", vec!["0", "0", "0", "1"]);
//! machine.run()?;
//!
//! // Execute at tick 1, Terminate at tick 4
//! for (tick, events) in machine.log().ticks() {
//!     println!("{tick}: {events:?}");
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod error;
pub mod machine;

pub use error::MachineError;
pub use machine::{
    ActiveTask, DelayKey, Event, EventKind, ExecutionLog, InputSource, Machine, NoPacer, Pacer,
    Pid, ScriptedInput, SleepPacer, Step, StepFn, Tick,
};
