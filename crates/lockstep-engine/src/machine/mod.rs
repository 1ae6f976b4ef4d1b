//! Cooperative scheduler core
//!
//! One machine owns the active pool, the three dispatch registries, and the
//! execution log. Registration populates the registries; the tick loop
//! promotes, steps, propagates, and evicts.

mod input;
mod log;
#[allow(clippy::module_inception)]
mod machine;
mod pacer;
mod registry;
mod task;

pub use input::{InputSource, ScriptedInput};
pub use log::{Event, EventKind, ExecutionLog, Tick};
pub use machine::Machine;
pub use pacer::{NoPacer, Pacer, SleepPacer};
pub use registry::DelayKey;
pub use task::{ActiveTask, Pid, Step, StepFn};
