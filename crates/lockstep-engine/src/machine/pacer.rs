//! Inter-tick pacing
//!
//! Pacing is cosmetic: it slows a run down for observation and has no
//! bearing on tick semantics, so it lives behind its own collaborator.

use crate::error::MachineError;
use std::thread;
use std::time::Duration;

/// Collaborator invoked once at the end of every tick
pub trait Pacer {
    /// Block until the next tick may begin
    fn pace(&mut self);
}

/// Sleeps a fixed interval between ticks
pub struct SleepPacer {
    interval: Duration,
}

impl SleepPacer {
    /// Create a pacer; a zero interval is a configuration error
    pub fn new(interval: Duration) -> Result<Self, MachineError> {
        if interval.is_zero() {
            return Err(MachineError::InvalidPace);
        }
        Ok(Self { interval })
    }
}

impl Pacer for SleepPacer {
    fn pace(&mut self) {
        thread::sleep(self.interval);
    }
}

/// Runs ticks back to back; for tests and benchmarks
pub struct NoPacer;

impl Pacer for NoPacer {
    fn pace(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sleep_pacer_rejects_zero_interval() {
        let result = SleepPacer::new(Duration::ZERO);
        assert_eq!(result.err(), Some(MachineError::InvalidPace));
    }

    #[test]
    fn test_sleep_pacer_accepts_nonzero_interval() {
        assert!(SleepPacer::new(Duration::from_millis(1)).is_ok());
    }

    #[test]
    fn test_no_pacer_returns_immediately() {
        let mut pacer = NoPacer;
        pacer.pace();
    }
}
