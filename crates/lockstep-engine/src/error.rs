//! Engine error types

use crate::machine::Pid;

/// Errors raised by machine construction or a simulation run
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MachineError {
    /// Halt bound of zero would make the run degenerate
    #[error("halt bound must be at least 1")]
    InvalidHalt,

    /// A sleeping pacer with a zero interval never paces
    #[error("tick pace must be non-zero")]
    InvalidPace,

    /// An input event referenced a task that is not in the active pool
    #[error("input event references unknown task: pid {}", .0.as_u64())]
    UnknownTask(Pid),

    /// A channel link named a producer that is not in the active pool
    #[error("channel producer is not in the active pool: pid {}", .0.as_u64())]
    UnknownProducer(Pid),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MachineError::UnknownTask(Pid::from_u64(7));
        assert_eq!(
            err.to_string(),
            "input event references unknown task: pid 7"
        );

        let err = MachineError::InvalidHalt;
        assert_eq!(err.to_string(), "halt bound must be at least 1");
    }
}
