use super::types::{ContainerId, ProcessId, SimTime};
use thiserror::Error;

/// Faults raised by the discrete-event engine itself.
///
/// None of these occur for a correctly wired model; they surface wiring
/// mistakes (bad handles, impossible requests) instead of silently
/// deadlocking or corrupting a container.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("unknown container {0}")]
    UnknownContainer(ContainerId),

    #[error("unknown process {0}")]
    UnknownProcess(ProcessId),

    #[error("request for {amount} units can never be served by '{container}' (capacity {capacity})")]
    RequestExceedsCapacity {
        container: String,
        amount: u32,
        capacity: u32,
    },

    #[error("container '{container}' initial level {level} exceeds capacity {capacity}")]
    InitialLevelExceedsCapacity {
        container: String,
        level: u32,
        capacity: u32,
    },

    #[error("invalid delay {delay} requested at t={now}")]
    InvalidDelay { delay: SimTime, now: SimTime },
}
