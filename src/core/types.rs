use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical simulation time in hours.
pub type SimTime = f64;

/// Handle of a process registered with a scheduler.
pub type ProcessId = usize;

/// Handle of a container owned by a scheduler.
///
/// Processes keep handles rather than references so the scheduler stays the
/// single owner of every container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContainerId(pub usize);

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
