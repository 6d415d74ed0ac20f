pub mod core;
pub mod factory;

// Re-export commonly used types
pub use crate::core::event_scheduler::Scheduler;
pub use crate::core::process::{Process, SimContext, Yield};
pub use crate::core::types::{ContainerId, SimTime};
pub use crate::factory::{FactoryConfig, Orchestrator, PeriodParams, PeriodResult};
