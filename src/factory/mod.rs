//! Guitar factory: stages, control loops, ledger and the period orchestrator
//! built on the discrete-event engine in [`crate::core`].

pub mod config;
pub mod controls;
pub mod error;
pub mod floor;
pub mod ledger;
pub mod orchestrator;
pub mod replication;
pub mod roster;
pub mod sampling;
pub mod stages;
pub mod types;

pub use config::{FactoryConfig, Moments, PeriodParams, ReorderPoint, StageSettings};
pub use error::{ConfigError, FactoryError};
pub use ledger::{FinancialLedger, LedgerSnapshot};
pub use orchestrator::{FactoryState, Orchestrator, PeriodResult};
pub use replication::{run_replications, SessionSummary};
pub use types::{Buffer, Role, Worker, WorkerCounts};

#[cfg(test)]
mod test_utils;
