//! Independent seeded sessions run side by side for what-if analysis.

use super::config::{FactoryConfig, PeriodParams};
use super::error::{ConfigError, FactoryError};
use super::orchestrator::Orchestrator;
use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// End-of-plan figures of one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub seed: u64,
    pub session_id: Uuid,
    pub periods: u32,
    pub units_produced: u64,
    pub units_shipped: u64,
    pub remaining_demand: i64,
    pub demand_penalty: f64,
    pub profit: f64,
}

/// Play the same period plan once per seed, in parallel.
///
/// Results come back in seed order. Any failing session fails the batch.
pub fn run_replications(
    config: &FactoryConfig,
    plan: &[PeriodParams],
    seeds: &[u64],
) -> Result<Vec<SessionSummary>, FactoryError> {
    config.validate()?;
    if plan.is_empty() {
        return Err(ConfigError::out_of_range("plan", "at least one period", 0).into());
    }
    info!("running {} replication(s) of a {}-period plan", seeds.len(), plan.len());
    seeds
        .par_iter()
        .map(|&seed| run_session(config.clone().with_random_seed(Some(seed)), plan, seed))
        .collect()
}

fn run_session(
    config: FactoryConfig,
    plan: &[PeriodParams],
    seed: u64,
) -> Result<SessionSummary, FactoryError> {
    let mut orchestrator = Orchestrator::new(config)?;
    let mut demand_penalty = 0.0;
    for params in plan {
        demand_penalty += orchestrator.run_period(params.clone())?.demand_penalty;
    }
    let state = orchestrator
        .state()
        .ok_or(ConfigError::NoActiveSession(1))?;
    Ok(SessionSummary {
        seed,
        session_id: state.session_id,
        periods: state.last_period,
        units_produced: state.cumulative_produced,
        units_shipped: state.units_shipped,
        remaining_demand: i64::from(state.total_demand) - state.cumulative_produced as i64,
        demand_penalty,
        profit: state.ledger.profit(),
    })
}
