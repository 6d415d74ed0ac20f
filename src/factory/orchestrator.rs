use super::config::{FactoryConfig, PeriodParams, ReorderPoint};
use super::controls::{AttendanceControl, DispatchControl, StockControl};
use super::error::{ConfigError, FactoryError};
use super::floor::Floor;
use super::ledger::{overtime_pay, FinancialLedger, LedgerSnapshot};
use super::roster::AttendanceRoster;
use super::stages::{shift_consumption, StageRecipe};
use super::types::{Buffer, Role, WorkerCounts};
use crate::core::container::Container;
use crate::core::event_scheduler::Scheduler;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// Factory state carried from one period to the next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactoryState {
    pub session_id: Uuid,
    pub seed: u64,
    pub levels: BTreeMap<Buffer, u32>,
    pub ledger: FinancialLedger,
    pub workers: WorkerCounts,
    pub roster: AttendanceRoster,
    pub hours_per_day: u32,
    pub days_per_period: u32,
    pub dispatch_threshold: u32,
    pub total_demand: u32,
    /// Guitars picked up by the store so far.
    pub units_shipped: u64,
    /// Guitars finished so far: shipped plus waiting in dispatch.
    pub cumulative_produced: u64,
    pub last_period: u32,
}

impl FactoryState {
    /// Fresh session: raw stock covers `initial_stock_days` shifts of
    /// consumption by the given staff, intermediate buffers start empty.
    pub fn start(config: &FactoryConfig, params: &PeriodParams) -> Self {
        let hours = f64::from(params.hours_per_day);
        let levels = Buffer::ALL
            .iter()
            .map(|&buffer| {
                let level = match config.stock_policy(buffer) {
                    Some(_) => {
                        let per_shift = shift_consumption(buffer, &params.workers, hours, config);
                        let wanted = (per_shift * f64::from(config.initial_stock_days)).ceil();
                        (wanted as u32).min(config.capacities.get(buffer))
                    }
                    None => 0,
                };
                (buffer, level)
            })
            .collect();

        Self {
            session_id: Uuid::new_v4(),
            seed: config.random_seed.unwrap_or_else(rand::random),
            levels,
            ledger: FinancialLedger::new(),
            workers: params.workers,
            roster: AttendanceRoster::new(),
            hours_per_day: params.hours_per_day,
            days_per_period: params.days_per_period,
            dispatch_threshold: params.dispatch_threshold,
            total_demand: params.total_demand,
            units_shipped: 0,
            cumulative_produced: 0,
            last_period: 0,
        }
    }

    pub fn level(&self, buffer: Buffer) -> u32 {
        self.levels.get(&buffer).copied().unwrap_or(0)
    }

    fn apply(&mut self, params: &PeriodParams) {
        self.workers = params.workers;
        self.hours_per_day = params.hours_per_day;
        self.days_per_period = params.days_per_period;
        self.dispatch_threshold = params.dispatch_threshold;
        self.total_demand = params.total_demand;
    }

    pub fn reorder_level(&self, buffer: Buffer, config: &FactoryConfig) -> u32 {
        let Some(policy) = config.stock_policy(buffer) else {
            return 0;
        };
        let level = match policy.reorder_point {
            ReorderPoint::Fixed(level) => level,
            ReorderPoint::ShiftsOfCover(shifts) => {
                let per_shift = shift_consumption(
                    buffer,
                    &self.workers,
                    f64::from(self.hours_per_day),
                    config,
                );
                (per_shift * f64::from(shifts)).ceil() as u32
            }
        };
        level.min(config.capacities.get(buffer))
    }
}

/// Outcome of one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodResult {
    pub session_id: Uuid,
    pub period_index: u32,
    pub units_produced: u64,
    pub log: Vec<String>,
    pub opening_levels: BTreeMap<Buffer, u32>,
    pub levels: BTreeMap<Buffer, u32>,
    /// Cumulative session totals at period end.
    pub ledger: LedgerSnapshot,
    /// This period's share of the totals.
    pub period_ledger: LedgerSnapshot,
    pub remaining_demand: i64,
    pub overproduction: u64,
    pub demand_penalty: f64,
    pub units_shipped: u64,
    pub discarded_in_flight: u32,
    pub completed: BTreeMap<Role, u32>,
    pub scrapped: BTreeMap<Role, u32>,
}

fn period_seed(session_seed: u64, period: u32) -> u64 {
    session_seed ^ u64::from(period).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Owns the session and drives one period at a time.
///
/// A period either completes and replaces the stored state, or fails and
/// leaves it untouched.
pub struct Orchestrator {
    config: FactoryConfig,
    state: Option<FactoryState>,
}

impl Orchestrator {
    pub fn new(config: FactoryConfig) -> Result<Self, FactoryError> {
        config.validate()?;
        Ok(Self {
            config,
            state: None,
        })
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    pub fn state(&self) -> Option<&FactoryState> {
        self.state.as_ref()
    }

    pub fn run_period(&mut self, params: PeriodParams) -> Result<PeriodResult, FactoryError> {
        params.validate(&self.config)?;

        let mut state = if params.period_index == 1 {
            FactoryState::start(&self.config, &params)
        } else {
            let current = self
                .state
                .as_ref()
                .ok_or(ConfigError::NoActiveSession(params.period_index))?;
            let expected = current.last_period + 1;
            if params.period_index != expected {
                return Err(ConfigError::OutOfSequence {
                    expected,
                    got: params.period_index,
                }
                .into());
            }
            current.clone()
        };
        state.apply(&params);

        let result = simulate_period(&self.config, &mut state, params.period_index)?;
        self.state = Some(state);
        Ok(result)
    }
}

fn warn_on_degenerate_staffing(workers: &WorkerCounts) {
    let feeds = [
        (Role::Painter, Role::BodyMaker),
        (Role::Painter, Role::NeckMaker),
        (Role::Assembler, Role::Painter),
    ];
    for (role, upstream) in feeds {
        if workers.get(role) > 0 && workers.get(upstream) == 0 {
            warn!(
                "{} {}(s) staffed without any {}; they will idle once stock runs out",
                workers.get(role),
                role,
                upstream
            );
        }
    }
}

/// Run one period against `state`, updating it in place on success.
fn simulate_period(
    config: &FactoryConfig,
    state: &mut FactoryState,
    period: u32,
) -> Result<PeriodResult, FactoryError> {
    let hours = f64::from(state.hours_per_day);
    let days = state.days_per_period;
    let horizon = hours * f64::from(days);
    info!(
        "period {} of session {}: {} day(s) x {} h, staff {:?}",
        period, state.session_id, days, state.hours_per_day, state.workers
    );
    warn_on_degenerate_staffing(&state.workers);

    let opening_levels = state.levels.clone();
    let opening_ledger = state.ledger.snapshot();
    let start_units = state.units_shipped + u64::from(state.level(Buffer::Dispatch));

    let mut roster = state.roster.clone();
    roster.clear_active();
    let rng = StdRng::seed_from_u64(period_seed(state.seed, period));
    let floor = Floor::new(state.ledger.clone(), roster, rng, hours, state.units_shipped);

    let mut scheduler = Scheduler::new(floor);
    for buffer in Buffer::ALL {
        scheduler.add_container(Container::new(
            buffer.name(),
            config.capacities.get(buffer),
            state.level(buffer),
        )?);
    }

    let mut recipes = BTreeMap::new();
    for role in Role::ALL {
        recipes.insert(role, Arc::new(StageRecipe::for_role(role, config)?));
    }

    for material in [Buffer::Wood, Buffer::Electronic] {
        if let Some(policy) = config.stock_policy(material) {
            scheduler.spawn(Box::new(StockControl::new(
                material,
                policy,
                state.reorder_level(material, config),
                &config.control,
            )));
        }
    }
    scheduler.spawn(Box::new(DispatchControl::new(
        state.dispatch_threshold,
        &config.dispatch,
        &config.control,
    )));
    scheduler.spawn(Box::new(AttendanceControl::new(
        state.workers,
        config.sick_probability,
        hours,
        days,
        recipes,
    )));

    scheduler.run(horizon)?;

    let (mut floor, containers) = scheduler.into_parts();
    let levels: BTreeMap<Buffer, u32> = Buffer::ALL
        .iter()
        .zip(&containers)
        .map(|(buffer, container)| (*buffer, container.level()))
        .collect();

    let blocked = floor.close_open_waits(horizon);
    if blocked > 0.0 {
        debug!("period {}: {:.2} idle cost for waits still open at close", period, blocked);
    }

    if floor.in_flight > 0 {
        warn!(
            "period {}: {} unit(s) in process discarded at the period boundary",
            period, floor.in_flight
        );
        floor.record_at_close(
            horizon,
            format!("{} unit(s) still in process are lost at period end", floor.in_flight),
        );
    }

    for role in Role::ALL {
        let pay = overtime_pay(
            horizon,
            config.stages.get(role).hourly_rate,
            config.overtime_threshold_hours,
            config.overtime_multiplier,
        );
        floor
            .ledger
            .add_labor_cost(f64::from(state.workers.get(role)) * pay);
    }
    floor
        .ledger
        .add_fixed_cost(config.daily_fixed_cost * f64::from(days));

    let dispatch_level = levels.get(&Buffer::Dispatch).copied().unwrap_or(0);
    let end_units = floor.units_shipped + u64::from(dispatch_level);
    let units_produced = end_units.saturating_sub(start_units);
    let total_demand = u64::from(state.total_demand);
    let demand_share = total_demand / u64::from(config.total_periods);
    let overproduction = units_produced.saturating_sub(demand_share);
    let remaining_demand = total_demand as i64 - end_units as i64;

    let mut demand_penalty = 0.0;
    if period == config.total_periods && end_units < total_demand {
        let shortfall = total_demand - end_units;
        demand_penalty = shortfall as f64 * config.penalty_factor * config.dispatch.sale_price;
        floor.ledger.add_demand_penalty(demand_penalty);
        floor.record_at_close(
            horizon,
            format!(
                "session ends {shortfall} guitar(s) short of demand, penalty {demand_penalty:.2}"
            ),
        );
    }

    let ledger = floor.ledger.snapshot();
    info!(
        "period {} done: {} produced, {} shipped so far, profit {:.2}",
        period, units_produced, floor.units_shipped, ledger.profit
    );

    let Floor {
        ledger: closing_ledger,
        log,
        mut roster,
        units_shipped,
        in_flight,
        completed,
        scrapped,
        ..
    } = floor;
    roster.clear_active();

    state.levels = levels.clone();
    state.ledger = closing_ledger;
    state.roster = roster;
    state.units_shipped = units_shipped;
    state.cumulative_produced = end_units;
    state.last_period = period;

    Ok(PeriodResult {
        session_id: state.session_id,
        period_index: period,
        units_produced,
        log: log.into_entries(),
        opening_levels,
        levels,
        ledger,
        period_ledger: ledger.since(&opening_ledger),
        remaining_demand,
        overproduction,
        demand_penalty,
        units_shipped,
        discarded_in_flight: in_flight,
        completed,
        scrapped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_stock_covers_configured_days() {
        let config = FactoryConfig::default();
        let params = PeriodParams::default().with_workers(WorkerCounts::new(2, 1, 3, 2));
        let state = FactoryState::start(&config, &params);
        // (2 bodies x 2 wood + 1 neck x 1 wood) per hour, 8 h, 5 days
        assert_eq!(state.level(Buffer::Wood), 200);
        // 2 assemblers x 1 unit per hour, 8 h, 5 days, capped at 100
        assert_eq!(state.level(Buffer::Electronic), 80);
        assert_eq!(state.level(Buffer::Dispatch), 0);
        assert_eq!(state.seed, 42);
    }

    #[test]
    fn test_reorder_levels() {
        let config = FactoryConfig::default();
        let params = PeriodParams::default().with_workers(WorkerCounts::new(2, 1, 3, 2));
        let state = FactoryState::start(&config, &params);
        assert_eq!(state.reorder_level(Buffer::Wood, &config), 120);
        assert_eq!(state.reorder_level(Buffer::Electronic, &config), 30);
        assert_eq!(state.reorder_level(Buffer::Dispatch, &config), 0);
    }

    #[test]
    fn test_period_seed_differs_per_period() {
        assert_ne!(period_seed(42, 1), period_seed(42, 2));
        assert_eq!(period_seed(42, 3), period_seed(42, 3));
    }

    #[test]
    fn test_continuation_requires_session() {
        let mut orchestrator = Orchestrator::new(FactoryConfig::default()).unwrap();
        let err = orchestrator
            .run_period(PeriodParams::default().with_period(2))
            .unwrap_err();
        assert_eq!(err, FactoryError::Config(ConfigError::NoActiveSession(2)));
        assert!(orchestrator.state().is_none());
    }
}
