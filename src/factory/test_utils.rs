//! Fixtures shared by the factory unit tests.

use super::config::{FactoryConfig, Moments, StageSettings};
use super::floor::Floor;
use super::ledger::FinancialLedger;
use super::roster::AttendanceRoster;
use super::types::{Buffer, Role, WorkerCounts};
use crate::core::container::Container;
use crate::core::event_scheduler::Scheduler;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// A floor on day 0 with every worker of `workers` present.
pub fn test_floor(workers: WorkerCounts) -> Floor {
    let mut rng = StdRng::seed_from_u64(1);
    let mut roster = AttendanceRoster::new();
    roster.roll(0, &workers, 0.0, &mut rng);
    Floor::new(FinancialLedger::new(), roster, rng, 8.0, 0)
}

/// Scheduler with every buffer registered; unlisted buffers start empty.
pub fn test_scheduler(
    config: &FactoryConfig,
    floor: Floor,
    levels: &[(Buffer, u32)],
) -> Scheduler<Floor> {
    let mut scheduler = Scheduler::new(floor);
    for buffer in Buffer::ALL {
        let level = levels
            .iter()
            .find(|(b, _)| *b == buffer)
            .map_or(0, |(_, level)| *level);
        scheduler.add_container(
            Container::new(buffer.name(), config.capacities.get(buffer), level).unwrap(),
        );
    }
    scheduler
}

pub fn level(scheduler: &Scheduler<Floor>, buffer: Buffer) -> u32 {
    scheduler.container(buffer.id()).unwrap().level()
}

/// Stage settings with a fixed processing time and a quality that always
/// passes (`pass = true`) or always fails.
pub fn fixed_stage(hours: f64, pass: bool, hourly_rate: f64) -> StageSettings {
    StageSettings {
        process_time: Moments::new(hours, 0.0),
        quality: Moments::new(if pass { 10.0 } else { -10.0 }, 0.0),
        hourly_rate,
    }
}

/// Config with deterministic stages: every role takes `hours` and passes.
pub fn deterministic_config(hours: f64) -> FactoryConfig {
    let mut config = FactoryConfig::default().with_sick_probability(0.0);
    for role in Role::ALL {
        let rate = config.stages.get(role).hourly_rate;
        config = config.with_stage(role, fixed_stage(hours, true, rate));
    }
    config.stages.painted_neck_quality = Moments::new(10.0, 0.0);
    config
}
