use super::config::{ControlTiming, DispatchPolicy, StockPolicy};
use super::floor::Floor;
use super::stages::{StageProcess, StageRecipe};
use super::types::{Buffer, Role, WorkerCounts};
use crate::core::process::{Process, SimContext, Yield};
use crate::core::types::SimTime;
use log::{debug, info};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq)]
enum StockPhase {
    Watching,
    AwaitingSupplier,
    Receiving,
}

/// Reorder-point replenishment of one raw material.
///
/// Polls the level; at or below the reorder level it calls the supplier,
/// waits out the lead time, receives one order and pays for it, then cools
/// down before polling again.
pub struct StockControl {
    name: String,
    material: Buffer,
    reorder_level: u32,
    order_size: u32,
    lead_time: SimTime,
    unit_price: f64,
    poll: SimTime,
    cooldown: SimTime,
    phase: StockPhase,
}

impl StockControl {
    pub fn new(
        material: Buffer,
        policy: &StockPolicy,
        reorder_level: u32,
        timing: &ControlTiming,
    ) -> Self {
        Self {
            name: format!("{material} stock control"),
            material,
            reorder_level,
            order_size: policy.order_size,
            lead_time: policy.lead_time_hours,
            unit_price: policy.unit_price,
            poll: timing.poll_hours,
            cooldown: timing.cooldown_hours,
            phase: StockPhase::Watching,
        }
    }
}

impl Process<Floor> for StockControl {
    fn name(&self) -> &str {
        &self.name
    }

    fn resume(&mut self, ctx: &mut SimContext<'_, Floor>) -> Yield {
        let now = ctx.now();
        let material = self.material;
        match self.phase {
            StockPhase::Watching => {
                let level = ctx.level(material.id());
                if level > self.reorder_level {
                    return Yield::Timeout(self.poll);
                }
                let floor = ctx.world_mut();
                floor.record(now, format!("{material} stock below critical level ({level})"));
                floor.record(now, format!("calling {material} supplier"));
                floor.log.separator();
                self.phase = StockPhase::AwaitingSupplier;
                Yield::Timeout(self.lead_time)
            }
            StockPhase::AwaitingSupplier => {
                ctx.world_mut()
                    .record(now, format!("{material} supplier arrives"));
                self.phase = StockPhase::Receiving;
                Yield::Put(material.id(), self.order_size)
            }
            StockPhase::Receiving => {
                let level = ctx.level(material.id());
                let cost = f64::from(self.order_size) * self.unit_price;
                let floor = ctx.world_mut();
                floor.ledger.add_material_cost(cost);
                floor.record(now, format!("new {material} stock is {level}"));
                floor.log.separator();
                self.phase = StockPhase::Watching;
                Yield::Timeout(self.cooldown)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DispatchPhase {
    Watching,
    AwaitingPickup,
    Loading { units: u32 },
}

/// Ships finished guitars once enough have accumulated.
///
/// After the pickup delay the whole current level leaves in one
/// transaction, which may exceed the threshold if assembly continued.
pub struct DispatchControl {
    threshold: u32,
    pickup_delay: SimTime,
    sale_price: f64,
    dispatch_cost: f64,
    poll: SimTime,
    cooldown: SimTime,
    phase: DispatchPhase,
}

impl DispatchControl {
    pub fn new(threshold: u32, policy: &DispatchPolicy, timing: &ControlTiming) -> Self {
        Self {
            threshold,
            pickup_delay: policy.pickup_delay_hours,
            sale_price: policy.sale_price,
            dispatch_cost: policy.dispatch_cost,
            poll: timing.poll_hours,
            cooldown: timing.cooldown_hours,
            phase: DispatchPhase::Watching,
        }
    }
}

impl Process<Floor> for DispatchControl {
    fn name(&self) -> &str {
        "dispatch control"
    }

    fn resume(&mut self, ctx: &mut SimContext<'_, Floor>) -> Yield {
        let now = ctx.now();
        let dispatch = Buffer::Dispatch.id();
        match self.phase {
            DispatchPhase::Watching => {
                let level = ctx.level(dispatch);
                // An empty buffer is never worth a trip, even with a zero threshold.
                if level == 0 || level < self.threshold {
                    return Yield::Timeout(self.poll);
                }
                let floor = ctx.world_mut();
                floor.record(
                    now,
                    format!("dispatch stock is {level}, calling store to pick guitars"),
                );
                floor.log.separator();
                self.phase = DispatchPhase::AwaitingPickup;
                Yield::Timeout(self.pickup_delay)
            }
            DispatchPhase::AwaitingPickup => {
                let units = ctx.level(dispatch);
                ctx.world_mut()
                    .record(now, format!("store picking {units} guitars"));
                self.phase = DispatchPhase::Loading { units };
                Yield::Get(dispatch, units)
            }
            DispatchPhase::Loading { units } => {
                let floor = ctx.world_mut();
                floor.ledger.add_revenue(f64::from(units) * self.sale_price);
                floor.ledger.add_material_cost(self.dispatch_cost);
                floor.units_shipped += u64::from(units);
                floor.log.separator();
                self.phase = DispatchPhase::Watching;
                Yield::Timeout(self.cooldown)
            }
        }
    }
}

/// Daily roll call: re-draws attendance at every day boundary of the period
/// and starts a stage process for each present worker without one.
pub struct AttendanceControl {
    workers: WorkerCounts,
    sick_probability: f64,
    hours_per_day: SimTime,
    days: u32,
    recipes: BTreeMap<Role, Arc<StageRecipe>>,
}

impl AttendanceControl {
    pub fn new(
        workers: WorkerCounts,
        sick_probability: f64,
        hours_per_day: SimTime,
        days: u32,
        recipes: BTreeMap<Role, Arc<StageRecipe>>,
    ) -> Self {
        Self {
            workers,
            sick_probability,
            hours_per_day,
            days,
            recipes,
        }
    }
}

impl Process<Floor> for AttendanceControl {
    fn name(&self) -> &str {
        "attendance"
    }

    fn resume(&mut self, ctx: &mut SimContext<'_, Floor>) -> Yield {
        let now = ctx.now();
        let day = (now / self.hours_per_day).round() as u32;
        if day >= self.days {
            return Yield::Finish;
        }

        let floor = ctx.world_mut();
        let absent = floor
            .roster
            .roll(day, &self.workers, self.sick_probability, &mut floor.rng);
        for worker in &absent {
            floor.record(now, format!("{worker} is absent today"));
        }
        let present: Vec<_> = floor.roster.present().collect();
        info!(
            "day {}: {}/{} workers present",
            day + 1,
            present.len(),
            self.workers.total()
        );

        let mut started = 0;
        for worker in present {
            let Some(recipe) = self.recipes.get(&worker.role) else {
                continue;
            };
            if ctx.world_mut().roster.activate(worker) {
                ctx.spawn(Box::new(StageProcess::new(worker, Arc::clone(recipe))));
                started += 1;
            }
        }
        debug!("day {}: started {} stage processes", day + 1, started);

        Yield::Timeout(self.hours_per_day)
    }
}
