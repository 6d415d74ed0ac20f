use super::config::FactoryConfig;
use super::error::ConfigError;
use super::floor::Floor;
use super::sampling::{ProcessTime, QualityGate};
use super::types::{Buffer, Role, Worker, WorkerCounts};
use crate::core::process::{Process, SimContext, Yield};
use crate::core::types::{ContainerId, SimTime};
use log::debug;
use std::collections::VecDeque;
use std::sync::Arc;

/// Wood drawn per guitar body.
pub const BODY_WOOD: u32 = 2;
/// Wood drawn per guitar neck.
pub const NECK_WOOD: u32 = 1;

/// One independently judged half of a compound unit.
#[derive(Debug, Clone, Copy)]
pub struct PartGate {
    pub part: &'static str,
    pub gate: QualityGate,
    pub pass_to: ContainerId,
    pub fail_to: ContainerId,
}

#[derive(Debug, Clone)]
pub enum Inspection {
    /// The unit passes as a whole or is scrapped, losing its inputs.
    Whole {
        gate: QualityGate,
        output: ContainerId,
        scrap_cost: f64,
    },
    /// Each part is judged on its own; a failing part goes back for rework.
    PerPart(Vec<PartGate>),
}

/// Everything a worker of one role needs to run its loop.
#[derive(Debug, Clone)]
pub struct StageRecipe {
    pub role: Role,
    pub inputs: Vec<(ContainerId, u32)>,
    pub inspection: Inspection,
    pub process_time: ProcessTime,
    pub hourly_rate: f64,
    pub safety_margin: u32,
    pub idle_tick: SimTime,
}

/// Raw-material value carried by one unit held in `buffer`.
pub fn unit_material_value(buffer: Buffer, config: &FactoryConfig) -> f64 {
    let wood = config.wood.unit_price;
    let electronic = config.electronic.unit_price;
    match buffer {
        Buffer::Wood => wood,
        Buffer::Electronic => electronic,
        Buffer::BodyPrePaint | Buffer::BodyPostPaint => f64::from(BODY_WOOD) * wood,
        Buffer::NeckPrePaint | Buffer::NeckPostPaint => f64::from(NECK_WOOD) * wood,
        Buffer::Dispatch => f64::from(BODY_WOOD + NECK_WOOD) * wood + electronic,
    }
}

/// Inputs drawn per unit of work, by role.
pub fn role_inputs(role: Role) -> Vec<(Buffer, u32)> {
    match role {
        Role::BodyMaker => vec![(Buffer::Wood, BODY_WOOD)],
        Role::NeckMaker => vec![(Buffer::Wood, NECK_WOOD)],
        Role::Painter => vec![(Buffer::BodyPrePaint, 1), (Buffer::NeckPrePaint, 1)],
        Role::Assembler => vec![
            (Buffer::BodyPostPaint, 1),
            (Buffer::NeckPostPaint, 1),
            (Buffer::Electronic, 1),
        ],
    }
}

/// Expected draw on `buffer` over one shift of `hours`, assuming every
/// worker is present and never starved.
pub fn shift_consumption(
    buffer: Buffer,
    workers: &WorkerCounts,
    hours: f64,
    config: &FactoryConfig,
) -> f64 {
    Role::ALL
        .iter()
        .map(|&role| {
            let per_unit: u32 = role_inputs(role)
                .iter()
                .filter(|(b, _)| *b == buffer)
                .map(|(_, amount)| amount)
                .sum();
            let units = hours / config.stages.get(role).process_time.mean;
            f64::from(workers.get(role)) * f64::from(per_unit) * units
        })
        .sum()
}

impl StageRecipe {
    pub fn for_role(role: Role, config: &FactoryConfig) -> Result<Self, ConfigError> {
        let settings = config.stages.get(role);
        let threshold = config.quality_threshold;
        let inputs = role_inputs(role);
        let scrap_cost = inputs
            .iter()
            .map(|(buffer, amount)| f64::from(*amount) * unit_material_value(*buffer, config))
            .sum();

        let inspection = match role {
            Role::BodyMaker => Inspection::Whole {
                gate: QualityGate::new(settings.quality, threshold)?,
                output: Buffer::BodyPrePaint.id(),
                scrap_cost,
            },
            Role::NeckMaker => Inspection::Whole {
                gate: QualityGate::new(settings.quality, threshold)?,
                output: Buffer::NeckPrePaint.id(),
                scrap_cost,
            },
            Role::Painter => Inspection::PerPart(vec![
                PartGate {
                    part: "body",
                    gate: QualityGate::new(settings.quality, threshold)?,
                    pass_to: Buffer::BodyPostPaint.id(),
                    fail_to: Buffer::BodyPrePaint.id(),
                },
                PartGate {
                    part: "neck",
                    gate: QualityGate::new(config.stages.painted_neck_quality, threshold)?,
                    pass_to: Buffer::NeckPostPaint.id(),
                    fail_to: Buffer::NeckPrePaint.id(),
                },
            ]),
            Role::Assembler => Inspection::Whole {
                gate: QualityGate::new(settings.quality, threshold)?,
                output: Buffer::Dispatch.id(),
                scrap_cost,
            },
        };

        Ok(Self {
            role,
            inputs: inputs.into_iter().map(|(b, amount)| (b.id(), amount)).collect(),
            inspection,
            process_time: ProcessTime::new(settings.process_time)?,
            hourly_rate: settings.hourly_rate,
            safety_margin: config.safety_margin,
            idle_tick: config.idle_tick_hours,
        })
    }

    /// Containers a passing unit is delivered to.
    fn outputs(&self) -> Vec<ContainerId> {
        match &self.inspection {
            Inspection::Whole { output, .. } => vec![*output],
            Inspection::PerPart(parts) => parts.iter().map(|p| p.pass_to).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Ready,
    Idle,
    /// `next` inputs have been requested so far.
    Withdrawing { next: usize },
    Processing,
    Delivering,
}

/// Work loop of a single worker slot.
///
/// Each cycle: wait out backpressure or starvation, withdraw the inputs,
/// process for a lognormal duration, inspect, deliver. The loop ends when
/// the worker is no longer on today's roster.
pub struct StageProcess {
    worker: Worker,
    name: String,
    recipe: Arc<StageRecipe>,
    phase: Phase,
    deliveries: VecDeque<ContainerId>,
}

impl StageProcess {
    pub fn new(worker: Worker, recipe: Arc<StageRecipe>) -> Self {
        Self {
            worker,
            name: worker.to_string(),
            recipe,
            phase: Phase::Ready,
            deliveries: VecDeque::new(),
        }
    }

    /// True when an output is within the safety margin of full, or an input
    /// cannot cover one unit of work.
    fn must_wait(&self, ctx: &SimContext<'_, Floor>) -> bool {
        let crowded = self.recipe.outputs().into_iter().any(|id| {
            ctx.capacity(id).saturating_sub(ctx.level(id)) <= self.recipe.safety_margin
        });
        let starved = self
            .recipe
            .inputs
            .iter()
            .any(|(id, amount)| ctx.level(*id) < *amount);
        crowded || starved
    }

    /// Start a wait that is charged at the role's wage once it ends, or at
    /// the period close if it never does.
    fn wait(&self, ctx: &mut SimContext<'_, Floor>, request: Yield) -> Yield {
        let now = ctx.now();
        ctx.world_mut()
            .begin_wait(self.worker, now, self.recipe.hourly_rate);
        request
    }

    fn end_wait(&self, ctx: &mut SimContext<'_, Floor>) {
        let now = ctx.now();
        ctx.world_mut().end_wait(self.worker, now);
    }

    fn begin_cycle(&mut self, ctx: &mut SimContext<'_, Floor>) -> Option<Yield> {
        if !ctx.world().roster.is_present(self.worker) {
            debug!("{} leaves the line", self.name);
            ctx.world_mut().roster.retire(self.worker);
            return Some(Yield::Finish);
        }
        if self.must_wait(ctx) {
            self.phase = Phase::Idle;
            return Some(self.wait(ctx, Yield::Timeout(self.recipe.idle_tick)));
        }
        self.phase = Phase::Withdrawing { next: 0 };
        None
    }

    fn inspect(&mut self, ctx: &mut SimContext<'_, Floor>) {
        let now = ctx.now();
        let recipe = Arc::clone(&self.recipe);
        let floor = ctx.world_mut();
        match &recipe.inspection {
            Inspection::Whole {
                gate,
                output,
                scrap_cost,
            } => {
                if gate.inspect(&mut floor.rng) {
                    self.deliveries.push_back(*output);
                    self.phase = Phase::Delivering;
                } else {
                    floor.ledger.add_material_cost(*scrap_cost);
                    floor.in_flight = floor.in_flight.saturating_sub(1);
                    *floor.scrapped.entry(recipe.role).or_default() += 1;
                    floor.record(
                        now,
                        format!("{} scrapped a unit that failed inspection", self.name),
                    );
                    self.phase = Phase::Ready;
                }
            }
            Inspection::PerPart(parts) => {
                for part in parts {
                    if part.gate.inspect(&mut floor.rng) {
                        self.deliveries.push_back(part.pass_to);
                    } else {
                        floor.record(
                            now,
                            format!("{} sends a {} back for rework", self.name, part.part),
                        );
                        self.deliveries.push_back(part.fail_to);
                    }
                }
                self.phase = Phase::Delivering;
            }
        }
    }
}

impl Process<Floor> for StageProcess {
    fn name(&self) -> &str {
        &self.name
    }

    fn resume(&mut self, ctx: &mut SimContext<'_, Floor>) -> Yield {
        loop {
            match self.phase {
                Phase::Ready => {
                    if let Some(request) = self.begin_cycle(ctx) {
                        return request;
                    }
                }
                Phase::Idle => {
                    self.end_wait(ctx);
                    self.phase = Phase::Ready;
                }
                Phase::Withdrawing { next } => {
                    self.end_wait(ctx);
                    // The unit is in process from its first withdrawal on.
                    if next == 1 {
                        ctx.world_mut().in_flight += 1;
                    }
                    if let Some(&(id, amount)) = self.recipe.inputs.get(next) {
                        self.phase = Phase::Withdrawing { next: next + 1 };
                        return self.wait(ctx, Yield::Get(id, amount));
                    }
                    let floor = ctx.world_mut();
                    let duration = self.recipe.process_time.sample(&mut floor.rng);
                    self.phase = Phase::Processing;
                    return Yield::Timeout(duration);
                }
                Phase::Processing => self.inspect(ctx),
                Phase::Delivering => {
                    self.end_wait(ctx);
                    if let Some(id) = self.deliveries.pop_front() {
                        return self.wait(ctx, Yield::Put(id, 1));
                    }
                    let floor = ctx.world_mut();
                    floor.in_flight = floor.in_flight.saturating_sub(1);
                    *floor.completed.entry(self.recipe.role).or_default() += 1;
                    self.phase = Phase::Ready;
                }
            }
        }
    }
}
