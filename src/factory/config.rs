use super::error::ConfigError;
use super::types::{Buffer, Role, WorkerCounts};
use serde::{Deserialize, Serialize};

/// Target arithmetic mean and standard deviation of a distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Moments {
    pub mean: f64,
    pub std_dev: f64,
}

impl Moments {
    pub const fn new(mean: f64, std_dev: f64) -> Self {
        Self { mean, std_dev }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacities {
    pub wood: u32,
    pub electronic: u32,
    pub body_pre_paint: u32,
    pub neck_pre_paint: u32,
    pub body_post_paint: u32,
    pub neck_post_paint: u32,
    pub dispatch: u32,
}

impl Capacities {
    pub fn get(&self, buffer: Buffer) -> u32 {
        match buffer {
            Buffer::Wood => self.wood,
            Buffer::Electronic => self.electronic,
            Buffer::BodyPrePaint => self.body_pre_paint,
            Buffer::NeckPrePaint => self.neck_pre_paint,
            Buffer::BodyPostPaint => self.body_post_paint,
            Buffer::NeckPostPaint => self.neck_post_paint,
            Buffer::Dispatch => self.dispatch,
        }
    }

    pub fn set(&mut self, buffer: Buffer, capacity: u32) {
        let slot = match buffer {
            Buffer::Wood => &mut self.wood,
            Buffer::Electronic => &mut self.electronic,
            Buffer::BodyPrePaint => &mut self.body_pre_paint,
            Buffer::NeckPrePaint => &mut self.neck_pre_paint,
            Buffer::BodyPostPaint => &mut self.body_post_paint,
            Buffer::NeckPostPaint => &mut self.neck_post_paint,
            Buffer::Dispatch => &mut self.dispatch,
        };
        *slot = capacity;
    }
}

impl Default for Capacities {
    fn default() -> Self {
        Self {
            wood: 500,
            electronic: 100,
            body_pre_paint: 60,
            neck_pre_paint: 60,
            body_post_paint: 120,
            neck_post_paint: 120,
            dispatch: 500,
        }
    }
}

/// Level at or below which a raw material is reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReorderPoint {
    Fixed(u32),
    /// Enough stock to start this many shifts of work for the roles that
    /// consume the material.
    ShiftsOfCover(u32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockPolicy {
    pub reorder_point: ReorderPoint,
    pub order_size: u32,
    pub lead_time_hours: f64,
    pub unit_price: f64,
}

/// Poll and cooldown shared by every control loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlTiming {
    pub poll_hours: f64,
    pub cooldown_hours: f64,
}

impl Default for ControlTiming {
    fn default() -> Self {
        Self {
            poll_hours: 1.0,
            cooldown_hours: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchPolicy {
    pub pickup_delay_hours: f64,
    pub sale_price: f64,
    pub dispatch_cost: f64,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            pickup_delay_hours: 4.0,
            sale_price: 800.0,
            dispatch_cost: 150.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSettings {
    pub process_time: Moments,
    pub quality: Moments,
    pub hourly_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTable {
    pub body_maker: StageSettings,
    pub neck_maker: StageSettings,
    /// `quality` judges the painted body.
    pub painter: StageSettings,
    pub assembler: StageSettings,
    pub painted_neck_quality: Moments,
}

impl StageTable {
    pub fn get(&self, role: Role) -> &StageSettings {
        match role {
            Role::BodyMaker => &self.body_maker,
            Role::NeckMaker => &self.neck_maker,
            Role::Painter => &self.painter,
            Role::Assembler => &self.assembler,
        }
    }

    pub fn get_mut(&mut self, role: Role) -> &mut StageSettings {
        match role {
            Role::BodyMaker => &mut self.body_maker,
            Role::NeckMaker => &mut self.neck_maker,
            Role::Painter => &mut self.painter,
            Role::Assembler => &mut self.assembler,
        }
    }
}

impl Default for StageTable {
    fn default() -> Self {
        Self {
            body_maker: StageSettings {
                process_time: Moments::new(1.0, 0.2),
                quality: Moments::new(0.92, 0.05),
                hourly_rate: 22.0,
            },
            neck_maker: StageSettings {
                process_time: Moments::new(1.0, 0.2),
                quality: Moments::new(0.93, 0.05),
                hourly_rate: 22.0,
            },
            painter: StageSettings {
                process_time: Moments::new(2.0, 0.4),
                quality: Moments::new(0.95, 0.04),
                hourly_rate: 20.0,
            },
            assembler: StageSettings {
                process_time: Moments::new(1.0, 0.2),
                quality: Moments::new(0.96, 0.04),
                hourly_rate: 25.0,
            },
            painted_neck_quality: Moments::new(0.95, 0.04),
        }
    }
}

/// Every tunable of the factory that is fixed for the whole session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactoryConfig {
    pub capacities: Capacities,
    pub wood: StockPolicy,
    pub electronic: StockPolicy,
    pub control: ControlTiming,
    pub dispatch: DispatchPolicy,
    pub stages: StageTable,
    pub quality_threshold: f64,
    pub safety_margin: u32,
    pub idle_tick_hours: f64,
    pub sick_probability: f64,
    pub overtime_threshold_hours: f64,
    pub overtime_multiplier: f64,
    pub daily_fixed_cost: f64,
    pub penalty_factor: f64,
    pub initial_stock_days: u32,
    pub total_periods: u32,
    pub random_seed: Option<u64>,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            capacities: Capacities::default(),
            wood: StockPolicy {
                reorder_point: ReorderPoint::ShiftsOfCover(3),
                order_size: 300,
                lead_time_hours: 16.0,
                unit_price: 15.0,
            },
            electronic: StockPolicy {
                reorder_point: ReorderPoint::Fixed(30),
                order_size: 30,
                lead_time_hours: 9.0,
                unit_price: 45.0,
            },
            control: ControlTiming::default(),
            dispatch: DispatchPolicy::default(),
            stages: StageTable::default(),
            quality_threshold: 0.8,
            safety_margin: 5,
            idle_tick_hours: 0.1,
            sick_probability: 0.05,
            overtime_threshold_hours: 40.0,
            overtime_multiplier: 1.5,
            daily_fixed_cost: 1000.0,
            penalty_factor: 0.5,
            initial_stock_days: 5,
            total_periods: 4,
            random_seed: Some(42),
        }
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::out_of_range(field, "a finite number >= 0", value))
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::out_of_range(field, "a finite number > 0", value))
    }
}

fn probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::out_of_range(field, "a probability in [0, 1]", value))
    }
}

fn moments(field: &'static str, m: Moments) -> Result<(), ConfigError> {
    positive(field, m.mean)?;
    non_negative(field, m.std_dev)
}

impl StockPolicy {
    fn validate(&self, name: &'static str, capacity: u32) -> Result<(), ConfigError> {
        if self.order_size == 0 || self.order_size > capacity {
            return Err(ConfigError::out_of_range(
                name,
                "an order size between 1 and the container capacity",
                self.order_size,
            ));
        }
        non_negative(name, self.lead_time_hours)?;
        non_negative(name, self.unit_price)
    }
}

impl FactoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_random_seed(mut self, seed: Option<u64>) -> Self {
        self.random_seed = seed;
        self
    }

    pub fn with_total_periods(mut self, periods: u32) -> Self {
        self.total_periods = periods;
        self
    }

    pub fn with_sick_probability(mut self, probability: f64) -> Self {
        self.sick_probability = probability;
        self
    }

    pub fn with_capacity(mut self, buffer: Buffer, capacity: u32) -> Self {
        self.capacities.set(buffer, capacity);
        self
    }

    pub fn with_stage(mut self, role: Role, settings: StageSettings) -> Self {
        *self.stages.get_mut(role) = settings;
        self
    }

    pub fn with_quality_threshold(mut self, threshold: f64) -> Self {
        self.quality_threshold = threshold;
        self
    }

    pub fn with_initial_stock_days(mut self, days: u32) -> Self {
        self.initial_stock_days = days;
        self
    }

    pub fn with_dispatch(mut self, dispatch: DispatchPolicy) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn stock_policy(&self, buffer: Buffer) -> Option<&StockPolicy> {
        match buffer {
            Buffer::Wood => Some(&self.wood),
            Buffer::Electronic => Some(&self.electronic),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for buffer in Buffer::ALL {
            if self.capacities.get(buffer) == 0 {
                return Err(ConfigError::out_of_range(
                    buffer.name(),
                    "a capacity greater than 0",
                    0,
                ));
            }
        }
        // A stage that starts only when it has this much headroom must be able to.
        for buffer in [
            Buffer::BodyPrePaint,
            Buffer::NeckPrePaint,
            Buffer::BodyPostPaint,
            Buffer::NeckPostPaint,
            Buffer::Dispatch,
        ] {
            if self.capacities.get(buffer) <= self.safety_margin {
                return Err(ConfigError::out_of_range(
                    buffer.name(),
                    "a capacity above the safety margin",
                    self.capacities.get(buffer),
                ));
            }
        }
        // Body makers draw two units of wood per body.
        if self.capacities.wood < 2 {
            return Err(ConfigError::out_of_range("wood", "a capacity of at least 2", self.capacities.wood));
        }

        self.wood.validate("wood policy", self.capacities.wood)?;
        self.electronic.validate("electronic policy", self.capacities.electronic)?;

        positive("control.poll_hours", self.control.poll_hours)?;
        non_negative("control.cooldown_hours", self.control.cooldown_hours)?;

        non_negative("dispatch.pickup_delay_hours", self.dispatch.pickup_delay_hours)?;
        non_negative("dispatch.sale_price", self.dispatch.sale_price)?;
        non_negative("dispatch.dispatch_cost", self.dispatch.dispatch_cost)?;

        for role in Role::ALL {
            let stage = self.stages.get(role);
            moments("stage process time", stage.process_time)?;
            non_negative("stage quality std_dev", stage.quality.std_dev)?;
            if !stage.quality.mean.is_finite() {
                return Err(ConfigError::out_of_range("stage quality mean", "finite", stage.quality.mean));
            }
            non_negative("stage hourly rate", stage.hourly_rate)?;
        }
        let neck = self.stages.painted_neck_quality;
        non_negative("painted neck quality std_dev", neck.std_dev)?;
        if !neck.mean.is_finite() {
            return Err(ConfigError::out_of_range("painted neck quality mean", "finite", neck.mean));
        }

        if !self.quality_threshold.is_finite() {
            return Err(ConfigError::out_of_range("quality_threshold", "finite", self.quality_threshold));
        }
        positive("idle_tick_hours", self.idle_tick_hours)?;
        probability("sick_probability", self.sick_probability)?;
        positive("overtime_threshold_hours", self.overtime_threshold_hours)?;
        if !(self.overtime_multiplier.is_finite() && self.overtime_multiplier >= 1.0) {
            return Err(ConfigError::out_of_range(
                "overtime_multiplier",
                "a multiplier >= 1",
                self.overtime_multiplier,
            ));
        }
        non_negative("daily_fixed_cost", self.daily_fixed_cost)?;
        non_negative("penalty_factor", self.penalty_factor)?;

        if self.total_periods == 0 {
            return Err(ConfigError::out_of_range("total_periods", "at least 1", 0));
        }

        Ok(())
    }
}

/// Per-period parameters supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodParams {
    pub hours_per_day: u32,
    pub days_per_period: u32,
    pub workers: WorkerCounts,
    pub dispatch_threshold: u32,
    pub total_demand: u32,
    /// 1-based. Period 1 starts a new session.
    pub period_index: u32,
}

impl Default for PeriodParams {
    fn default() -> Self {
        Self {
            hours_per_day: 8,
            days_per_period: 5,
            workers: WorkerCounts::default(),
            dispatch_threshold: 50,
            total_demand: 400,
            period_index: 1,
        }
    }
}

impl PeriodParams {
    pub fn with_period(mut self, period_index: u32) -> Self {
        self.period_index = period_index;
        self
    }

    pub fn with_workers(mut self, workers: WorkerCounts) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_shift(mut self, hours_per_day: u32, days_per_period: u32) -> Self {
        self.hours_per_day = hours_per_day;
        self.days_per_period = days_per_period;
        self
    }

    pub fn with_dispatch_threshold(mut self, threshold: u32) -> Self {
        self.dispatch_threshold = threshold;
        self
    }

    pub fn with_total_demand(mut self, demand: u32) -> Self {
        self.total_demand = demand;
        self
    }

    /// Length of the period in simulated hours.
    pub fn horizon_hours(&self) -> f64 {
        f64::from(self.hours_per_day) * f64::from(self.days_per_period)
    }

    pub fn validate(&self, config: &FactoryConfig) -> Result<(), ConfigError> {
        if self.hours_per_day == 0 || self.hours_per_day > 24 {
            return Err(ConfigError::out_of_range(
                "hours_per_day",
                "between 1 and 24",
                self.hours_per_day,
            ));
        }
        if self.days_per_period == 0 {
            return Err(ConfigError::out_of_range("days_per_period", "at least 1", 0));
        }
        if self.period_index == 0 {
            return Err(ConfigError::out_of_range("period_index", "at least 1 (1-based)", 0));
        }
        if self.period_index > config.total_periods {
            return Err(ConfigError::BeyondSession {
                period: self.period_index,
                total_periods: config.total_periods,
            });
        }
        if self.dispatch_threshold > config.capacities.dispatch {
            return Err(ConfigError::out_of_range(
                "dispatch_threshold",
                "at most the dispatch capacity",
                self.dispatch_threshold,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FactoryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.capacities.wood, 500);
        assert_eq!(config.wood.reorder_point, ReorderPoint::ShiftsOfCover(3));
        assert_eq!(config.electronic.lead_time_hours, 9.0);
        assert_eq!(config.quality_threshold, 0.8);
        assert_eq!(config.random_seed, Some(42));
    }

    #[test]
    fn test_builder_pattern() {
        let config = FactoryConfig::new()
            .with_random_seed(None)
            .with_total_periods(2)
            .with_sick_probability(0.0)
            .with_capacity(Buffer::Dispatch, 80);

        assert_eq!(config.random_seed, None);
        assert_eq!(config.total_periods, 2);
        assert_eq!(config.sick_probability, 0.0);
        assert_eq!(config.capacities.get(Buffer::Dispatch), 80);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let mut config = FactoryConfig::default();
        config.sick_probability = 1.5;
        assert!(config.validate().is_err());

        config = FactoryConfig::default();
        config.capacities.wood = 0;
        assert!(config.validate().is_err());

        config = FactoryConfig::default();
        config.electronic.order_size = 101;
        assert!(config.validate().is_err());

        config = FactoryConfig::default();
        config.stages.painter.process_time = Moments::new(0.0, 0.1);
        assert!(config.validate().is_err());

        config = FactoryConfig::default().with_capacity(Buffer::BodyPrePaint, 5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_quality_means_must_be_finite() {
        let mut config = FactoryConfig::default();
        config.stages.painted_neck_quality = Moments::new(f64::NAN, 0.04);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { field: "painted neck quality mean", .. })
        ));

        config = FactoryConfig::default();
        config.stages.assembler.quality = Moments::new(f64::INFINITY, 0.04);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_period_params_validation() {
        let config = FactoryConfig::default();
        assert!(PeriodParams::default().validate(&config).is_ok());
        assert!(PeriodParams::default().with_shift(0, 5).validate(&config).is_err());
        assert!(PeriodParams::default().with_period(0).validate(&config).is_err());
        assert_eq!(
            PeriodParams::default().with_period(5).validate(&config),
            Err(ConfigError::BeyondSession {
                period: 5,
                total_periods: 4
            })
        );
        assert!(PeriodParams::default()
            .with_dispatch_threshold(501)
            .validate(&config)
            .is_err());
    }

    #[test]
    fn test_horizon() {
        let params = PeriodParams::default().with_shift(8, 5);
        assert_eq!(params.horizon_hours(), 40.0);
    }
}
