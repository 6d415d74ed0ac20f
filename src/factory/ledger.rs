use serde::{Deserialize, Serialize};

/// Running financial totals of a session.
///
/// Every cost and revenue field only grows. Profit is never stored; it is
/// derived from the other fields on demand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialLedger {
    total_revenue: f64,
    material_costs: f64,
    labor_costs: f64,
    idle_costs: f64,
    fixed_costs: f64,
    demand_penalty: f64,
}

/// Point-in-time copy of a ledger, including the derived profit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub total_revenue: f64,
    pub material_costs: f64,
    pub labor_costs: f64,
    pub idle_costs: f64,
    pub fixed_costs: f64,
    pub demand_penalty: f64,
    pub profit: f64,
}

fn accrue(field: &mut f64, amount: f64) {
    debug_assert!(amount >= 0.0, "ledger entries never shrink, got {amount}");
    if amount > 0.0 {
        *field += amount;
    }
}

impl FinancialLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_revenue(&mut self, amount: f64) {
        accrue(&mut self.total_revenue, amount);
    }

    pub fn add_material_cost(&mut self, amount: f64) {
        accrue(&mut self.material_costs, amount);
    }

    pub fn add_labor_cost(&mut self, amount: f64) {
        accrue(&mut self.labor_costs, amount);
    }

    pub fn add_idle_cost(&mut self, amount: f64) {
        accrue(&mut self.idle_costs, amount);
    }

    pub fn add_fixed_cost(&mut self, amount: f64) {
        accrue(&mut self.fixed_costs, amount);
    }

    pub fn add_demand_penalty(&mut self, amount: f64) {
        accrue(&mut self.demand_penalty, amount);
    }

    pub fn total_revenue(&self) -> f64 {
        self.total_revenue
    }

    pub fn material_costs(&self) -> f64 {
        self.material_costs
    }

    pub fn idle_costs(&self) -> f64 {
        self.idle_costs
    }

    pub fn profit(&self) -> f64 {
        self.total_revenue
            - self.material_costs
            - self.labor_costs
            - self.fixed_costs
            - self.idle_costs
            - self.demand_penalty
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            total_revenue: self.total_revenue,
            material_costs: self.material_costs,
            labor_costs: self.labor_costs,
            idle_costs: self.idle_costs,
            fixed_costs: self.fixed_costs,
            demand_penalty: self.demand_penalty,
            profit: self.profit(),
        }
    }
}

impl LedgerSnapshot {
    /// Field-wise difference, e.g. the activity of a single period.
    pub fn since(&self, earlier: &LedgerSnapshot) -> LedgerSnapshot {
        LedgerSnapshot {
            total_revenue: self.total_revenue - earlier.total_revenue,
            material_costs: self.material_costs - earlier.material_costs,
            labor_costs: self.labor_costs - earlier.labor_costs,
            idle_costs: self.idle_costs - earlier.idle_costs,
            fixed_costs: self.fixed_costs - earlier.fixed_costs,
            demand_penalty: self.demand_penalty - earlier.demand_penalty,
            profit: self.profit - earlier.profit,
        }
    }
}

/// Wage for `hours` in one period: hours past `threshold` are paid at
/// `rate * multiplier`.
pub fn overtime_pay(hours: f64, rate: f64, threshold: f64, multiplier: f64) -> f64 {
    let regular = hours.min(threshold);
    let overtime = (hours - threshold).max(0.0);
    regular * rate + overtime * rate * multiplier
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profit_is_derived_residual() {
        let mut ledger = FinancialLedger::new();
        ledger.add_revenue(40_000.0);
        ledger.add_material_cost(4_500.0);
        ledger.add_labor_cost(3_000.0);
        ledger.add_idle_cost(120.0);
        ledger.add_fixed_cost(5_000.0);
        ledger.add_demand_penalty(800.0);
        assert_eq!(ledger.profit(), 40_000.0 - 4_500.0 - 3_000.0 - 5_000.0 - 120.0 - 800.0);
        assert_eq!(ledger.snapshot().profit, ledger.profit());
    }

    #[test]
    fn test_overtime_applies_past_forty_hours() {
        assert_eq!(overtime_pay(40.0, 20.0, 40.0, 1.5), 800.0);
        assert_eq!(overtime_pay(30.0, 20.0, 40.0, 1.5), 600.0);
        assert_eq!(overtime_pay(50.0, 20.0, 40.0, 1.5), 800.0 + 10.0 * 30.0);
    }

    #[test]
    fn test_snapshot_delta() {
        let mut ledger = FinancialLedger::new();
        ledger.add_revenue(1_000.0);
        let before = ledger.snapshot();
        ledger.add_revenue(500.0);
        ledger.add_fixed_cost(200.0);
        let delta = ledger.snapshot().since(&before);
        assert_eq!(delta.total_revenue, 500.0);
        assert_eq!(delta.fixed_costs, 200.0);
        assert_eq!(delta.profit, 300.0);
    }
}
