use super::ledger::FinancialLedger;
use super::roster::AttendanceRoster;
use super::types::{Role, Worker};
use crate::core::types::SimTime;
use log::debug;
use rand::rngs::StdRng;
use std::collections::BTreeMap;
use std::fmt::Display;

/// Chronological, human-readable record of one period run.
#[derive(Debug, Clone)]
pub struct EventLog {
    hours_per_day: f64,
    entries: Vec<String>,
}

impl EventLog {
    pub fn new(hours_per_day: f64) -> Self {
        Self {
            hours_per_day,
            entries: Vec::new(),
        }
    }

    /// Record `message` stamped with the simulated day (1-based) and hour.
    pub fn record(&mut self, now: SimTime, message: impl Display) {
        let day = (now / self.hours_per_day).floor() as u64 + 1;
        let hour = now % self.hours_per_day;
        let entry = format!("day {day}, hour {hour:.1}: {message}");
        debug!("{}", entry);
        self.entries.push(entry);
    }

    /// Record `message` at the close of a period lasting `horizon` hours,
    /// stamped as the end of its last shift rather than the start of the
    /// following day.
    pub fn record_at_close(&mut self, horizon: SimTime, message: impl Display) {
        let day = ((horizon / self.hours_per_day).round() as u64).max(1);
        let entry = format!("day {day}, hour {:.1}: {message}", self.hours_per_day);
        debug!("{}", entry);
        self.entries.push(entry);
    }

    pub fn separator(&mut self) {
        self.entries.push("----------------------------------".to_string());
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<String> {
        self.entries
    }
}

/// A worker waiting instead of working since `since`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenWait {
    pub since: SimTime,
    pub hourly_rate: f64,
}

/// Shared mutable state of the factory floor during one period run.
///
/// Every process sees it through the scheduler context while it holds
/// control, so mutation never overlaps.
pub struct Floor {
    pub ledger: FinancialLedger,
    pub log: EventLog,
    pub rng: StdRng,
    pub roster: AttendanceRoster,
    pub units_shipped: u64,
    /// Units whose inputs were withdrawn but whose outputs were not yet
    /// delivered.
    pub in_flight: u32,
    pub completed: BTreeMap<Role, u32>,
    pub scrapped: BTreeMap<Role, u32>,
    /// Waits not yet charged, closed when the worker resumes.
    pub open_waits: BTreeMap<Worker, OpenWait>,
}

impl Floor {
    pub fn new(
        ledger: FinancialLedger,
        roster: AttendanceRoster,
        rng: StdRng,
        hours_per_day: f64,
        units_shipped: u64,
    ) -> Self {
        Self {
            ledger,
            log: EventLog::new(hours_per_day),
            rng,
            roster,
            units_shipped,
            in_flight: 0,
            completed: BTreeMap::new(),
            scrapped: BTreeMap::new(),
            open_waits: BTreeMap::new(),
        }
    }

    pub fn record(&mut self, now: SimTime, message: impl Display) {
        self.log.record(now, message);
    }

    pub fn record_at_close(&mut self, horizon: SimTime, message: impl Display) {
        self.log.record_at_close(horizon, message);
    }

    pub fn begin_wait(&mut self, worker: Worker, since: SimTime, hourly_rate: f64) {
        self.open_waits.insert(worker, OpenWait { since, hourly_rate });
    }

    /// Close `worker`'s wait at `now` and charge it as idle cost.
    pub fn end_wait(&mut self, worker: Worker, now: SimTime) {
        if let Some(wait) = self.open_waits.remove(&worker) {
            self.charge_wait(wait, now);
        }
    }

    /// Charge every wait still open at `until`, e.g. workers parked on a
    /// container when the period ends. Returns the amount charged.
    pub fn close_open_waits(&mut self, until: SimTime) -> f64 {
        let waits = std::mem::take(&mut self.open_waits);
        waits
            .into_values()
            .map(|wait| self.charge_wait(wait, until))
            .sum()
    }

    fn charge_wait(&mut self, wait: OpenWait, now: SimTime) -> f64 {
        let cost = (now - wait.since).max(0.0) * wait.hourly_rate;
        if cost > 0.0 {
            self.ledger.add_idle_cost(cost);
        }
        cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_stamps_day_and_hour() {
        let mut log = EventLog::new(8.0);
        log.record(0.0, "start");
        log.record(19.5, "late");
        log.separator();
        assert_eq!(log.entries()[0], "day 1, hour 0.0: start");
        assert_eq!(log.entries()[1], "day 3, hour 3.5: late");
        assert_eq!(log.into_entries().len(), 3);
    }

    #[test]
    fn test_closing_lines_stay_inside_the_period() {
        let mut log = EventLog::new(8.0);
        log.record_at_close(40.0, "wrap up");
        assert_eq!(log.entries()[0], "day 5, hour 8.0: wrap up");
    }

    #[test]
    fn test_open_waits_are_charged_at_close() {
        use rand::SeedableRng;

        let mut floor = Floor::new(
            FinancialLedger::new(),
            AttendanceRoster::new(),
            StdRng::seed_from_u64(1),
            8.0,
            0,
        );
        let body = Worker::new(Role::BodyMaker, 0);
        let painter = Worker::new(Role::Painter, 0);
        floor.begin_wait(body, 1.0, 22.0);
        floor.begin_wait(painter, 6.0, 20.0);
        floor.end_wait(painter, 7.0);
        assert_eq!(floor.ledger.idle_costs(), 20.0);

        let charged = floor.close_open_waits(8.0);
        assert_eq!(charged, 7.0 * 22.0);
        assert_eq!(floor.ledger.idle_costs(), 20.0 + 7.0 * 22.0);
        assert!(floor.open_waits.is_empty());
    }
}
