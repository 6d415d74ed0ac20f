use super::types::{Role, Worker, WorkerCounts};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Who showed up today, and which workers currently have a running stage
/// process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRoster {
    day: u32,
    present: BTreeSet<Worker>,
    #[serde(skip)]
    active: BTreeSet<Worker>,
}

impl AttendanceRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw attendance for `day`: each slot is absent with probability
    /// `sick_probability`, independently. Returns the absent workers.
    pub fn roll<R: Rng + ?Sized>(
        &mut self,
        day: u32,
        counts: &WorkerCounts,
        sick_probability: f64,
        rng: &mut R,
    ) -> Vec<Worker> {
        self.day = day;
        self.present.clear();
        let mut absent = Vec::new();
        for worker in counts.workers() {
            if rng.gen_bool(sick_probability) {
                absent.push(worker);
            } else {
                self.present.insert(worker);
            }
        }
        absent
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn is_present(&self, worker: Worker) -> bool {
        self.present.contains(&worker)
    }

    pub fn present(&self) -> impl Iterator<Item = Worker> + '_ {
        self.present.iter().copied()
    }

    pub fn present_in(&self, role: Role) -> usize {
        self.present.iter().filter(|w| w.role == role).count()
    }

    /// Mark a worker as having a running process. Returns false if it
    /// already had one.
    pub fn activate(&mut self, worker: Worker) -> bool {
        self.active.insert(worker)
    }

    pub fn retire(&mut self, worker: Worker) {
        self.active.remove(&worker);
    }

    pub fn is_active(&self, worker: Worker) -> bool {
        self.active.contains(&worker)
    }

    /// Forget running processes; used when a scheduler is torn down.
    pub fn clear_active(&mut self) {
        self.active.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_everyone_present_without_sickness() {
        let mut roster = AttendanceRoster::new();
        let mut rng = StdRng::seed_from_u64(5);
        let counts = WorkerCounts::new(2, 1, 3, 2);
        let absent = roster.roll(0, &counts, 0.0, &mut rng);
        assert!(absent.is_empty());
        assert_eq!(roster.present().count(), 8);
        assert_eq!(roster.present_in(Role::Painter), 3);
    }

    #[test]
    fn test_everyone_absent_when_certain() {
        let mut roster = AttendanceRoster::new();
        let mut rng = StdRng::seed_from_u64(5);
        let counts = WorkerCounts::new(1, 1, 1, 1);
        let absent = roster.roll(3, &counts, 1.0, &mut rng);
        assert_eq!(absent.len(), 4);
        assert_eq!(roster.day(), 3);
        assert!(!roster.is_present(Worker::new(Role::BodyMaker, 0)));
    }

    #[test]
    fn test_reroll_replaces_previous_day() {
        let mut roster = AttendanceRoster::new();
        let mut rng = StdRng::seed_from_u64(9);
        roster.roll(0, &WorkerCounts::new(3, 0, 0, 0), 0.0, &mut rng);
        roster.roll(1, &WorkerCounts::new(1, 0, 0, 0), 0.0, &mut rng);
        assert_eq!(roster.present().count(), 1);
        assert!(!roster.is_present(Worker::new(Role::BodyMaker, 2)));
    }

    #[test]
    fn test_activation_is_idempotent() {
        let mut roster = AttendanceRoster::new();
        let worker = Worker::new(Role::Assembler, 0);
        assert!(roster.activate(worker));
        assert!(!roster.activate(worker));
        roster.retire(worker);
        assert!(!roster.is_active(worker));
    }
}
