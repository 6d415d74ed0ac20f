use super::container::Container;
use super::error::SimError;
use super::process::{Process, SimContext, Yield};
use super::types::{ContainerId, ProcessId, SimTime};
use log::{debug, trace};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug)]
pub struct ScheduledWakeup {
    pub due: SimTime,
    pub sequence_num: u64,
    pub pid: ProcessId,
}

impl PartialEq for ScheduledWakeup {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledWakeup {}

impl PartialOrd for ScheduledWakeup {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledWakeup {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default)
        other
            .due
            .total_cmp(&self.due)
            .then_with(|| other.sequence_num.cmp(&self.sequence_num))
    }
}

/// Single-threaded cooperative discrete-event scheduler.
///
/// Owns the clock, the containers, every live process and the shared world
/// `W` that processes mutate while they hold control. Wake-ups are ordered by
/// due time, ties broken by insertion order.
pub struct Scheduler<W> {
    now: SimTime,
    event_queue: BinaryHeap<ScheduledWakeup>,
    sequence_counter: u64,
    processes: Vec<Option<Box<dyn Process<W>>>>,
    containers: Vec<Container>,
    world: W,
}

impl<W> Scheduler<W> {
    pub fn new(world: W) -> Self {
        Self {
            now: 0.0,
            event_queue: BinaryHeap::new(),
            sequence_counter: 0,
            processes: Vec::new(),
            containers: Vec::new(),
            world,
        }
    }

    pub fn add_container(&mut self, container: Container) -> ContainerId {
        self.containers.push(container);
        ContainerId(self.containers.len() - 1)
    }

    /// Register a process and wake it at the current time.
    pub fn spawn(&mut self, process: Box<dyn Process<W>>) -> ProcessId {
        let pid = self.processes.len();
        debug!("spawn {} as pid {} at t={}", process.name(), pid, self.now);
        self.processes.push(Some(process));
        self.schedule(pid, self.now);
        pid
    }

    fn schedule(&mut self, pid: ProcessId, due: SimTime) {
        self.event_queue.push(ScheduledWakeup {
            due,
            sequence_num: self.sequence_counter,
            pid,
        });
        self.sequence_counter += 1;
    }

    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn container(&self, id: ContainerId) -> Result<&Container, SimError> {
        self.containers
            .get(id.0)
            .ok_or(SimError::UnknownContainer(id))
    }

    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    pub fn pending_events(&self) -> usize {
        self.event_queue.len()
    }

    /// Number of processes still alive (running, sleeping or parked).
    pub fn live_processes(&self) -> usize {
        self.processes.iter().filter(|p| p.is_some()).count()
    }

    /// Run until the queue is exhausted or the next wake-up lies beyond
    /// `until`. The clock ends at `until`. Returns the number of wake-ups
    /// processed.
    pub fn run(&mut self, until: SimTime) -> Result<u64, SimError> {
        let mut steps = 0;
        while self.event_queue.peek().is_some_and(|w| w.due <= until) {
            self.step()?;
            steps += 1;
        }
        if until > self.now {
            self.now = until;
        }
        debug!(
            "run stopped at t={} after {} wake-ups, {} abandoned",
            self.now,
            steps,
            self.event_queue.len()
        );
        Ok(steps)
    }

    /// Resume the earliest wake-up. Returns false when the queue is empty.
    pub fn step(&mut self) -> Result<bool, SimError> {
        let Some(wakeup) = self.event_queue.pop() else {
            return Ok(false);
        };
        self.now = wakeup.due;
        let pid = wakeup.pid;
        trace!("t={} resume pid {}", self.now, pid);

        let mut process = self
            .processes
            .get_mut(pid)
            .ok_or(SimError::UnknownProcess(pid))?
            .take()
            .ok_or(SimError::UnknownProcess(pid))?;

        let mut spawned = Vec::new();
        let request = {
            let mut ctx = SimContext {
                now: self.now,
                pid,
                containers: &self.containers,
                world: &mut self.world,
                spawned: &mut spawned,
            };
            process.resume(&mut ctx)
        };

        if request == Yield::Finish {
            debug!("{} (pid {}) finished at t={}", process.name(), pid, self.now);
        } else {
            self.processes[pid] = Some(process);
            self.handle_request(pid, request)?;
        }

        for child in spawned {
            self.spawn(child);
        }
        Ok(true)
    }

    fn handle_request(&mut self, pid: ProcessId, request: Yield) -> Result<(), SimError> {
        match request {
            Yield::Timeout(delay) => {
                if !(delay >= 0.0 && delay.is_finite()) {
                    return Err(SimError::InvalidDelay {
                        delay,
                        now: self.now,
                    });
                }
                self.schedule(pid, self.now + delay);
            }
            Yield::Get(id, amount) => {
                let container = self
                    .containers
                    .get_mut(id.0)
                    .ok_or(SimError::UnknownContainer(id))?;
                if container.request_get(pid, amount)? {
                    self.schedule(pid, self.now);
                    self.wake_served(id);
                } else {
                    debug!("pid {} parked on get {} from '{}'", pid, amount, container.name());
                }
            }
            Yield::Put(id, amount) => {
                let container = self
                    .containers
                    .get_mut(id.0)
                    .ok_or(SimError::UnknownContainer(id))?;
                if container.request_put(pid, amount)? {
                    self.schedule(pid, self.now);
                    self.wake_served(id);
                } else {
                    debug!("pid {} parked on put {} into '{}'", pid, amount, container.name());
                }
            }
            Yield::Finish => {}
        }
        Ok(())
    }

    /// A level change may unblock parked requests; wake them in FIFO order.
    fn wake_served(&mut self, id: ContainerId) {
        let served = self.containers[id.0].settle();
        for pid in served {
            self.schedule(pid, self.now);
        }
    }

    /// Tear the scheduler down, keeping only the world and the containers.
    /// Pending wake-ups and parked requests are dropped.
    pub fn into_parts(self) -> (W, Vec<Container>) {
        (self.world, self.containers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wakeup_order_by_time_then_sequence() {
        let mut heap = BinaryHeap::new();
        heap.push(ScheduledWakeup { due: 2.0, sequence_num: 0, pid: 0 });
        heap.push(ScheduledWakeup { due: 1.0, sequence_num: 2, pid: 1 });
        heap.push(ScheduledWakeup { due: 1.0, sequence_num: 1, pid: 2 });
        let order: Vec<_> = std::iter::from_fn(|| heap.pop().map(|w| w.pid)).collect();
        assert_eq!(order, vec![2, 1, 0]);
    }

    #[test]
    fn test_run_on_empty_queue_advances_clock() {
        let mut scheduler: Scheduler<()> = Scheduler::new(());
        assert_eq!(scheduler.run(5.0).unwrap(), 0);
        assert_eq!(scheduler.now(), 5.0);
        assert!(!scheduler.step().unwrap());
    }
}
