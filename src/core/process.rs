use super::container::Container;
use super::types::{ContainerId, ProcessId, SimTime};

/// What a process asks of the scheduler when it hands control back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Yield {
    /// Resume after the given number of hours.
    Timeout(SimTime),
    /// Resume once `amount` units have been withdrawn from the container.
    Get(ContainerId, u32),
    /// Resume once `amount` units have been deposited into the container.
    Put(ContainerId, u32),
    /// The process is done and is dropped by the scheduler.
    Finish,
}

/// A resumable state machine driven by a [`Scheduler`](super::event_scheduler::Scheduler).
///
/// `resume` runs uninterrupted until it returns the next suspension point.
/// When it is called after a `Get`/`Put`, the request has already been
/// served.
pub trait Process<W> {
    fn name(&self) -> &str;
    fn resume(&mut self, ctx: &mut SimContext<'_, W>) -> Yield;
}

/// View of the simulation handed to a process while it holds control.
pub struct SimContext<'a, W> {
    pub(crate) now: SimTime,
    pub(crate) pid: ProcessId,
    pub(crate) containers: &'a [Container],
    pub(crate) world: &'a mut W,
    pub(crate) spawned: &'a mut Vec<Box<dyn Process<W>>>,
}

impl<'a, W> SimContext<'a, W> {
    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    /// Current level of a container, or 0 for an unknown handle.
    pub fn level(&self, id: ContainerId) -> u32 {
        self.containers.get(id.0).map_or(0, Container::level)
    }

    pub fn capacity(&self, id: ContainerId) -> u32 {
        self.containers.get(id.0).map_or(0, Container::capacity)
    }

    pub fn world(&self) -> &W {
        self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        self.world
    }

    /// Start a new process at the current time, after the caller yields.
    pub fn spawn(&mut self, process: Box<dyn Process<W>>) {
        self.spawned.push(process);
    }
}
