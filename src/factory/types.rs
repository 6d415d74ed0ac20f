use crate::core::types::ContainerId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Production role staffed by one or more worker slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    BodyMaker,
    NeckMaker,
    Painter,
    Assembler,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::BodyMaker, Role::NeckMaker, Role::Painter, Role::Assembler];

    pub fn name(self) -> &'static str {
        match self {
            Role::BodyMaker => "body_maker",
            Role::NeckMaker => "neck_maker",
            Role::Painter => "painter",
            Role::Assembler => "assembler",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every stock buffer on the factory floor.
///
/// Containers are registered with the scheduler in [`Buffer::ALL`] order, so
/// a buffer's handle is its position in that list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Buffer {
    Wood,
    Electronic,
    BodyPrePaint,
    NeckPrePaint,
    BodyPostPaint,
    NeckPostPaint,
    Dispatch,
}

impl Buffer {
    pub const ALL: [Buffer; 7] = [
        Buffer::Wood,
        Buffer::Electronic,
        Buffer::BodyPrePaint,
        Buffer::NeckPrePaint,
        Buffer::BodyPostPaint,
        Buffer::NeckPostPaint,
        Buffer::Dispatch,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Buffer::Wood => "wood",
            Buffer::Electronic => "electronic",
            Buffer::BodyPrePaint => "body_pre_paint",
            Buffer::NeckPrePaint => "neck_pre_paint",
            Buffer::BodyPostPaint => "body_post_paint",
            Buffer::NeckPostPaint => "neck_post_paint",
            Buffer::Dispatch => "dispatch",
        }
    }

    pub fn id(self) -> ContainerId {
        ContainerId(self as usize)
    }
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A worker is identified by its role and slot number within that role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Worker {
    pub role: Role,
    pub slot: u32,
}

impl Worker {
    pub fn new(role: Role, slot: u32) -> Self {
        Self { role, slot }
    }
}

impl fmt::Display for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.role, self.slot + 1)
    }
}

/// Head count per role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerCounts {
    pub body_makers: u32,
    pub neck_makers: u32,
    pub painters: u32,
    pub assemblers: u32,
}

impl WorkerCounts {
    pub fn new(body_makers: u32, neck_makers: u32, painters: u32, assemblers: u32) -> Self {
        Self {
            body_makers,
            neck_makers,
            painters,
            assemblers,
        }
    }

    pub fn get(&self, role: Role) -> u32 {
        match role {
            Role::BodyMaker => self.body_makers,
            Role::NeckMaker => self.neck_makers,
            Role::Painter => self.painters,
            Role::Assembler => self.assemblers,
        }
    }

    pub fn total(&self) -> u32 {
        Role::ALL.iter().map(|r| self.get(*r)).sum()
    }

    /// Every worker slot, role by role.
    pub fn workers(&self) -> impl Iterator<Item = Worker> + '_ {
        Role::ALL
            .into_iter()
            .flat_map(move |role| (0..self.get(role)).map(move |slot| Worker::new(role, slot)))
    }
}

impl Default for WorkerCounts {
    fn default() -> Self {
        Self::new(2, 1, 3, 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_ids_follow_registration_order() {
        for (i, buffer) in Buffer::ALL.iter().enumerate() {
            assert_eq!(buffer.id(), ContainerId(i));
        }
    }

    #[test]
    fn test_worker_enumeration() {
        let counts = WorkerCounts::new(2, 0, 1, 0);
        let workers: Vec<_> = counts.workers().collect();
        assert_eq!(
            workers,
            vec![
                Worker::new(Role::BodyMaker, 0),
                Worker::new(Role::BodyMaker, 1),
                Worker::new(Role::Painter, 0),
            ]
        );
        assert_eq!(counts.total(), 3);
        assert_eq!(workers[1].to_string(), "body_maker 2");
    }
}
