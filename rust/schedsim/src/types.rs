//! Newtype wrappers and type aliases for domain concepts.
//!
//! Newtypes for identifiers (process handles, resource indices) prevent
//! silently passing one where the other is expected. Type aliases for
//! plain quantities (ticks, priorities) keep arithmetic simple.

use std::fmt;

use serde::Serialize;

/// Number of resources in the system.
pub const NR_RESOURCES: usize = 32;

/// Simulated time in ticks.
pub type Tick = u64;

/// Scheduling priority. Larger values are more urgent.
pub type Priority = u32;

/// Process identifier.
///
/// Pids are assigned densely in arrival order and double as the
/// process's index into the simulation arena, so a `Pid` stays valid
/// however often the process moves between queues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Pid(pub u32);

impl Pid {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resource identifier, always in `[0, NR_RESOURCES)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(u8);

impl ResourceId {
    /// Checked constructor. Returns `None` for out-of-range indices.
    pub fn new(id: usize) -> Option<Self> {
        (id < NR_RESOURCES).then_some(ResourceId(id as u8))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Every resource in index order.
    pub fn all() -> impl Iterator<Item = ResourceId> {
        (0..NR_RESOURCES as u8).map(ResourceId)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}
