//! Resource table.
//!
//! A fixed set of `NR_RESOURCES` exclusive resources. Each has at most one
//! owner and a FIFO waitqueue of blocked processes. The table holds no
//! policy logic; see [`crate::arbitration`] for the grant/wake protocol.

use std::collections::VecDeque;

use crate::types::{Pid, ResourceId, NR_RESOURCES};

/// A single exclusive resource.
#[derive(Debug, Clone, Default)]
pub struct Resource {
    /// The owning process. `None` means the resource is free.
    pub owner: Option<Pid>,
    /// Processes blocked on this resource, in enqueue order.
    pub waitqueue: VecDeque<Pid>,
}

impl Resource {
    pub fn is_free(&self) -> bool {
        self.owner.is_none()
    }

    /// Remove `pid` from the waitqueue. Returns true if it was queued.
    pub fn remove_waiter(&mut self, pid: Pid) -> bool {
        if let Some(pos) = self.waitqueue.iter().position(|&p| p == pid) {
            self.waitqueue.remove(pos);
            true
        } else {
            false
        }
    }
}

/// All resources in the system, indexed by [`ResourceId`].
#[derive(Debug, Clone)]
pub struct ResourceTable {
    resources: [Resource; NR_RESOURCES],
}

impl ResourceTable {
    pub fn new() -> Self {
        ResourceTable {
            resources: std::array::from_fn(|_| Resource::default()),
        }
    }

    pub fn get(&self, id: ResourceId) -> &Resource {
        &self.resources[id.index()]
    }

    pub fn get_mut(&mut self, id: ResourceId) -> &mut Resource {
        &mut self.resources[id.index()]
    }

    /// Iterate over every resource with its id.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceId, &Resource)> {
        ResourceId::all().zip(self.resources.iter())
    }

    /// Resources currently owned by `pid`.
    pub fn owned_by(&self, pid: Pid) -> impl Iterator<Item = ResourceId> + '_ {
        self.iter()
            .filter(move |(_, r)| r.owner == Some(pid))
            .map(|(id, _)| id)
    }
}

impl Default for ResourceTable {
    fn default() -> Self {
        Self::new()
    }
}
