//! Resource arbitration: granting, queueing and handing over resources.
//!
//! Three flavours are used by the policies:
//!
//! - **FIFO**: waiters are woken in the order they blocked.
//! - **Priority**: the waiter with the highest effective priority is
//!   woken; equal priorities fall back to blocking order.
//! - **Inheritance**: priority wake-up, plus the owner of a contested
//!   resource runs at the priority of its most urgent waiter until it
//!   releases.
//!
//! A denied request leaves the requester WAITING on the resource; the
//! caller must then call `schedule()` to pick a replacement.

use std::cmp::Reverse;

use tracing::debug;

use crate::process::ProcessStatus;
use crate::state::SimState;
use crate::types::{Pid, Priority, ResourceId};

/// Result of an acquire call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquire {
    /// The requester now owns the resource.
    Granted,
    /// The resource is owned by someone else; the requester is queued.
    Denied,
}

/// Which waiter a release hands the resource to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeOrder {
    Fifo,
    Priority,
}

/// Acquire/release protocol shared by the scheduling policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arbiter {
    pub wake: WakeOrder,
    pub inheritance: bool,
}

impl Arbiter {
    pub const FIFO: Arbiter = Arbiter {
        wake: WakeOrder::Fifo,
        inheritance: false,
    };
    pub const PRIORITY: Arbiter = Arbiter {
        wake: WakeOrder::Priority,
        inheritance: false,
    };
    pub const INHERIT: Arbiter = Arbiter {
        wake: WakeOrder::Priority,
        inheritance: true,
    };

    /// Request `resource` on behalf of the running process `requester`.
    ///
    /// # Panics
    /// Panics if the requester is not running or already owns the resource.
    pub fn acquire(&self, state: &mut SimState, resource: ResourceId, requester: Pid) -> Acquire {
        let status = state.process(requester).status;
        assert_eq!(
            status,
            ProcessStatus::Running,
            "pid {requester} acquires {resource} while {status:?}"
        );

        let owner = match state.resource(resource).owner {
            None => {
                state.resource_mut(resource).owner = Some(requester);
                debug!(pid = requester.0, %resource, "granted");
                return Acquire::Granted;
            }
            Some(owner) => owner,
        };
        assert_ne!(owner, requester, "pid {requester} re-acquires {resource}");

        let p = state.process_mut(requester);
        p.status = ProcessStatus::Waiting;
        p.blocked_on = Some(resource);
        let prio = p.priority_effective;
        state.resource_mut(resource).waitqueue.push_back(requester);
        debug!(pid = requester.0, %resource, owner = owner.0, "denied");

        if self.inheritance {
            propagate_boost(state, owner, prio);
        }
        Acquire::Denied
    }

    /// Give `resource` back and wake at most one waiter.
    ///
    /// Returns the woken process, which is now READY at the Ready Queue tail.
    ///
    /// # Panics
    /// Panics if `releaser` does not own the resource.
    pub fn release(&self, state: &mut SimState, resource: ResourceId, releaser: Pid) -> Option<Pid> {
        let owner = state.resource(resource).owner;
        assert_eq!(
            owner,
            Some(releaser),
            "pid {releaser} releases {resource} owned by {owner:?}"
        );
        state.resource_mut(resource).owner = None;

        if self.inheritance {
            let restored = inherited_priority(state, releaser);
            let p = state.process_mut(releaser);
            if p.priority_effective != restored {
                debug!(pid = releaser.0, from = p.priority_effective, to = restored, "priority restored");
            }
            p.priority_effective = restored;
        }

        let waiter = self.pick_waiter(state, resource)?;
        let r = state.resource_mut(resource);
        r.remove_waiter(waiter);

        let status = state.process(waiter).status;
        assert_eq!(
            status,
            ProcessStatus::Waiting,
            "pid {waiter} woken from {resource} while {status:?}"
        );
        state.requeue(waiter);
        debug!(pid = waiter.0, %resource, "woken");
        Some(waiter)
    }

    fn pick_waiter(&self, state: &SimState, resource: ResourceId) -> Option<Pid> {
        let queue = &state.resource(resource).waitqueue;
        match self.wake {
            WakeOrder::Fifo => queue.front().copied(),
            // `min_by_key` keeps the first of equal keys: earliest blocker wins ties.
            WakeOrder::Priority => queue
                .iter()
                .copied()
                .min_by_key(|&pid| Reverse(state.process(pid).priority_effective)),
        }
    }
}

/// Raise `owner` and, if it is itself blocked, the owners along its wait
/// chain to at least `prio`. Never lowers a priority. The walk stops at the
/// first process already at `prio` or above, which also ends it on a cycle.
fn propagate_boost(state: &mut SimState, owner: Pid, prio: Priority) {
    let mut next = Some(owner);
    while let Some(pid) = next {
        let p = state.process_mut(pid);
        if p.priority_effective >= prio {
            break;
        }
        debug!(pid = pid.0, from = p.priority_effective, to = prio, "priority inherited");
        p.priority_effective = prio;

        next = match (p.status, p.blocked_on) {
            (ProcessStatus::Waiting, Some(r)) => state.resource(r).owner,
            _ => None,
        };
    }
}

/// The effective priority `pid` is entitled to from what it still owns.
fn inherited_priority(state: &SimState, pid: Pid) -> Priority {
    let base = state.process(pid).priority_base;
    state
        .resources()
        .owned_by(pid)
        .flat_map(|id| state.resource(id).waitqueue.iter())
        .map(|&w| state.process(w).priority_effective)
        .fold(base, Priority::max)
}
