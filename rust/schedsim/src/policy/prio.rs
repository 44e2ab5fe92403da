//! Static priority scheduling, preemptive.
//!
//! Only a strictly higher ready priority preempts; on equal priority the
//! current process keeps running. Selection among ready processes breaks
//! ties by Ready Queue order.

use tracing::debug;

use crate::arbitration::{Acquire, Arbiter};
use crate::policy::Policy;
use crate::process::Process;
use crate::state::SimState;
use crate::types::{Pid, Priority, ResourceId};

#[derive(Debug, Default, Clone, Copy)]
pub struct Prio;

/// Priority selection parameterised by which priority field to compare.
pub(super) fn schedule_by(state: &mut SimState, prio: fn(&Process) -> Priority) -> Option<Pid> {
    if let Some(cur) = state.continuable_current() {
        let mine = prio(state.process(cur));
        match state.ready_max_key(prio) {
            Some(highest) if highest > mine => {
                debug!(pid = cur.0, prio = mine, highest, "priority preempt");
                let next = state.take_ready_max_by_key(prio);
                state.requeue(cur);
                return next;
            }
            _ => return Some(cur),
        }
    }
    state.take_ready_max_by_key(prio)
}

impl Policy for Prio {
    fn name(&self) -> &'static str {
        "Priority"
    }

    fn schedule(&mut self, state: &mut SimState) -> Option<Pid> {
        schedule_by(state, |p| p.priority_base)
    }

    fn acquire(&mut self, state: &mut SimState, resource: ResourceId, requester: Pid) -> Acquire {
        Arbiter::PRIORITY.acquire(state, resource, requester)
    }

    fn release(&mut self, state: &mut SimState, resource: ResourceId, releaser: Pid) -> Option<Pid> {
        Arbiter::PRIORITY.release(state, resource, releaser)
    }
}
