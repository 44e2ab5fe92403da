//! Shortest job first, non-preemptive.

use crate::arbitration::{Acquire, Arbiter};
use crate::policy::Policy;
use crate::state::SimState;
use crate::types::{Pid, ResourceId};

#[derive(Debug, Default, Clone, Copy)]
pub struct Sjf;

impl Policy for Sjf {
    fn name(&self) -> &'static str {
        "Shortest-Job First"
    }

    fn schedule(&mut self, state: &mut SimState) -> Option<Pid> {
        if let Some(cur) = state.continuable_current() {
            return Some(cur);
        }
        // Total lifespan, not remaining time: a job's length is fixed at creation.
        state.take_ready_min_by_key(|p| p.lifespan)
    }

    fn acquire(&mut self, state: &mut SimState, resource: ResourceId, requester: Pid) -> Acquire {
        Arbiter::FIFO.acquire(state, resource, requester)
    }

    fn release(&mut self, state: &mut SimState, resource: ResourceId, releaser: Pid) -> Option<Pid> {
        Arbiter::FIFO.release(state, resource, releaser)
    }
}
