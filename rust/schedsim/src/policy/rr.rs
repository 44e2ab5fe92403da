//! Round-robin with a one-tick time slice.

use crate::arbitration::{Acquire, Arbiter};
use crate::policy::Policy;
use crate::state::SimState;
use crate::types::{Pid, ResourceId};

#[derive(Debug, Default, Clone, Copy)]
pub struct RoundRobin;

impl Policy for RoundRobin {
    fn name(&self) -> &'static str {
        "Round-Robin"
    }

    fn schedule(&mut self, state: &mut SimState) -> Option<Pid> {
        if let Some(cur) = state.continuable_current() {
            if state.ready().is_empty() {
                return Some(cur);
            }
            state.requeue(cur);
        }
        state.take_ready_head()
    }

    fn acquire(&mut self, state: &mut SimState, resource: ResourceId, requester: Pid) -> Acquire {
        Arbiter::FIFO.acquire(state, resource, requester)
    }

    fn release(&mut self, state: &mut SimState, resource: ResourceId, releaser: Pid) -> Option<Pid> {
        Arbiter::FIFO.release(state, resource, releaser)
    }
}
