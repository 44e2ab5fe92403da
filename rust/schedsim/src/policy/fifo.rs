//! First-come first-served.
//!
//! The running process keeps the CPU until it completes or blocks; the
//! replacement is always the Ready Queue head.

use crate::arbitration::{Acquire, Arbiter};
use crate::policy::Policy;
use crate::state::SimState;
use crate::types::{Pid, ResourceId};

#[derive(Debug, Default, Clone, Copy)]
pub struct Fifo;

impl Policy for Fifo {
    fn name(&self) -> &'static str {
        "FIFO"
    }

    fn schedule(&mut self, state: &mut SimState) -> Option<Pid> {
        if let Some(cur) = state.continuable_current() {
            return Some(cur);
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
