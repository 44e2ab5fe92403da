//! Shortest remaining time first.
//!
//! Re-evaluated every tick: a ready process with strictly less remaining
//! time preempts the current one, which goes back to the Ready Queue tail.

use tracing::debug;

use crate::arbitration::{Acquire, Arbiter};
use crate::policy::Policy;
use crate::state::SimState;
use crate::types::{Pid, ResourceId};

#[derive(Debug, Default, Clone, Copy)]
pub struct Srtf;

impl Policy for Srtf {
    fn name(&self) -> &'static str {
        "Shortest Remaining Time First"
    }

    fn schedule(&mut self, state: &mut SimState) -> Option<Pid> {
        if let Some(cur) = state.continuable_current() {
            let remaining = state.process(cur).remaining();
            match state.ready_min_key(|p| p.remaining()) {
                Some(shortest) if shortest < remaining => {
                    debug!(pid = cur.0, remaining, shortest, "srtf preempt");
                    // Select before requeueing so `cur` cannot win a tie.
                    let next = state.take_ready_min_by_key(|p| p.remaining());
                    state.requeue(cur);
                    return next;
                }
                _ => return Some(cur),
            }
        }
        state.take_ready_min_by_key(|p| p.remaining())
    }

    fn acquire(&mut self, state: &mut SimState, resource: ResourceId, requester: Pid) -> Acquire {
        Arbiter::FIFO.acquire(state, resource, requester)
    }

    fn release(&mut self, state: &mut SimState, resource: ResourceId, releaser: Pid) -> Option<Pid> {
        Arbiter::FIFO.release(state, resource, releaser)
    }
}
