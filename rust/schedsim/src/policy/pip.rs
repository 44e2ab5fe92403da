//! Priority scheduling with the priority inheritance protocol.
//!
//! Same decisions as [`super::Prio`], but on effective priority, which
//! arbitration raises while a process holds a resource a more urgent
//! process is waiting for.

use crate::arbitration::{Acquire, Arbiter};
use crate::policy::prio::schedule_by;
use crate::policy::Policy;
use crate::state::SimState;
use crate::types::{Pid, ResourceId};

#[derive(Debug, Default, Clone, Copy)]
pub struct Pip;

impl Policy for Pip {
    fn name(&self) -> &'static str {
        "Priority + Priority Inheritance Protocol"
    }

    fn schedule(&mut self, state: &mut SimState) -> Option<Pid> {
        schedule_by(state, |p| p.priority_effective)
    }

    fn acquire(&mut self, state: &mut SimState, resource: ResourceId, requester: Pid) -> Acquire {
        Arbiter::INHERIT.acquire(state, resource, requester)
    }

    fn release(&mut self, state: &mut SimState, resource: ResourceId, releaser: Pid) -> Option<Pid> {
        Arbiter::INHERIT.release(state, resource, releaser)
    }
}
