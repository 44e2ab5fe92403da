//! Process model for the simulator.
//!
//! Each simulated process carries its scheduling state (status, age,
//! priorities) plus the resource requests scripted by the workload.
//! Queue membership is not stored here; the Ready Queue and the resource
//! waitqueues hold `Pid` handles into the process arena.

use crate::types::{Pid, Priority, ResourceId, Tick};

/// The state a simulated process can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessStatus {
    /// Runnable and sitting in the Ready Queue.
    Ready,
    /// Executing this tick. At most one process is in this state.
    Running,
    /// Blocked in a resource's waitqueue.
    Waiting,
    /// Ran for its whole lifespan. Terminal.
    Terminated,
}

/// One scripted resource request: acquire `resource` when the process has
/// executed `at` ticks and hold it for `duration` ticks of execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceRequest {
    pub resource: ResourceId,
    pub at: Tick,
    pub duration: Tick,
}

impl ResourceRequest {
    /// Age at which the resource is given back. Only meaningful for
    /// requests of a validated scenario, where the sum cannot overflow.
    pub fn release_at(&self) -> Tick {
        self.at + self.duration
    }
}

/// Progress of a single [`ResourceRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestState {
    Pending,
    Held,
    Done,
}

/// Definition of a process for scenario creation.
#[derive(Debug, Clone)]
pub struct ProcessDef {
    pub name: String,
    pub pid: Pid,
    /// Tick at which the process enters the Ready Queue.
    pub arrival: Tick,
    pub lifespan: Tick,
    pub priority: Priority,
    pub requests: Vec<ResourceRequest>,
}

/// A simulated process at runtime.
#[derive(Debug, Clone)]
pub struct Process {
    pub pid: Pid,
    pub name: String,
    pub status: ProcessStatus,
    pub arrival: Tick,
    /// Ticks executed so far.
    pub age: Tick,
    pub lifespan: Tick,
    pub priority_base: Priority,
    /// Working priority; raised above `priority_base` only by inheritance.
    pub priority_effective: Priority,
    /// The resource this process is queued on while `Waiting`.
    pub blocked_on: Option<ResourceId>,
    requests: Vec<ResourceRequest>,
    request_state: Vec<RequestState>,
}

impl Process {
    /// Create a READY process from its definition.
    pub fn new(def: &ProcessDef) -> Self {
        Process {
            pid: def.pid,
            name: def.name.clone(),
            status: ProcessStatus::Ready,
            arrival: def.arrival,
            age: 0,
            lifespan: def.lifespan,
            priority_base: def.priority,
            priority_effective: def.priority,
            blocked_on: None,
            requests: def.requests.clone(),
            request_state: vec![RequestState::Pending; def.requests.len()],
        }
    }

    /// Ticks still needed to complete.
    pub fn remaining(&self) -> Tick {
        self.lifespan - self.age
    }

    /// Whether the process has run its final tick.
    pub fn is_finished(&self) -> bool {
        self.age >= self.lifespan
    }

    /// Whether a policy may keep running this process as `current`.
    pub fn can_continue(&self) -> bool {
        self.status == ProcessStatus::Running && !self.is_finished()
    }

    /// The first pending request that falls due at the current age.
    pub fn next_due_acquire(&self) -> Option<(usize, ResourceRequest)> {
        self.requests
            .iter()
            .enumerate()
            .find(|(i, r)| self.request_state[*i] == RequestState::Pending && r.at == self.age)
            .map(|(i, r)| (i, *r))
    }

    /// Held requests whose hold time ends at the current age.
    pub fn due_releases(&self) -> Vec<(usize, ResourceRequest)> {
        self.requests
            .iter()
            .enumerate()
            .filter(|(i, r)| {
                self.request_state[*i] == RequestState::Held && r.release_at() == self.age
            })
            .map(|(i, r)| (i, *r))
            .collect()
    }

    pub fn mark_held(&mut self, idx: usize) {
        assert_eq!(self.request_state[idx], RequestState::Pending);
        self.request_state[idx] = RequestState::Held;
    }

    pub fn mark_done(&mut self, idx: usize) {
        assert_eq!(self.request_state[idx], RequestState::Held);
        self.request_state[idx] = RequestState::Done;
    }
}
