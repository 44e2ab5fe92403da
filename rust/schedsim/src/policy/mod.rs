//! Scheduling policies and the registry that names them.
//!
//! Every policy pairs a `schedule()` decision with an acquire/release
//! protocol from [`crate::arbitration`]. The driver only ever talks to a
//! `Box<dyn Policy>` built from a [`PolicyKind`], so adding a policy never
//! touches the driver or the arbitration code.

mod fifo;
mod pip;
mod prio;
mod rr;
mod sjf;
mod srtf;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::arbitration::Acquire;
use crate::state::SimState;
use crate::types::{Pid, ResourceId};

pub use fifo::Fifo;
pub use pip::Pip;
pub use prio::Prio;
pub use rr::RoundRobin;
pub use sjf::Sjf;
pub use srtf::Srtf;

/// Capability set of a scheduling policy.
///
/// `initialize` and `finalize` bracket a run and default to no-ops; they
/// must be safe to call more than once.
pub trait Policy {
    /// Human-readable policy name.
    fn name(&self) -> &'static str;

    /// Set up private bookkeeping before the first tick.
    fn initialize(&mut self) {}

    /// Tear down private bookkeeping after the last tick.
    fn finalize(&mut self) {}

    /// Pick the process to run this tick, or `None` if nothing is runnable.
    ///
    /// A returned process has been detached from the Ready Queue, or is the
    /// current process continuing. A preempted current process has been put
    /// back at the Ready Queue tail as READY.
    fn schedule(&mut self, state: &mut SimState) -> Option<Pid>;

    /// Request `resource` for the running process `requester`.
    fn acquire(&mut self, state: &mut SimState, resource: ResourceId, requester: Pid) -> Acquire;

    /// Release `resource` held by `releaser`; returns the woken waiter.
    fn release(&mut self, state: &mut SimState, resource: ResourceId, releaser: Pid) -> Option<Pid>;
}

/// The built-in policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// First-come first-served.
    #[value(alias = "fcfs")]
    #[serde(alias = "fcfs")]
    Fifo,
    /// Shortest job first (non-preemptive).
    Sjf,
    /// Shortest remaining time first (preemptive).
    Srtf,
    /// Round-robin with a one-tick slice.
    Rr,
    /// Static priority, preemptive.
    Prio,
    /// Priority with the priority inheritance protocol.
    Pip,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 6] = [
        PolicyKind::Fifo,
        PolicyKind::Sjf,
        PolicyKind::Srtf,
        PolicyKind::Rr,
        PolicyKind::Prio,
        PolicyKind::Pip,
    ];

    /// Short name used on the command line and in workloads.
    pub fn as_str(self) -> &'static str {
        match self {
            PolicyKind::Fifo => "fifo",
            PolicyKind::Sjf => "sjf",
            PolicyKind::Srtf => "srtf",
            PolicyKind::Rr => "rr",
            PolicyKind::Prio => "prio",
            PolicyKind::Pip => "pip",
        }
    }

    /// Instantiate the policy.
    pub fn build(self) -> Box<dyn Policy> {
        match self {
            PolicyKind::Fifo => Box::new(Fifo),
            PolicyKind::Sjf => Box::new(Sjf),
            PolicyKind::Srtf => Box::new(Srtf),
            PolicyKind::Rr => Box::new(RoundRobin),
            PolicyKind::Prio => Box::new(Prio),
            PolicyKind::Pip => Box::new(Pip),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognised policy name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPolicy(pub String);

impl fmt::Display for UnknownPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = PolicyKind::ALL.iter().map(|k| k.as_str()).collect();
        write!(f, "unknown policy {:?} (expected one of: {})", self.0, names.join(", "))
    }
}

impl std::error::Error for UnknownPolicy {}

impl FromStr for PolicyKind {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        if name == "fcfs" {
            return Ok(PolicyKind::Fifo);
        }
        PolicyKind::ALL
            .into_iter()
            .find(|k| k.as_str() == name)
            .ok_or_else(|| UnknownPolicy(s.to_string()))
    }
}
