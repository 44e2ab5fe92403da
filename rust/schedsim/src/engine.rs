//! Tick-driven simulation engine.
//!
//! The engine owns the policy and drives it one tick at a time: admit
//! arrivals, ask the policy for a process, serve the resource requests
//! falling due, run the process for one tick, hand back resources whose
//! hold time ended, and retire the process once it has run its lifespan.
//! A process denied a resource does not consume the tick; the policy is
//! asked again within the same tick.

use std::fmt;

use tracing::{debug, info, trace};

use crate::arbitration::Acquire;
use crate::fmt::set_sim_tick;
use crate::policy::{Policy, PolicyKind};
use crate::process::{ProcessDef, ProcessStatus};
use crate::scenario::Scenario;
use crate::state::SimState;
use crate::trace::{Trace, TraceKind};
use crate::types::{Pid, Priority, Tick};

/// Ways a run can end without every process completing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// Nothing can run ever again: every live process is waiting on a
    /// resource and no arrivals remain.
    Deadlock { tick: Tick, waiting: Vec<Pid> },
    /// The scenario's tick budget ran out.
    TickLimit { limit: Tick, live: Vec<Pid> },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let list = |pids: &[Pid]| {
            pids.iter()
                .map(Pid::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        match self {
            SimError::Deadlock { tick, waiting } => {
                write!(f, "deadlock at tick {tick}: pids [{}] all waiting", list(waiting))
            }
            SimError::TickLimit { limit, live } => write!(
                f,
                "tick limit {limit} reached with pids [{}] unfinished",
                list(live)
            ),
        }
    }
}

impl std::error::Error for SimError {}

/// The main simulator.
pub struct Simulator {
    policy: Box<dyn Policy>,
}

impl Simulator {
    pub fn new(policy: Box<dyn Policy>) -> Self {
        Simulator { policy }
    }

    /// Simulator for one of the built-in policies.
    pub fn with_kind(kind: PolicyKind) -> Self {
        Self::new(kind.build())
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Run a scenario to completion and return the trace.
    pub fn run(&mut self, scenario: &Scenario) -> Result<Trace, SimError> {
        self.policy.initialize();
        let result = self.simulate(scenario);
        self.policy.finalize();
        set_sim_tick(None);
        result
    }

    fn simulate(&mut self, scenario: &Scenario) -> Result<Trace, SimError> {
        let names = scenario.processes().iter().map(|d| d.name.clone()).collect();
        let mut trace = Trace::new(self.policy.name(), names);
        let mut state = SimState::new();

        // Scenario pids follow arrival order, so spawning in that order
        // keeps the arena dense.
        let mut pending = Pending::new(scenario.processes());

        info!(
            policy = self.policy.name(),
            processes = scenario.processes().len(),
            "simulation start"
        );

        loop {
            let tick = state.tick();
            set_sim_tick(Some(tick));

            for def in pending.take_due(tick) {
                let pid = state.spawn(def);
                debug!(pid = pid.0, name = def.name.as_str(), "arrived");
                trace.record(tick, TraceKind::Arrived { pid });
            }

            if pending.is_empty() && !state.has_live_processes() {
                break;
            }
            if tick >= scenario.max_ticks() {
                return Err(SimError::TickLimit {
                    limit: scenario.max_ticks(),
                    live: live_pids(&state, scenario.processes()),
                });
            }

            let ran = self.run_tick(&mut state, &mut trace);
            trace.record_tick(ran);
            if ran.is_none() {
                trace.record(tick, TraceKind::Idle);
                if pending.is_empty() && state.ready().is_empty() {
                    // Nothing ready, nothing running, nobody left to arrive.
                    let waiting = live_pids(&state, scenario.processes());
                    info!(tick, "deadlock");
                    return Err(SimError::Deadlock { tick, waiting });
                }
            }

            state.check_invariants();
            trace!("\n{}", state.status_dump());
            state.set_tick(tick + 1);
        }

        info!(ticks = trace.ticks(), "simulation complete");
        Ok(trace)
    }

    /// Simulate one tick. Returns the process that ran, if any.
    fn run_tick(&mut self, state: &mut SimState, trace: &mut Trace) -> Option<Pid> {
        let tick = state.tick();

        let pid = loop {
            let prev = state
                .current()
                .filter(|&p| state.process(p).status == ProcessStatus::Running);
            let next = self.policy.schedule(state);

            if let Some(p) = prev {
                if state.process(p).status == ProcessStatus::Ready {
                    trace.record(tick, TraceKind::Preempted { pid: p });
                }
            }
            state.dispatch(next);
            let pid = next?;
            if Some(pid) != prev {
                debug!(pid = pid.0, "scheduled");
                trace.record(tick, TraceKind::Scheduled { pid });
            }

            if self.acquire_due(state, trace, pid) {
                break pid;
            }
            // Blocked before running; pick someone else for this tick.
        };

        state.process_mut(pid).age += 1;
        self.release_due(state, trace, pid);

        if state.process(pid).is_finished() {
            state.terminate(pid);
            debug!(pid = pid.0, "completed");
            trace.record(tick, TraceKind::Completed { pid });
        }
        Some(pid)
    }

    /// Serve every request of `pid` that falls due at its current age.
    /// Returns false if one was denied and `pid` is now waiting.
    fn acquire_due(&mut self, state: &mut SimState, trace: &mut Trace, pid: Pid) -> bool {
        let tick = state.tick();
        while let Some((idx, req)) = state.process(pid).next_due_acquire() {
            let before = effective_priorities(state);
            let outcome = self.policy.acquire(state, req.resource, pid);
            match outcome {
                Acquire::Granted => {
                    state.process_mut(pid).mark_held(idx);
                    trace.record(
                        tick,
                        TraceKind::Acquired {
                            pid,
                            resource: req.resource,
                        },
                    );
                }
                Acquire::Denied => {
                    trace.record(
                        tick,
                        TraceKind::Blocked {
                            pid,
                            resource: req.resource,
                        },
                    );
                    record_priority_changes(&before, state, trace);
                    return false;
                }
            }
        }
        true
    }

    /// Release every resource whose hold time ended with this tick.
    fn release_due(&mut self, state: &mut SimState, trace: &mut Trace, pid: Pid) {
        let tick = state.tick();
        for (idx, req) in state.process(pid).due_releases() {
            let before = effective_priorities(state);
            let woken = self.policy.release(state, req.resource, pid);
            state.process_mut(pid).mark_done(idx);
            trace.record(
                tick,
                TraceKind::Released {
                    pid,
                    resource: req.resource,
                },
            );
            if let Some(w) = woken {
                trace.record(
                    tick,
                    TraceKind::Woke {
                        pid: w,
                        resource: req.resource,
                    },
                );
            }
            record_priority_changes(&before, state, trace);
        }
    }
}

/// Definitions not yet admitted, in arrival order.
struct Pending<'a> {
    defs: &'a [ProcessDef],
    next: usize,
}

impl<'a> Pending<'a> {
    fn new(defs: &'a [ProcessDef]) -> Self {
        Pending { defs, next: 0 }
    }

    fn is_empty(&self) -> bool {
        self.next == self.defs.len()
    }

    /// Definitions arriving at or before `tick`.
    fn take_due(&mut self, tick: Tick) -> &'a [ProcessDef] {
        let start = self.next;
        while self.next < self.defs.len() && self.defs[self.next].arrival <= tick {
            self.next += 1;
        }
        &self.defs[start..self.next]
    }
}

fn live_pids(state: &SimState, defs: &[ProcessDef]) -> Vec<Pid> {
    let spawned = state
        .processes()
        .filter(|p| p.status != ProcessStatus::Terminated)
        .map(|p| p.pid);
    let unborn = defs
        .iter()
        .skip(state.processes().count())
        .map(|d| d.pid);
    spawned.chain(unborn).collect()
}

fn effective_priorities(state: &SimState) -> Vec<Priority> {
    state.processes().map(|p| p.priority_effective).collect()
}

fn record_priority_changes(before: &[Priority], state: &SimState, trace: &mut Trace) {
    let tick = state.tick();
    for (p, &from) in state.processes().zip(before) {
        let to = p.priority_effective;
        if to > from {
            trace.record(tick, TraceKind::Boosted { pid: p.pid, from, to });
        } else if to < from {
            trace.record(tick, TraceKind::Reverted { pid: p.pid, from, to });
        }
    }
}
