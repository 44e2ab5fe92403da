//! Trace event recording for the simulator.
//!
//! Every scheduling and arbitration action (arrival, dispatch, preemption,
//! blocking, hand-over, priority change, completion) is recorded as a
//! `TraceEvent` stamped with the tick it happened in. The per-tick
//! timeline records which process consumed each tick.

use serde::Serialize;

use crate::types::{Pid, Priority, ResourceId, Tick};

/// A single trace event produced by the simulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    pub tick: Tick,
    pub kind: TraceKind,
}

/// The type of event recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceKind {
    /// A process entered the Ready Queue for the first time.
    Arrived { pid: Pid },
    /// A process was switched in.
    Scheduled { pid: Pid },
    /// The running process was put back on the Ready Queue.
    Preempted { pid: Pid },
    /// The running process was denied a resource and is now waiting.
    Blocked { pid: Pid, resource: ResourceId },
    /// A process was granted a resource.
    Acquired { pid: Pid, resource: ResourceId },
    /// A process gave a resource back.
    Released { pid: Pid, resource: ResourceId },
    /// A waiter was moved from a waitqueue to the Ready Queue.
    Woke { pid: Pid, resource: ResourceId },
    /// Effective priority raised by inheritance.
    Boosted { pid: Pid, from: Priority, to: Priority },
    /// Effective priority lowered after a release.
    Reverted { pid: Pid, from: Priority, to: Priority },
    /// A process ran its final tick.
    Completed { pid: Pid },
    /// No process ran this tick.
    Idle,
}

impl TraceKind {
    /// The process this event concerns, if any.
    pub fn pid(&self) -> Option<Pid> {
        match *self {
            TraceKind::Arrived { pid }
            | TraceKind::Scheduled { pid }
            | TraceKind::Preempted { pid }
            | TraceKind::Blocked { pid, .. }
            | TraceKind::Acquired { pid, .. }
            | TraceKind::Released { pid, .. }
            | TraceKind::Woke { pid, .. }
            | TraceKind::Boosted { pid, .. }
            | TraceKind::Reverted { pid, .. }
            | TraceKind::Completed { pid } => Some(pid),
            TraceKind::Idle => None,
        }
    }
}

/// Per-process outcome derived from a trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessSummary {
    pub pid: Pid,
    pub name: String,
    pub arrival: Tick,
    /// Tick in which the process ran its last tick.
    pub completion: Option<Tick>,
    /// `completion + 1 - arrival`.
    pub turnaround: Option<Tick>,
    /// Ticks spent runnable or blocked rather than running.
    pub waiting: Option<Tick>,
    pub ran: Tick,
}

/// A complete simulation trace.
#[derive(Debug, Clone)]
pub struct Trace {
    policy: &'static str,
    names: Vec<String>,
    events: Vec<TraceEvent>,
    timeline: Vec<Option<Pid>>,
}

impl Trace {
    pub(crate) fn new(policy: &'static str, names: Vec<String>) -> Self {
        Self {
            policy,
            names,
            events: Vec::new(),
            timeline: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, tick: Tick, kind: TraceKind) {
        self.events.push(TraceEvent { tick, kind });
    }

    pub(crate) fn record_tick(&mut self, ran: Option<Pid>) {
        self.timeline.push(ran);
    }

    /// Name of the policy that produced this trace.
    pub fn policy(&self) -> &'static str {
        self.policy
    }

    /// Get all events in chronological order.
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Which process ran in each tick, `None` for idle ticks.
    pub fn timeline(&self) -> &[Option<Pid>] {
        &self.timeline
    }

    /// Number of simulated ticks.
    pub fn ticks(&self) -> Tick {
        self.timeline.len() as Tick
    }

    /// The processes that ran, one entry per non-idle tick.
    pub fn schedule_order(&self) -> Vec<Pid> {
        self.timeline.iter().flatten().copied().collect()
    }

    /// Number of ticks `pid` ran.
    pub fn run_ticks(&self, pid: Pid) -> Tick {
        self.timeline.iter().filter(|&&t| t == Some(pid)).count() as Tick
    }

    /// Tick in which `pid` completed.
    pub fn completion_tick(&self, pid: Pid) -> Option<Tick> {
        self.events
            .iter()
            .find(|e| e.kind == TraceKind::Completed { pid })
            .map(|e| e.tick)
    }

    /// Count the events concerning `pid` that match `pred`.
    pub fn count(&self, pid: Pid, pred: impl Fn(&TraceKind) -> bool) -> usize {
        self.events
            .iter()
            .filter(|e| e.kind.pid() == Some(pid) && pred(&e.kind))
            .count()
    }

    /// Number of idle ticks.
    pub fn idle_count(&self) -> usize {
        self.timeline.iter().filter(|t| t.is_none()).count()
    }

    /// Turnaround and waiting time for every process.
    pub fn summaries(&self) -> Vec<ProcessSummary> {
        let mut arrivals = vec![0; self.names.len()];
        for e in &self.events {
            if let TraceKind::Arrived { pid } = e.kind {
                arrivals[pid.index()] = e.tick;
            }
        }

        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let pid = Pid(i as u32);
                let arrival = arrivals[i];
                let ran = self.run_ticks(pid);
                let completion = self.completion_tick(pid);
                let turnaround = completion.map(|c| c + 1 - arrival);
                ProcessSummary {
                    pid,
                    name: name.clone(),
                    arrival,
                    completion,
                    turnaround,
                    waiting: turnaround.map(|t| t - ran),
                    ran,
                }
            })
            .collect()
    }

    /// Pretty-print the trace for debugging.
    pub fn dump(&self) {
        eprintln!("policy: {}", self.policy);
        for event in &self.events {
            let desc = match &event.kind {
                TraceKind::Arrived { pid } => format!("ARRIVE   pid={pid}"),
                TraceKind::Scheduled { pid } => format!("SCHED    pid={pid}"),
                TraceKind::Preempted { pid } => format!("PREEMPT  pid={pid}"),
                TraceKind::Blocked { pid, resource } => format!("BLOCK    pid={pid} {resource}"),
                TraceKind::Acquired { pid, resource } => format!("ACQUIRE  pid={pid} {resource}"),
                TraceKind::Released { pid, resource } => format!("RELEASE  pid={pid} {resource}"),
                TraceKind::Woke { pid, resource } => format!("WAKE     pid={pid} {resource}"),
                TraceKind::Boosted { pid, from, to } => format!("BOOST    pid={pid} {from}->{to}"),
                TraceKind::Reverted { pid, from, to } => format!("REVERT   pid={pid} {from}->{to}"),
                TraceKind::Completed { pid } => format!("COMPLETE pid={pid}"),
                TraceKind::Idle => "IDLE".to_string(),
            };
            eprintln!("[{:>6}] {}", event.tick, desc);
        }
    }
}
