//! Simulation state shared by the driver, the policies and arbitration.
//!
//! `SimState` is the explicit context threaded through every
//! `schedule`/`acquire`/`release` call, so independent simulations can
//! coexist. Processes live in an arena indexed by [`Pid`]; the Ready Queue
//! and the resource waitqueues only hold handles.

use std::collections::HashSet;
use std::fmt;

use crate::process::{Process, ProcessDef, ProcessStatus};
use crate::queue::ReadyQueue;
use crate::resource::{Resource, ResourceTable};
use crate::types::{Pid, ResourceId, Tick};

#[derive(Debug, Clone, Default)]
pub struct SimState {
    processes: Vec<Process>,
    current: Option<Pid>,
    ready: ReadyQueue,
    resources: ResourceTable,
    tick: Tick,
}

impl SimState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a READY process and append it to the Ready Queue.
    ///
    /// # Panics
    /// Panics if `def.pid` is not the next free arena slot.
    pub fn spawn(&mut self, def: &ProcessDef) -> Pid {
        assert_eq!(
            def.pid.index(),
            self.processes.len(),
            "pid {} spawned out of order",
            def.pid
        );
        self.processes.push(Process::new(def));
        self.ready.push_back(def.pid);
        def.pid
    }

    pub fn process(&self, pid: Pid) -> &Process {
        self.processes
            .get(pid.index())
            .unwrap_or_else(|| panic!("unknown pid {pid}"))
    }

    pub fn process_mut(&mut self, pid: Pid) -> &mut Process {
        self.processes
            .get_mut(pid.index())
            .unwrap_or_else(|| panic!("unknown pid {pid}"))
    }

    /// All processes created so far, in pid order.
    pub fn processes(&self) -> impl Iterator<Item = &Process> {
        self.processes.iter()
    }

    /// The process selected by the last `schedule()` call, in any status.
    pub fn current(&self) -> Option<Pid> {
        self.current
    }

    /// `current`, but only if it is RUNNING with lifetime left.
    pub fn continuable_current(&self) -> Option<Pid> {
        self.current.filter(|&pid| self.process(pid).can_continue())
    }

    pub fn ready(&self) -> &ReadyQueue {
        &self.ready
    }

    pub fn resources(&self) -> &ResourceTable {
        &self.resources
    }

    pub fn resource(&self, id: ResourceId) -> &Resource {
        self.resources.get(id)
    }

    pub(crate) fn resource_mut(&mut self, id: ResourceId) -> &mut Resource {
        self.resources.get_mut(id)
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub(crate) fn set_tick(&mut self, tick: Tick) {
        self.tick = tick;
    }

    /// Whether any created process has not terminated yet.
    pub fn has_live_processes(&self) -> bool {
        self.processes
            .iter()
            .any(|p| p.status != ProcessStatus::Terminated)
    }

    /// Make `pid` the running process, or clear `current` with `None`.
    ///
    /// # Panics
    /// Panics if the process is still queued or is WAITING/TERMINATED.
    pub fn dispatch(&mut self, next: Option<Pid>) {
        if let Some(pid) = next {
            assert!(
                !self.ready.contains(pid),
                "pid {pid} dispatched while still on the ready queue"
            );
            let p = self.process_mut(pid);
            assert!(
                matches!(p.status, ProcessStatus::Ready | ProcessStatus::Running),
                "pid {pid} dispatched in status {:?}",
                p.status
            );
            p.status = ProcessStatus::Running;
        }
        self.current = next;
    }

    /// Put a process back at the Ready Queue tail as READY.
    pub fn requeue(&mut self, pid: Pid) {
        let p = self.process_mut(pid);
        assert!(
            p.status != ProcessStatus::Terminated,
            "pid {pid} requeued after termination"
        );
        p.status = ProcessStatus::Ready;
        p.blocked_on = None;
        self.ready.push_back(pid);
    }

    /// Detach the Ready Queue head.
    pub fn take_ready_head(&mut self) -> Option<Pid> {
        self.ready.pop_front()
    }

    /// Detach a specific process from the Ready Queue.
    pub fn ready_remove(&mut self, pid: Pid) -> bool {
        self.ready.remove_pid(pid)
    }

    /// Detach the earliest ready process with the smallest key.
    pub fn take_ready_min_by_key<K: Ord>(&mut self, key: impl Fn(&Process) -> K) -> Option<Pid> {
        let procs = &self.processes;
        let pos = self
            .ready
            .position_min_by_key(|pid| key(&procs[pid.index()]))?;
        self.ready.remove_at(pos)
    }

    /// Detach the earliest ready process with the largest key.
    pub fn take_ready_max_by_key<K: Ord>(&mut self, key: impl Fn(&Process) -> K) -> Option<Pid> {
        let procs = &self.processes;
        let pos = self
            .ready
            .position_max_by_key(|pid| key(&procs[pid.index()]))?;
        self.ready.remove_at(pos)
    }

    /// Smallest key over the Ready Queue, if any.
    pub fn ready_min_key<K: Ord>(&self, key: impl Fn(&Process) -> K) -> Option<K> {
        self.ready.iter().map(|pid| key(self.process(pid))).min()
    }

    /// Largest key over the Ready Queue, if any.
    pub fn ready_max_key<K: Ord>(&self, key: impl Fn(&Process) -> K) -> Option<K> {
        self.ready.iter().map(|pid| key(self.process(pid))).max()
    }

    /// Retire a process that has run its whole lifespan.
    ///
    /// # Panics
    /// Panics if the process has lifetime left or still owns a resource.
    pub fn terminate(&mut self, pid: Pid) {
        let p = self.process(pid);
        assert!(
            p.is_finished(),
            "pid {pid} terminated at age {}/{}",
            p.age,
            p.lifespan
        );
        if let Some(id) = self.resources.owned_by(pid).next() {
            panic!("pid {pid} terminated while owning {id}");
        }
        self.process_mut(pid).status = ProcessStatus::Terminated;
    }

    /// Verify the cross-structure invariants.
    ///
    /// # Panics
    /// Panics on the first violation. A violation means the driver or a
    /// policy broke its contract; the simulation cannot continue.
    pub fn check_invariants(&self) {
        let mut queued: HashSet<Pid> = HashSet::new();

        for pid in self.ready.iter() {
            assert!(queued.insert(pid), "pid {pid} queued twice");
            let st = self.process(pid).status;
            assert_eq!(st, ProcessStatus::Ready, "pid {pid} on ready queue as {st:?}");
        }

        for (id, r) in self.resources.iter() {
            for &pid in &r.waitqueue {
                assert!(queued.insert(pid), "pid {pid} queued twice (waiting on {id})");
                let p = self.process(pid);
                assert_eq!(p.status, ProcessStatus::Waiting, "pid {pid} waits on {id} as {:?}", p.status);
                assert_eq!(p.blocked_on, Some(id), "pid {pid} waits on {id} but records {:?}", p.blocked_on);
                assert_ne!(r.owner, Some(pid), "pid {pid} waits on {id} which it owns");
            }
            if let Some(owner) = r.owner {
                let st = self.process(owner).status;
                assert_ne!(st, ProcessStatus::Terminated, "{id} owned by terminated pid {owner}");
            }
        }

        let mut running = 0;
        for p in &self.processes {
            assert!(p.age <= p.lifespan, "pid {} aged past its lifespan", p.pid);
            assert!(
                p.priority_effective >= p.priority_base,
                "pid {} effective priority {} below base {}",
                p.pid,
                p.priority_effective,
                p.priority_base
            );
            match p.status {
                ProcessStatus::Running => {
                    running += 1;
                    assert_eq!(self.current, Some(p.pid), "pid {} running but not current", p.pid);
                    assert!(!queued.contains(&p.pid), "running pid {} is queued", p.pid);
                }
                ProcessStatus::Ready => {
                    assert!(self.ready.contains(p.pid), "ready pid {} not on ready queue", p.pid)
                }
                ProcessStatus::Waiting => {
                    assert!(queued.contains(&p.pid), "waiting pid {} not on a waitqueue", p.pid)
                }
                ProcessStatus::Terminated => {
                    assert!(!queued.contains(&p.pid), "terminated pid {} is queued", p.pid)
                }
            }
        }
        assert!(running <= 1, "{running} processes running at once");
    }

    /// Human-readable snapshot of current, Ready Queue and resources.
    pub fn status_dump(&self) -> StatusDump<'_> {
        StatusDump(self)
    }
}

/// Display adapter returned by [`SimState::status_dump`].
pub struct StatusDump<'a>(&'a SimState);

impl fmt::Display for StatusDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let st = self.0;
        let line = |f: &mut fmt::Formatter<'_>, p: &Process| {
            writeln!(
                f,
                "  {:>3} {:<12} {:?} age {}/{} prio {}/{}",
                p.pid.0, p.name, p.status, p.age, p.lifespan, p.priority_effective, p.priority_base
            )
        };

        writeln!(f, "tick {}", st.tick)?;
        writeln!(f, "current:")?;
        match st.current {
            Some(pid) => line(f, st.process(pid))?,
            None => writeln!(f, "  (none)")?,
        }
        writeln!(f, "ready queue:")?;
        for pid in st.ready.iter() {
            line(f, st.process(pid))?;
        }
        writeln!(f, "resources:")?;
        for (id, r) in st.resources.iter() {
            if r.is_free() && r.waitqueue.is_empty() {
                continue;
            }
            let owner = r.owner.map_or_else(|| "-".to_string(), |p| p.to_string());
            let waiters: Vec<String> = r.waitqueue.iter().map(Pid::to_string).collect();
            writeln!(f, "  {:<4} owner {:<3} waiters [{}]", id.to_string(), owner, waiters.join(", "))?;
        }
        Ok(())
    }
}
