//! Scenario definition and builder API.

use std::collections::HashMap;

use crate::process::{ProcessDef, ResourceRequest};
use crate::types::{Pid, Priority, ResourceId, Tick};
use crate::workload::WorkloadError;

/// Tick budget when none is given. Guards against workloads that never
/// finish under a policy (for example a starved process).
pub const DEFAULT_MAX_TICKS: Tick = 100_000;

/// A complete simulation scenario: processes and a tick budget.
///
/// Only the builder creates one, so every `Scenario` has passed
/// validation and lists its processes in arrival order with pids `0..n`.
#[derive(Debug, Clone)]
pub struct Scenario {
    processes: Vec<ProcessDef>,
    max_ticks: Tick,
}

/// Builder for constructing scenarios.
pub struct ScenarioBuilder {
    processes: Vec<ProcessDef>,
    max_ticks: Tick,
}

impl Scenario {
    pub fn builder() -> ScenarioBuilder {
        ScenarioBuilder {
            processes: Vec::new(),
            max_ticks: DEFAULT_MAX_TICKS,
        }
    }

    /// Process definitions in arrival order, indexed by pid.
    pub fn processes(&self) -> &[ProcessDef] {
        &self.processes
    }

    pub fn max_ticks(&self) -> Tick {
        self.max_ticks
    }

    /// Replace the tick budget.
    pub fn set_max_ticks(&mut self, ticks: Tick) {
        self.max_ticks = ticks;
    }

    /// Check the workload-level rules a run relies on.
    ///
    /// # Panics
    /// Panics if pids are not `0..n` in arrival order, which the builder
    /// guarantees.
    fn validate(&self) -> Result<(), WorkloadError> {
        if self.processes.is_empty() {
            return Err(WorkloadError::NoProcesses);
        }
        assert!(
            self.processes.windows(2).all(|w| w[0].arrival <= w[1].arrival),
            "processes not in arrival order"
        );
        for (i, def) in self.processes.iter().enumerate() {
            assert_eq!(def.pid.index(), i, "process {:?} has a non-dense pid", def.name);
            if def.lifespan == 0 {
                return Err(WorkloadError::ZeroLifespan {
                    name: def.name.clone(),
                });
            }

            let mut by_resource: HashMap<ResourceId, Vec<&ResourceRequest>> = HashMap::new();
            for req in &def.requests {
                if req.duration == 0 {
                    return Err(WorkloadError::ZeroDuration {
                        name: def.name.clone(),
                        resource: req.resource,
                    });
                }
                match req.at.checked_add(req.duration) {
                    Some(end) if end <= def.lifespan => {}
                    end => {
                        return Err(WorkloadError::RequestPastLifespan {
                            name: def.name.clone(),
                            resource: req.resource,
                            release_at: end.unwrap_or(Tick::MAX),
                            lifespan: def.lifespan,
                        });
                    }
                }
                by_resource.entry(req.resource).or_default().push(req);
            }

            for (resource, mut reqs) in by_resource {
                reqs.sort_by_key(|r| r.at);
                if reqs.windows(2).any(|w| w[0].release_at() > w[1].at) {
                    return Err(WorkloadError::OverlappingRequests {
                        name: def.name.clone(),
                        resource,
                    });
                }
            }
        }
        Ok(())
    }
}

impl ScenarioBuilder {
    /// Add a process with auto-assigned PID.
    pub fn process(mut self, name: &str, arrival: Tick, lifespan: Tick, priority: Priority) -> Self {
        let pid = Pid(self.processes.len() as u32);
        self.processes.push(ProcessDef {
            name: name.to_string(),
            pid,
            arrival,
            lifespan,
            priority,
            requests: Vec::new(),
        });
        self
    }

    /// Attach a resource request to the most recently added process.
    ///
    /// # Panics
    /// Panics if no process was added yet or `resource` is out of range.
    pub fn request(mut self, resource: usize, at: Tick, duration: Tick) -> Self {
        let resource = ResourceId::new(resource)
            .unwrap_or_else(|| panic!("resource {resource} out of range"));
        let def = self
            .processes
            .last_mut()
            .expect("request() called before any process()");
        def.requests.push(ResourceRequest {
            resource,
            at,
            duration,
        });
        self
    }

    /// Set the tick budget.
    pub fn max_ticks(mut self, ticks: Tick) -> Self {
        self.max_ticks = ticks;
        self
    }

    /// Build and validate the scenario.
    ///
    /// Processes are ordered by arrival tick (definition order within a
    /// tick) and their pids renumbered to match.
    pub fn try_build(mut self) -> Result<Scenario, WorkloadError> {
        self.processes.sort_by_key(|d| d.arrival);
        for (i, def) in self.processes.iter_mut().enumerate() {
            def.pid = Pid(i as u32);
        }
        let scenario = Scenario {
            processes: self.processes,
            max_ticks: self.max_ticks,
        };
        scenario.validate()?;
        Ok(scenario)
    }

    /// Build the scenario.
    ///
    /// # Panics
    /// Panics if the scenario is invalid; use [`Self::try_build`] for input
    /// that is not known to be well formed.
    pub fn build(self) -> Scenario {
        match self.try_build() {
            Ok(scenario) => scenario,
            Err(e) => panic!("invalid scenario: {e}"),
        }
    }
}
