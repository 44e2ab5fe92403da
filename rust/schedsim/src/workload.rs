//! Loader for JSON workload descriptions.
//!
//! A workload lists the processes to simulate, their resource requests
//! and, optionally, the policy and tick budget to use:
//!
//! ```json
//! {
//!   "policy": "pip",
//!   "max_ticks": 1000,
//!   "processes": [
//!     { "name": "low", "arrival": 0, "lifespan": 8, "priority": 1,
//!       "resources": [ { "resource": 3, "at": 1, "duration": 4 } ] },
//!     { "name": "high", "arrival": 2, "lifespan": 4, "priority": 9,
//!       "resources": [ { "resource": 3, "at": 0, "duration": 2 } ] }
//!   ]
//! }
//! ```
//!
//! `at` and `duration` count ticks of the process's own execution, not
//! wall ticks: a request with `at: 1` is made right before the process
//! runs its second tick. Unknown fields are rejected.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::policy::PolicyKind;
use crate::scenario::{Scenario, DEFAULT_MAX_TICKS};
use crate::types::{Priority, ResourceId, Tick, NR_RESOURCES};

/// Errors from loading or validating a workload.
#[derive(Debug)]
pub enum WorkloadError {
    /// The file could not be read.
    Io { path: PathBuf, source: io::Error },
    /// JSON parse error.
    Json(serde_json::Error),
    /// The workload defines no process.
    NoProcesses,
    ZeroLifespan {
        name: String,
    },
    /// Resource index outside `[0, NR_RESOURCES)`.
    BadResource {
        name: String,
        resource: usize,
    },
    ZeroDuration {
        name: String,
        resource: ResourceId,
    },
    /// A resource would still be held when the process completes.
    RequestPastLifespan {
        name: String,
        resource: ResourceId,
        release_at: Tick,
        lifespan: Tick,
    },
    /// Two requests of one process hold the same resource at once.
    OverlappingRequests {
        name: String,
        resource: ResourceId,
    },
}

impl fmt::Display for WorkloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkloadError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            WorkloadError::Json(e) => write!(f, "JSON parse error: {e}"),
            WorkloadError::NoProcesses => write!(f, "workload has no processes"),
            WorkloadError::ZeroLifespan { name } => {
                write!(f, "process {name:?}: lifespan must be at least 1")
            }
            WorkloadError::BadResource { name, resource } => write!(
                f,
                "process {name:?}: resource {resource} out of range (0..{NR_RESOURCES})"
            ),
            WorkloadError::ZeroDuration { name, resource } => {
                write!(f, "process {name:?}: {resource} requested for zero ticks")
            }
            WorkloadError::RequestPastLifespan {
                name,
                resource,
                release_at,
                lifespan,
            } => write!(
                f,
                "process {name:?}: {resource} held until age {release_at}, past lifespan {lifespan}"
            ),
            WorkloadError::OverlappingRequests { name, resource } => {
                write!(f, "process {name:?}: overlapping requests for {resource}")
            }
        }
    }
}

impl std::error::Error for WorkloadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WorkloadError::Io { source, .. } => Some(source),
            WorkloadError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for WorkloadError {
    fn from(e: serde_json::Error) -> Self {
        WorkloadError::Json(e)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WorkloadSpec {
    #[serde(default)]
    policy: Option<PolicyKind>,
    #[serde(default)]
    max_ticks: Option<Tick>,
    processes: Vec<ProcessSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProcessSpec {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arrival: Tick,
    lifespan: Tick,
    #[serde(default)]
    priority: Priority,
    #[serde(default)]
    resources: Vec<RequestSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RequestSpec {
    resource: usize,
    at: Tick,
    duration: Tick,
}

/// A parsed workload: the scenario plus the policy it asks for, if any.
#[derive(Debug, Clone)]
pub struct Workload {
    pub scenario: Scenario,
    pub policy: Option<PolicyKind>,
}

/// Parse and validate a JSON workload.
pub fn parse_workload(json: &str) -> Result<Workload, WorkloadError> {
    let parsed: WorkloadSpec = serde_json::from_str(json)?;

    let mut builder =
        Scenario::builder().max_ticks(parsed.max_ticks.unwrap_or(DEFAULT_MAX_TICKS));
    for (i, p) in parsed.processes.iter().enumerate() {
        let name = p.name.clone().unwrap_or_else(|| format!("P{i}"));
        builder = builder.process(&name, p.arrival, p.lifespan, p.priority);
        for r in &p.resources {
            if ResourceId::new(r.resource).is_none() {
                return Err(WorkloadError::BadResource {
                    name,
                    resource: r.resource,
                });
            }
            builder = builder.request(r.resource, r.at, r.duration);
        }
    }

    let scenario = builder.try_build()?;
    debug!(
        processes = scenario.processes().len(),
        max_ticks = scenario.max_ticks(),
        "workload parsed"
    );
    Ok(Workload {
        scenario,
        policy: parsed.policy,
    })
}

/// Read, parse and validate a workload file.
pub fn load_workload(path: &Path) -> Result<Workload, WorkloadError> {
    let json = std::fs::read_to_string(path).map_err(|source| WorkloadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_workload(&json)
}
