//! schedsim - Tick-driven simulator of CPU scheduling policies.
//!
//! A single simulated CPU runs a set of processes under one of six
//! policies while the processes contend for a fixed pool of exclusive
//! resources. Runs are fully deterministic: the same scenario under the
//! same policy always yields the same trace.
//!
//! # Architecture
//!
//! - **Engine**: tick loop that admits arrivals, asks the policy whom to
//!   run, and serves resource requests as they fall due
//! - **Policies**: FIFO, SJF, SRTF, Round-Robin, Priority, and Priority
//!   with the Priority Inheritance Protocol
//! - **Arbitration**: resource ownership, waitqueues, and priority boosting
//! - **State**: process arena, ready queue, and resource table shared by
//!   the engine and the policy
//!
//! # Usage
//!
//! ```rust,no_run
//! use schedsim::*;
//!
//! let scenario = Scenario::builder()
//!     .process("low", 0, 6, 1)
//!     .request(0, 1, 3)
//!     .process("high", 2, 3, 9)
//!     .request(0, 0, 1)
//!     .build();
//!
//! let trace = Simulator::with_kind(PolicyKind::Pip).run(&scenario).unwrap();
//! trace.dump();
//! ```

pub mod arbitration;
pub mod engine;
pub mod fmt;
pub mod policy;
pub mod process;
pub mod queue;
pub mod resource;
pub mod scenario;
pub mod state;
pub mod trace;
pub mod types;
pub mod workload;

// Re-export the main public types for convenience.
pub use arbitration::{Acquire, Arbiter};
pub use engine::{SimError, Simulator};
pub use fmt::{init_tracing, sim_tick, SimFormat};
pub use policy::{Policy, PolicyKind};
pub use process::{ProcessDef, ProcessStatus};
pub use scenario::Scenario;
pub use state::SimState;
pub use trace::{ProcessSummary, Trace, TraceEvent, TraceKind};
pub use types::{Pid, Priority, ResourceId, Tick, NR_RESOURCES};
pub use workload::{load_workload, parse_workload, Workload, WorkloadError};
