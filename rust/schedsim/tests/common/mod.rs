#![allow(dead_code)]

use schedsim::{init_tracing, Pid, PolicyKind, Scenario, Simulator, Trace, TraceKind};

/// Initialize tracing from `RUST_LOG`.
///
/// `init_tracing()` is idempotent: the first call in the process installs
/// the subscriber, later calls are silently ignored.
pub fn setup_test() {
    init_tracing();
}

/// Run `scenario` under `kind`, panicking if the run does not complete.
pub fn run(kind: PolicyKind, scenario: &Scenario) -> Trace {
    let trace = Simulator::with_kind(kind)
        .run(scenario)
        .unwrap_or_else(|e| panic!("{kind} run failed: {e}"));
    if std::env::var_os("SCHEDSIM_DUMP").is_some() {
        trace.dump();
    }
    trace
}

/// The timeline as process names, `-` for idle ticks.
pub fn names(trace: &Trace, scenario: &Scenario) -> Vec<String> {
    trace
        .timeline()
        .iter()
        .map(|t| match t {
            Some(pid) => scenario.processes()[pid.index()].name.clone(),
            None => "-".to_string(),
        })
        .collect()
}

/// Pid of the process called `name`.
pub fn pid_of(scenario: &Scenario, name: &str) -> Pid {
    scenario
        .processes()
        .iter()
        .find(|d| d.name == name)
        .unwrap_or_else(|| panic!("no process named {name:?}"))
        .pid
}

/// Tick of the first event equal to `kind`.
pub fn tick_of(trace: &Trace, kind: &TraceKind) -> Option<u64> {
    trace.events().iter().find(|e| &e.kind == kind).map(|e| e.tick)
}

/// Every process ran exactly its lifespan.
pub fn assert_all_completed(trace: &Trace, scenario: &Scenario) {
    for def in scenario.processes() {
        assert_eq!(
            trace.run_ticks(def.pid),
            def.lifespan,
            "{} ran the wrong number of ticks",
            def.name
        );
        assert!(
            trace.completion_tick(def.pid).is_some(),
            "{} never completed",
            def.name
        );
    }
}
