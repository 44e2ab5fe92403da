use schedsim::*;

mod common;

use common::{assert_all_completed, names, pid_of, run};

#[test]
fn test_fcfs_runs_in_arrival_order() {
    common::setup_test();
    let scenario = Scenario::builder()
        .process("A", 0, 3, 1)
        .process("B", 0, 2, 1)
        .build();

    let trace = run(PolicyKind::Fifo, &scenario);
    assert_eq!(names(&trace, &scenario), ["A", "A", "A", "B", "B"]);
    assert_all_completed(&trace, &scenario);
}

#[test]
fn test_fcfs_ignores_priority_and_length() {
    common::setup_test();
    let scenario = Scenario::builder()
        .process("long", 0, 4, 1)
        .process("short-urgent", 1, 1, 99)
        .build();

    let trace = run(PolicyKind::Fifo, &scenario);
    assert_eq!(
        names(&trace, &scenario),
        ["long", "long", "long", "long", "short-urgent"]
    );
}

#[test]
fn test_sjf_picks_shortest_first() {
    common::setup_test();
    let scenario = Scenario::builder()
        .process("A", 0, 5, 1)
        .process("B", 0, 2, 1)
        .build();

    let trace = run(PolicyKind::Sjf, &scenario);
    assert_eq!(
        names(&trace, &scenario),
        ["B", "B", "A", "A", "A", "A", "A"]
    );
}

#[test]
fn test_sjf_does_not_preempt() {
    common::setup_test();
    let scenario = Scenario::builder()
        .process("A", 0, 4, 1)
        .process("B", 1, 1, 1)
        .build();

    let trace = run(PolicyKind::Sjf, &scenario);
    assert_eq!(names(&trace, &scenario), ["A", "A", "A", "A", "B"]);
    let a = pid_of(&scenario, "A");
    assert_eq!(trace.count(a, |k| matches!(k, TraceKind::Preempted { .. })), 0);
}

#[test]
fn test_srtf_preempts_and_resumes() {
    common::setup_test();
    let scenario = Scenario::builder()
        .process("A", 0, 10, 1)
        .process("B", 1, 2, 1)
        .build();
    let a = pid_of(&scenario, "A");
    let b = pid_of(&scenario, "B");

    let trace = run(PolicyKind::Srtf, &scenario);
    let mut expected = vec!["A", "B", "B"];
    expected.extend(["A"; 9]);
    assert_eq!(names(&trace, &scenario), expected);

    assert_eq!(common::tick_of(&trace, &TraceKind::Preempted { pid: a }), Some(1));
    assert_eq!(trace.completion_tick(b), Some(2));
    assert_eq!(trace.completion_tick(a), Some(11));
    assert_all_completed(&trace, &scenario);
}

#[test]
fn test_srtf_equal_remaining_does_not_preempt() {
    common::setup_test();
    let scenario = Scenario::builder()
        .process("A", 0, 3, 1)
        .process("B", 1, 2, 1)
        .build();

    // At tick 1 both have two ticks left; the running process keeps the CPU.
    let trace = run(PolicyKind::Srtf, &scenario);
    assert_eq!(names(&trace, &scenario), ["A", "A", "A", "B", "B"]);
}

#[test]
fn test_srtf_tie_break_is_deterministic() {
    common::setup_test();
    let scenario = Scenario::builder()
        .process("C", 0, 10, 1)
        .process("A", 1, 2, 1)
        .process("B", 1, 2, 1)
        .build();

    let first = run(PolicyKind::Srtf, &scenario);
    let mut expected = vec!["C", "A", "A", "B", "B"];
    expected.extend(["C"; 9]);
    assert_eq!(names(&first, &scenario), expected);

    for _ in 0..5 {
        let again = run(PolicyKind::Srtf, &scenario);
        assert_eq!(again.timeline(), first.timeline());
        assert_eq!(again.events(), first.events());
    }
}

#[test]
fn test_rr_interleaves_equal_processes() {
    common::setup_test();
    let scenario = Scenario::builder()
        .process("A", 0, 2, 1)
        .process("B", 0, 2, 1)
        .process("C", 0, 2, 1)
        .build();

    let trace = run(PolicyKind::Rr, &scenario);
    assert_eq!(names(&trace, &scenario), ["A", "B", "C", "A", "B", "C"]);
}

#[test]
fn test_rr_single_process_keeps_running() {
    common::setup_test();
    let scenario = Scenario::builder().process("solo", 0, 4, 1).build();

    let trace = run(PolicyKind::Rr, &scenario);
    let solo = pid_of(&scenario, "solo");
    assert_eq!(trace.schedule_order(), vec![solo; 4]);
    assert_eq!(trace.count(solo, |k| matches!(k, TraceKind::Scheduled { .. })), 1);
    assert_eq!(trace.count(solo, |k| matches!(k, TraceKind::Preempted { .. })), 0);
}

#[test]
fn test_priority_preempts_on_higher_only() {
    common::setup_test();
    let scenario = Scenario::builder()
        .process("low", 0, 3, 1)
        .process("same", 1, 1, 1)
        .process("high", 2, 1, 5)
        .build();

    // Equal priority waits its turn; the preempted process queues behind it.
    let trace = run(PolicyKind::Prio, &scenario);
    assert_eq!(
        names(&trace, &scenario),
        ["low", "low", "high", "same", "low"]
    );
}

#[test]
fn test_idle_until_first_arrival() {
    common::setup_test();
    let scenario = Scenario::builder().process("late", 2, 1, 1).build();

    let trace = run(PolicyKind::Fifo, &scenario);
    assert_eq!(names(&trace, &scenario), ["-", "-", "late"]);
    assert_eq!(trace.idle_count(), 2);
    assert_eq!(trace.summaries()[0].turnaround, Some(1));
}

/// A mixed workload with resource contention completes under every policy
/// and the state invariants hold after every tick.
#[test]
fn test_every_policy_completes_contended_workload() {
    common::setup_test();
    let scenario = Scenario::builder()
        .process("a", 0, 6, 2)
        .request(0, 1, 3)
        .process("b", 1, 4, 7)
        .request(0, 0, 2)
        .request(1, 1, 2)
        .process("c", 2, 3, 4)
        .request(1, 0, 3)
        .process("d", 3, 2, 9)
        .build();

    for kind in PolicyKind::ALL {
        let trace = run(kind, &scenario);
        assert_eq!(trace.policy(), kind.build().name());
        assert_all_completed(&trace, &scenario);
        assert_eq!(trace.idle_count(), 0, "{kind} idled with work pending");
    }
}

#[test]
fn test_policy_swap_changes_only_order() {
    common::setup_test();
    let scenario = Scenario::builder()
        .process("long", 0, 5, 1)
        .process("short", 0, 1, 1)
        .build();

    let fifo = run(PolicyKind::Fifo, &scenario);
    let sjf = run(PolicyKind::Sjf, &scenario);
    assert_eq!(fifo.ticks(), sjf.ticks());
    assert_eq!(names(&fifo, &scenario)[0], "long");
    assert_eq!(names(&sjf, &scenario)[0], "short");
}

/// A policy defined outside the crate plugs into the simulator unchanged.
struct Lifo;

impl Policy for Lifo {
    fn name(&self) -> &'static str {
        "LIFO"
    }

    fn schedule(&mut self, state: &mut SimState) -> Option<Pid> {
        if let Some(cur) = state.continuable_current() {
            return Some(cur);
        }
        let last = state.ready().iter().last()?;
        state.ready_remove(last);
        Some(last)
    }

    fn acquire(&mut self, state: &mut SimState, resource: ResourceId, requester: Pid) -> Acquire {
        Arbiter::FIFO.acquire(state, resource, requester)
    }

    fn release(&mut self, state: &mut SimState, resource: ResourceId, releaser: Pid) -> Option<Pid> {
        Arbiter::FIFO.release(state, resource, releaser)
    }
}

#[test]
fn test_custom_policy() {
    common::setup_test();
    let scenario = Scenario::builder()
        .process("A", 0, 1, 1)
        .process("B", 0, 1, 1)
        .process("C", 0, 1, 1)
        .build();

    let mut sim = Simulator::new(Box::new(Lifo));
    assert_eq!(sim.policy_name(), "LIFO");
    let trace = sim.run(&scenario).unwrap();
    assert_eq!(names(&trace, &scenario), ["C", "B", "A"]);
}

#[test]
fn test_definitions_out_of_arrival_order() {
    common::setup_test();
    let scenario = Scenario::builder()
        .process("third", 5, 1, 1)
        .process("first", 0, 2, 1)
        .process("second", 1, 1, 1)
        .build();
    assert_eq!(pid_of(&scenario, "first"), Pid(0));
    assert_eq!(pid_of(&scenario, "third"), Pid(2));

    let trace = run(PolicyKind::Fifo, &scenario);
    assert_eq!(
        names(&trace, &scenario),
        ["first", "first", "second", "-", "-", "third"]
    );
    assert_all_completed(&trace, &scenario);
}
