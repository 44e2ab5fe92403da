use schedsim::*;

mod common;

use common::{assert_all_completed, names, pid_of, run, tick_of};

/// L takes R0 at its second tick; H arrives and asks for R0 straight away.
fn inversion(with_medium: bool) -> Scenario {
    let mut b = Scenario::builder()
        .process("L", 0, 6, 1)
        .request(0, 1, 3)
        .process("H", 2, 3, 9)
        .request(0, 0, 1);
    if with_medium {
        b = b.process("M", 3, 4, 5);
    }
    b.build()
}

#[test]
fn test_pip_boosts_owner_and_reverts_on_release() {
    common::setup_test();
    let scenario = inversion(false);
    let l = pid_of(&scenario, "L");
    let h = pid_of(&scenario, "H");
    let r0 = ResourceId::new(0).unwrap();

    let trace = run(PolicyKind::Pip, &scenario);
    assert_eq!(
        names(&trace, &scenario),
        ["L", "L", "L", "L", "H", "H", "H", "L", "L"]
    );

    // H preempts L, is denied R0 and lends L its priority.
    assert_eq!(tick_of(&trace, &TraceKind::Preempted { pid: l }), Some(2));
    assert_eq!(tick_of(&trace, &TraceKind::Blocked { pid: h, resource: r0 }), Some(2));
    assert_eq!(
        tick_of(&trace, &TraceKind::Boosted { pid: l, from: 1, to: 9 }),
        Some(2)
    );

    // L hands R0 over at the end of its fourth tick and drops back.
    assert_eq!(tick_of(&trace, &TraceKind::Released { pid: l, resource: r0 }), Some(3));
    assert_eq!(tick_of(&trace, &TraceKind::Woke { pid: h, resource: r0 }), Some(3));
    assert_eq!(
        tick_of(&trace, &TraceKind::Reverted { pid: l, from: 9, to: 1 }),
        Some(3)
    );
    assert_eq!(tick_of(&trace, &TraceKind::Acquired { pid: h, resource: r0 }), Some(4));
    assert_all_completed(&trace, &scenario);
}

#[test]
fn test_prio_never_boosts() {
    common::setup_test();
    let scenario = inversion(true);

    let trace = run(PolicyKind::Prio, &scenario);
    assert!(!trace
        .events()
        .iter()
        .any(|e| matches!(e.kind, TraceKind::Boosted { .. } | TraceKind::Reverted { .. })));
    assert_all_completed(&trace, &scenario);
}

#[test]
fn test_inversion_bounded_only_with_inheritance() {
    common::setup_test();
    let scenario = inversion(true);
    let h = pid_of(&scenario, "H");

    // With inheritance L finishes its critical section before M runs.
    let pip = run(PolicyKind::Pip, &scenario);
    assert_eq!(
        names(&pip, &scenario),
        ["L", "L", "L", "L", "H", "H", "H", "M", "M", "M", "M", "L", "L"]
    );
    assert_eq!(pip.completion_tick(h), Some(6));

    // Without it M runs to completion while H waits on L.
    let prio = run(PolicyKind::Prio, &scenario);
    assert_eq!(
        names(&prio, &scenario),
        ["L", "L", "L", "M", "M", "M", "M", "L", "H", "H", "H", "L", "L"]
    );
    assert_eq!(prio.completion_tick(h), Some(10));
}

#[test]
fn test_transitive_inheritance() {
    common::setup_test();
    let scenario = Scenario::builder()
        .process("L", 0, 8, 1)
        .request(0, 0, 5)
        .process("M", 1, 6, 5)
        .request(1, 0, 4)
        .request(0, 1, 2)
        .process("H", 3, 3, 9)
        .request(1, 0, 1)
        .build();
    let l = pid_of(&scenario, "L");
    let m = pid_of(&scenario, "M");
    let h = pid_of(&scenario, "H");

    let trace = run(PolicyKind::Pip, &scenario);

    // M blocks on L's R0: L inherits M's priority.
    assert_eq!(tick_of(&trace, &TraceKind::Boosted { pid: l, from: 1, to: 5 }), Some(2));
    // H blocks on M's R1: both M and, through M, L inherit H's priority.
    assert_eq!(tick_of(&trace, &TraceKind::Boosted { pid: m, from: 5, to: 9 }), Some(3));
    assert_eq!(tick_of(&trace, &TraceKind::Boosted { pid: l, from: 5, to: 9 }), Some(3));

    // Each owner drops back as it gives up the contested resource.
    assert_eq!(tick_of(&trace, &TraceKind::Reverted { pid: l, from: 9, to: 1 }), Some(5));
    assert_eq!(tick_of(&trace, &TraceKind::Reverted { pid: m, from: 9, to: 5 }), Some(8));

    assert_eq!(
        names(&trace, &scenario),
        ["L", "M", "L", "L", "L", "L", "M", "M", "M", "H", "H", "H", "M", "M", "L", "L", "L"]
    );
    assert_eq!(trace.completion_tick(h), Some(11));
    assert_all_completed(&trace, &scenario);
}

#[test]
fn test_priority_wake_order() {
    common::setup_test();
    // Two waiters queue on R0; the more urgent one gets it first even though
    // it blocked later.
    let scenario = Scenario::builder()
        .process("owner", 0, 4, 1)
        .request(0, 0, 3)
        .process("mid", 1, 2, 5)
        .request(0, 0, 1)
        .process("top", 2, 2, 8)
        .request(0, 0, 1)
        .build();
    let mid = pid_of(&scenario, "mid");
    let top = pid_of(&scenario, "top");
    let r0 = ResourceId::new(0).unwrap();

    for kind in [PolicyKind::Prio, PolicyKind::Pip] {
        let trace = run(kind, &scenario);
        let woke_top = tick_of(&trace, &TraceKind::Woke { pid: top, resource: r0 });
        let woke_mid = tick_of(&trace, &TraceKind::Woke { pid: mid, resource: r0 });
        assert!(woke_top < woke_mid, "{kind}: top woken at {woke_top:?}, mid at {woke_mid:?}");
    }

    // FIFO wake-up follows blocking order instead.
    let trace = run(PolicyKind::Rr, &scenario);
    let woke_top = tick_of(&trace, &TraceKind::Woke { pid: top, resource: r0 });
    let woke_mid = tick_of(&trace, &TraceKind::Woke { pid: mid, resource: r0 });
    assert!(woke_mid < woke_top);
}

#[test]
fn test_crossed_requests_deadlock() {
    common::setup_test();
    let scenario = Scenario::builder()
        .process("A", 0, 4, 1)
        .request(0, 0, 3)
        .request(1, 1, 2)
        .process("B", 0, 4, 1)
        .request(1, 0, 3)
        .request(0, 1, 2)
        .build();

    let err = Simulator::with_kind(PolicyKind::Rr)
        .run(&scenario)
        .unwrap_err();
    assert_eq!(
        err,
        SimError::Deadlock {
            tick: 2,
            waiting: vec![Pid(0), Pid(1)]
        }
    );
    assert!(err.to_string().contains("deadlock at tick 2"));
}
