//! schedsim - Run scheduling policy simulations from JSON workloads.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use schedsim::{
    init_tracing, load_workload, Pid, PolicyKind, ProcessSummary, Simulator, Tick, Trace,
};

/// Run scheduling policy simulations from JSON workloads.
#[derive(Parser)]
#[command(name = "schedsim")]
struct Cli {
    /// Path to a JSON workload file.
    #[arg(required_unless_present = "list_policies")]
    workload: Option<PathBuf>,

    /// Scheduling policy.
    ///
    /// Overrides the workload's own "policy" field. Falls back to the
    /// SCHEDSIM_POLICY env var, then the workload, then fifo.
    #[arg(short, long, value_enum, env = "SCHEDSIM_POLICY")]
    policy: Option<PolicyKind>,

    /// Tick budget (overrides the workload's max_ticks).
    #[arg(long, value_name = "TICKS")]
    max_ticks: Option<Tick>,

    /// Print trace events to stderr.
    #[arg(long)]
    dump_trace: bool,

    /// Print the result as JSON instead of a table.
    #[arg(long)]
    json: bool,

    /// List available policies and exit.
    #[arg(long)]
    list_policies: bool,
}

/// Machine-readable run result.
#[derive(Serialize)]
struct Report<'a> {
    policy: &'static str,
    ticks: Tick,
    timeline: &'a [Option<Pid>],
    processes: Vec<ProcessSummary>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(&cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    if cli.list_policies {
        list_policies();
        return Ok(());
    }

    let Some(workload_path) = cli.workload.as_ref() else {
        unreachable!("clap requires <WORKLOAD> unless --list-policies is given");
    };

    let workload = load_workload(workload_path)
        .with_context(|| format!("failed to load workload {}", workload_path.display()))?;
    let mut scenario = workload.scenario;
    if let Some(max_ticks) = cli.max_ticks {
        scenario.set_max_ticks(max_ticks);
    }

    let kind = cli.policy.or(workload.policy).unwrap_or(PolicyKind::Fifo);
    let trace = Simulator::with_kind(kind)
        .run(&scenario)
        .with_context(|| format!("simulation under {kind} failed"))?;

    if cli.dump_trace {
        trace.dump();
    }

    if cli.json {
        let report = Report {
            policy: trace.policy(),
            ticks: trace.ticks(),
            timeline: trace.timeline(),
            processes: trace.summaries(),
        };
        let out = serde_json::to_string_pretty(&report).context("failed to encode report")?;
        println!("{out}");
    } else {
        print_report(&trace);
    }

    Ok(())
}

fn print_report(trace: &Trace) {
    println!("policy: {}", trace.policy());
    let timeline: Vec<String> = trace
        .timeline()
        .iter()
        .map(|t| match t {
            Some(pid) => pid.to_string(),
            None => "-".to_string(),
        })
        .collect();
    println!("timeline: {}", timeline.join(" "));
    println!();

    println!(
        "{:>4}  {:<16} {:>8} {:>10} {:>10} {:>8}",
        "pid", "name", "arrival", "completion", "turnaround", "waiting"
    );
    let summaries = trace.summaries();
    for s in &summaries {
        let opt = |v: Option<Tick>| v.map_or_else(|| "-".to_string(), |v| v.to_string());
        println!(
            "{:>4}  {:<16} {:>8} {:>10} {:>10} {:>8}",
            s.pid,
            s.name,
            s.arrival,
            opt(s.completion),
            opt(s.turnaround),
            opt(s.waiting)
        );
    }

    let done: Vec<&ProcessSummary> = summaries.iter().filter(|s| s.turnaround.is_some()).collect();
    if !done.is_empty() {
        let n = done.len() as f64;
        let avg_turnaround = done.iter().filter_map(|s| s.turnaround).sum::<Tick>() as f64 / n;
        let avg_waiting = done.iter().filter_map(|s| s.waiting).sum::<Tick>() as f64 / n;
        println!();
        println!("average turnaround: {avg_turnaround:.2}");
        println!("average waiting:    {avg_waiting:.2}");
    }
}

fn list_policies() {
    for kind in PolicyKind::ALL {
        println!("{:<6} {}", kind.as_str(), kind.build().name());
    }
}
