use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use process_scheduler::{
    EngineConfig, Fcfs, Mlfq, Priority, ProcessSpec, RoundRobin, SchedulerKind, Simulator, Sjf, Srtf,
};

#[derive(Copy, Clone, ValueEnum)]
enum Policy {
    Fcfs,
    Sjf,
    Srtf,
    Rr,
    Priority,
    PriorityNp,
    Mlfq,
}

#[derive(Parser)]
#[command(name = "process-scheduler", about = "Compare CPU scheduling policies on a workload")]
struct Args {
    #[arg(short, long, value_enum, default_value_t = Policy::Rr)]
    policy: Policy,

    /// Generate a random workload of this many processes instead of the
    /// built-in illustrative one.
    #[arg(short = 'n', long)]
    random: Option<usize>,

    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    #[arg(long, default_value_t = 2)]
    context_switch_time: u64,

    #[arg(long, default_value_t = 20)]
    quantum: u64,
}

fn builtin_workload() -> Vec<ProcessSpec> {
    vec![
        ProcessSpec { pid: 1, arrival_time: 0, total_cpu_time: 50, io_burst_time: 0, base_priority: 3 },
        ProcessSpec { pid: 2, arrival_time: 10, total_cpu_time: 30, io_burst_time: 5, base_priority: 1 },
        ProcessSpec { pid: 3, arrival_time: 20, total_cpu_time: 40, io_burst_time: 0, base_priority: 2 },
    ]
}

fn random_workload(n: usize, seed: u64) -> Vec<ProcessSpec> {
    let mut rng = StdRng::seed_from_u64(seed);
    (1..=n as u32)
        .map(|pid| ProcessSpec {
            pid,
            arrival_time: rng.gen_range(0..100),
            total_cpu_time: rng.gen_range(5..200),
            io_burst_time: if rng.gen_bool(0.3) { rng.gen_range(1..30) } else { 0 },
            base_priority: rng.gen_range(1..10),
        })
        .collect()
}

fn build_scheduler(policy: Policy, quantum: u64) -> SchedulerKind {
    match policy {
        Policy::Fcfs => SchedulerKind::Fcfs(Fcfs::new()),
        Policy::Sjf => SchedulerKind::Sjf(Sjf::new()),
        Policy::Srtf => SchedulerKind::Srtf(Srtf::new()),
        Policy::Rr => SchedulerKind::RoundRobin(RoundRobin::new(quantum)),
        Policy::Priority => SchedulerKind::Priority(Priority::new(true, 100)),
        Policy::PriorityNp => SchedulerKind::Priority(Priority::new(false, 100)),
        Policy::Mlfq => SchedulerKind::Mlfq(Mlfq::new(vec![10, 20, 40], 5000, 2)),
    }
}

fn main() {
    let args = Args::parse();

    let workload = match args.random {
        Some(n) => random_workload(n, args.seed),
        None => builtin_workload(),
    };

    let scheduler = build_scheduler(args.policy, args.quantum);
    let config = EngineConfig {
        context_switch_time: args.context_switch_time,
        max_time: u64::MAX,
    };

    let result = match Simulator::new(scheduler, config).run(workload) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("simulation failed: {e}");
            std::process::exit(1);
        }
    };

    println!("=== {} ===", result.policy_name);
    println!("{:>5} {:>8} {:>10} {:>10} {:>10} {:>8}", "pid", "arrival", "completion", "turnaround", "waiting", "response");
    for p in &result.per_process {
        println!(
            "{:>5} {:>8} {:>10} {:>10} {:>10} {:>8}",
            p.pid, p.arrival, p.completion, p.turnaround, p.waiting, p.response
        );
    }
    if result.uncompleted_count > 0 {
        println!("\n{} process(es) did not complete within max_time", result.uncompleted_count);
    }

    println!();
    for key in ["avg_turnaround", "avg_waiting", "avg_response", "cpu_utilisation", "throughput", "fairness_index", "context_switches", "preemptions"] {
        if let Some(value) = result.metrics.get(key) {
            println!("{key:<20} {value:>12.3}");
        }
    }
}
