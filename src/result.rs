//! The value external collaborators (visualiser, experiment driver,
//! export tooling) consume: an immutable snapshot of one simulation run.

use std::collections::BTreeMap;

/// One segment of CPU occupancy in the Gantt trace. Emitted whenever a
/// process leaves the CPU, by preemption, quantum, I/O, or completion.
/// Consecutive segments for the same pid with touching timestamps are
/// mergeable by consumers; the engine does not pre-merge them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GanttSegment {
    pub start: u64,
    pub end: u64,
    pub pid: u32,
}

/// Per-process timing outcomes, computed once the process has terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessRecord {
    pub pid: u32,
    pub arrival: u64,
    pub completion: u64,
    pub turnaround: u64,
    pub waiting: u64,
    pub response: u64,
    pub priority: i32,
}

/// The finished product of a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub policy_name: String,
    /// Metric key set as enumerated in the statistics aggregator:
    /// avg/std/min/max/median turnaround, waiting, response;
    /// cpu_utilisation, throughput, fairness_index, context_switches,
    /// preemptions, total_processes.
    pub metrics: BTreeMap<String, f64>,
    pub per_process: Vec<ProcessRecord>,
    pub gantt: Vec<GanttSegment>,
    pub cpu_utilisation: f64,
    /// How many admitted processes never reached `Terminated` because
    /// `max_time` was exhausted first. Excluded from `per_process` and
    /// from all aggregate statistics.
    pub uncompleted_count: usize,
}
