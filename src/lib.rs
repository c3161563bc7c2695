//! Discrete-event CPU scheduler simulator.
//!
//! Feed a workload of [`pcb::ProcessSpec`] values and a [`scheduler::SchedulerKind`]
//! into [`engine::Simulator::run`] to get a [`result::SimulationResult`]: per-process
//! turnaround/waiting/response, system-wide metrics (utilisation, throughput,
//! fairness, context switches), and a Gantt trace. Six policies share one
//! contract (`scheduler::SchedulerPolicy`) so they can be compared on identical
//! input.
//!
//! Workload generation, trace parsing, plotting, parameter sweeps, and
//! config-file loading live outside this crate; it only consumes a finite
//! process list and produces an immutable result value.

pub mod engine;
pub mod error;
pub mod event;
pub mod pcb;
pub mod result;
pub mod scheduler;
pub mod stats;

pub use engine::{EngineConfig, Simulator};
pub use error::{EngineError, SchedulerError};
pub use pcb::{Pcb, ProcessSpec, ProcessState};
pub use result::{GanttSegment, ProcessRecord, SimulationResult};
pub use scheduler::{Fcfs, Mlfq, Priority, RoundRobin, SchedulerKind, SchedulerPolicy, Sjf, Srtf};
