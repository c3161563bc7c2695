//! Error taxonomy.
//!
//! Usage errors (programmer mistakes, malformed input) are distinct from
//! internal invariant breaches: the former are returned as `Result`s the
//! caller can act on, the latter indicate a bug in the engine itself and
//! are reported via [`EngineError`] for the caller to turn into a panic
//! or abort as they see fit.

use thiserror::Error;

/// Errors raised when constructing a simulation from caller-supplied data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("duplicate pid {0}")]
    DuplicatePid(u32),

    #[error("process {pid}: total_cpu_time must be >= 1, got {value}")]
    InvalidTotalCpuTime { pid: u32, value: i64 },

    #[error("process {pid}: priority must be >= 1, got {value}")]
    InvalidPriority { pid: u32, value: i64 },

    #[error("process {pid}: arrival_time must be >= 0, got {value}")]
    InvalidArrivalTime { pid: u32, value: i64 },

    #[error("unknown scheduling policy {0:?}")]
    UnknownPolicy(String),

    #[error("malformed config: {0}")]
    InvalidConfig(String),

    #[error("workload is empty")]
    EmptyWorkload,
}

/// Internal invariant breach. These are bugs, not runtime conditions —
/// callers should not attempt to recover from them.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("popped event for unknown pid {0}")]
    UnknownPid(u32),

    #[error("running process {0} not present in pid table")]
    RunningProcessMissing(u32),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}
