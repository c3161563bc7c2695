//! Process descriptor: identity, immutable workload, mutable runtime state.

use crate::error::SchedulerError;

/// Process state machine.
///
/// Transitions allowed: `New -> Ready -> Running -> {Waiting, Ready, Terminated}`,
/// `Waiting -> Ready`, `Ready <-> Running` (dispatch/preemption).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    New,
    Ready,
    Running,
    Waiting,
    Terminated,
}

/// Immutable workload description supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessSpec {
    pub pid: u32,
    pub arrival_time: u64,
    pub total_cpu_time: u64,
    pub io_burst_time: u64,
    pub base_priority: i32,
}

impl ProcessSpec {
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if self.total_cpu_time == 0 {
            return Err(SchedulerError::InvalidTotalCpuTime {
                pid: self.pid,
                value: 0,
            });
        }
        if self.base_priority < 1 {
            return Err(SchedulerError::InvalidPriority {
                pid: self.pid,
                value: self.base_priority as i64,
            });
        }
        Ok(())
    }
}

/// Mutable process control block. One per admitted [`ProcessSpec`], owned
/// by the engine's pid table for the lifetime of the simulation.
#[derive(Debug, Clone)]
pub struct Pcb {
    pub pid: u32,
    pub arrival_time: u64,
    pub total_cpu_time: u64,
    pub io_burst_time: u64,
    pub base_priority: i32,

    pub state: ProcessState,
    pub remaining_cpu_time: u64,
    /// May decrease via priority aging; starts at `base_priority`.
    pub priority: i32,
    /// MLFQ queue level; unused by other policies.
    pub queue_level: usize,

    pub first_run_time: Option<u64>,
    pub completion_time: Option<u64>,
    pub accumulated_waiting_time: u64,
    pub context_switch_count: u32,

    /// Virtual time this descriptor most recently entered `Ready`.
    /// Used to accumulate waiting time in O(1) on the transition out of
    /// `Ready`, rather than scanning the ready set every tick.
    ready_since: Option<u64>,

    /// Number of times the process has run its quantum out at its
    /// current MLFQ level, reset on promotion/demotion/boost.
    pub mlfq_run_count: u32,

    /// Bumped on every dispatch. Carried in `CPU_BURST_COMPLETE` /
    /// `QUANTUM_EXPIRED` events so the engine can recognise one superseded
    /// by a later dispatch as stale without a decrease-key heap.
    pub dispatch_epoch: u64,

    /// Whether the single post-CPU I/O burst has already been taken.
    /// `total_cpu_time` is consumed exactly once; `io_burst_time` follows
    /// it exactly once. Without this flag the trivial re-dispatch that
    /// closes out a process after I/O (remaining_cpu_time already 0)
    /// would loop back into I/O forever.
    pub io_done: bool,
}

impl Pcb {
    pub fn new(spec: ProcessSpec) -> Self {
        Pcb {
            pid: spec.pid,
            arrival_time: spec.arrival_time,
            total_cpu_time: spec.total_cpu_time,
            io_burst_time: spec.io_burst_time,
            base_priority: spec.base_priority,
            state: ProcessState::New,
            remaining_cpu_time: spec.total_cpu_time,
            priority: spec.base_priority,
            queue_level: 0,
            first_run_time: None,
            completion_time: None,
            accumulated_waiting_time: 0,
            context_switch_count: 0,
            ready_since: None,
            mlfq_run_count: 0,
            dispatch_epoch: 0,
            io_done: false,
        }
    }

    /// Record a new dispatch, invalidating any event scheduled against a
    /// previous epoch.
    pub fn bump_dispatch_epoch(&mut self) -> u64 {
        self.dispatch_epoch += 1;
        self.dispatch_epoch
    }

    /// Transition into `Ready`, stamping the time so waiting can be
    /// accumulated in O(1) on the way back out.
    pub fn enter_ready(&mut self, now: u64) {
        self.state = ProcessState::Ready;
        self.ready_since = Some(now);
    }

    /// Leave `Ready` (dispatch or otherwise), folding elapsed time into
    /// `accumulated_waiting_time`.
    pub fn leave_ready(&mut self, now: u64) {
        if let Some(since) = self.ready_since.take() {
            self.accumulated_waiting_time += now - since;
        }
    }

    pub fn mark_running(&mut self, now: u64) {
        self.leave_ready(now);
        self.state = ProcessState::Running;
        if self.first_run_time.is_none() {
            self.first_run_time = Some(now);
        }
    }

    pub fn mark_waiting(&mut self) {
        self.state = ProcessState::Waiting;
    }

    pub fn mark_terminated(&mut self, now: u64) {
        debug_assert_eq!(self.remaining_cpu_time, 0);
        self.state = ProcessState::Terminated;
        self.completion_time = Some(now);
    }

    pub fn is_terminated(&self) -> bool {
        self.state == ProcessState::Terminated
    }

    /// `turnaround = completion - arrival`. Only meaningful once terminated.
    pub fn turnaround(&self) -> Option<u64> {
        self.completion_time.map(|c| c - self.arrival_time)
    }

    /// `response = first_run - arrival`. Only meaningful once dispatched.
    pub fn response(&self) -> Option<u64> {
        self.first_run_time.map(|f| f - self.arrival_time)
    }

    pub fn waiting(&self) -> u64 {
        self.accumulated_waiting_time
    }
}
