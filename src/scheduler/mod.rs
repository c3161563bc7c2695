//! Scheduler contract and the six policy variants.
//!
//! Every policy implements [`SchedulerPolicy`]; [`SchedulerKind`] is a
//! tagged enum over the six variants so the engine dispatches with a
//! `match` instead of a vtable (see spec's design notes: prefer an enum
//! of variants for cache-friendly code over runtime inheritance chains).

pub mod fcfs;
pub mod mlfq;
pub mod priority;
pub mod round_robin;
pub mod sjf;
pub mod srtf;

use crate::pcb::Pcb;

pub use fcfs::Fcfs;
pub use mlfq::Mlfq;
pub use priority::Priority;
pub use round_robin::RoundRobin;
pub use sjf::Sjf;
pub use srtf::Srtf;

/// Contract shared by every scheduling policy.
pub trait SchedulerPolicy {
    /// Human-readable name, e.g. `"RR(q=20)"`, shown in [`crate::result::SimulationResult`].
    fn name(&self) -> String;

    /// Add a `Ready` process to the policy's internal structure.
    fn admit(&mut self, pcb: Pcb);

    /// Remove and return the selected process, or `None` if empty.
    fn next(&mut self) -> Option<Pcb>;

    /// Whether this policy ever preempts a running process.
    fn preemptive(&self) -> bool;

    /// Called on each arrival/IO-return to decide immediate preemption.
    fn should_preempt(&self, current: &Pcb, arriving: &Pcb) -> bool;

    /// Reinstate a process whose quantum expired, in the policy's own
    /// placement rule (same queue, promoted, demoted...).
    fn on_quantum_expired(&mut self, pcb: Pcb);

    /// If `Some`, the engine enforces a timeout event of that length; if
    /// `None`, the process runs to CPU-burst completion.
    fn time_slice_for(&self, pcb: &Pcb) -> Option<u64>;

    /// Per-event-loop-iteration hook for background maintenance (aging,
    /// MLFQ boost). Policies with no maintenance leave this a no-op.
    fn tick(&mut self, current_time: u64);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of pids currently held, for introspection/tests.
    fn pids(&self) -> Vec<u32>;
}

/// Tagged union over the six policy variants.
pub enum SchedulerKind {
    Fcfs(Fcfs),
    Sjf(Sjf),
    Srtf(Srtf),
    RoundRobin(RoundRobin),
    Priority(Priority),
    Mlfq(Mlfq),
}

macro_rules! forward {
    ($self:ident, $method:ident $(, $arg:expr)*) => {
        match $self {
            SchedulerKind::Fcfs(s) => s.$method($($arg),*),
            SchedulerKind::Sjf(s) => s.$method($($arg),*),
            SchedulerKind::Srtf(s) => s.$method($($arg),*),
            SchedulerKind::RoundRobin(s) => s.$method($($arg),*),
            SchedulerKind::Priority(s) => s.$method($($arg),*),
            SchedulerKind::Mlfq(s) => s.$method($($arg),*),
        }
    };
}

impl SchedulerPolicy for SchedulerKind {
    fn name(&self) -> String {
        forward!(self, name)
    }

    fn admit(&mut self, pcb: Pcb) {
        forward!(self, admit, pcb)
    }

    fn next(&mut self) -> Option<Pcb> {
        forward!(self, next)
    }

    fn preemptive(&self) -> bool {
        forward!(self, preemptive)
    }

    fn should_preempt(&self, current: &Pcb, arriving: &Pcb) -> bool {
        forward!(self, should_preempt, current, arriving)
    }

    fn on_quantum_expired(&mut self, pcb: Pcb) {
        forward!(self, on_quantum_expired, pcb)
    }

    fn time_slice_for(&self, pcb: &Pcb) -> Option<u64> {
        forward!(self, time_slice_for, pcb)
    }

    fn tick(&mut self, current_time: u64) {
        forward!(self, tick, current_time)
    }

    fn len(&self) -> usize {
        forward!(self, len)
    }

    fn pids(&self) -> Vec<u32> {
        forward!(self, pids)
    }
}
