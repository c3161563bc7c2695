//! The discrete-event driver: owns the virtual clock, the pid table, the
//! in-flight dispatch, and turns an event stream into a [`SimulationResult`].

use std::collections::HashMap;

use crate::error::{EngineError, SchedulerError};
use crate::event::{Event, EventKind, EventQueue};
use crate::pcb::{Pcb, ProcessSpec};
use crate::result::{GanttSegment, ProcessRecord, SimulationResult};
use crate::scheduler::{SchedulerKind, SchedulerPolicy};
use crate::stats;

/// Knobs recognised by the engine. Mirrors the options table: RR's quantum,
/// MLFQ's queue count/quanta, priority's preemption/aging-interval and
/// max_time all live on the scheduler the caller builds; this struct only
/// holds what the engine itself interprets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Ticks added on every dispatch, counted as overhead — neither idle
    /// nor useful work.
    pub context_switch_time: u64,
    /// Hard cap on the simulated clock. Events timestamped beyond it are
    /// never popped; work still pending at that point is reported as
    /// uncompleted rather than forced to finish.
    pub max_time: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            context_switch_time: 2,
            max_time: u64::MAX,
        }
    }
}

/// A process committed to run but still inside its context-switch delay;
/// becomes a [`RunningSlot`] once `effective_start` is reached.
struct PendingDispatch {
    pcb: Pcb,
    slice: Option<u64>,
    effective_start: u64,
}

/// The process currently holding the CPU, plus what the engine needs to
/// compute its *live* remaining time without rescanning events.
struct RunningSlot {
    pcb: Pcb,
    dispatch_time: u64,
    slice: Option<u64>,
}

pub struct Simulator {
    config: EngineConfig,
    scheduler: SchedulerKind,
    clock: u64,
    events: EventQueue,
    processes: HashMap<u32, Pcb>,
    running: Option<RunningSlot>,
    pending: Option<PendingDispatch>,
    gantt: Vec<GanttSegment>,
    gantt_open: Option<(u64, u32)>,
    completed: Vec<Pcb>,
    total_processes: usize,
    idle_time: u64,
    context_switches: u32,
    preemptions: u32,
}

impl Simulator {
    pub fn new(scheduler: SchedulerKind, config: EngineConfig) -> Self {
        Simulator {
            config,
            scheduler,
            clock: 0,
            events: EventQueue::new(),
            processes: HashMap::new(),
            running: None,
            pending: None,
            gantt: Vec::new(),
            gantt_open: None,
            completed: Vec::new(),
            total_processes: 0,
            idle_time: 0,
            context_switches: 0,
            preemptions: 0,
        }
    }

    /// Validate and admit a workload, then run to completion or `max_time`.
    pub fn run(mut self, workload: Vec<ProcessSpec>) -> Result<SimulationResult, SchedulerError> {
        if workload.is_empty() {
            return Err(SchedulerError::EmptyWorkload);
        }
        let mut seen = std::collections::HashSet::new();
        for spec in &workload {
            if !seen.insert(spec.pid) {
                return Err(SchedulerError::DuplicatePid(spec.pid));
            }
            spec.validate()?;
        }

        self.total_processes = workload.len();
        for spec in workload {
            let pid = spec.pid;
            let arrival = spec.arrival_time;
            self.processes.insert(pid, Pcb::new(spec));
            self.events.schedule_arrival(pid, arrival);
        }

        self.main_loop()
            .map_err(|e| SchedulerError::InvalidConfig(e.to_string()))?;
        Ok(self.collect_result())
    }

    fn main_loop(&mut self) -> Result<(), EngineError> {
        loop {
            if self.running.is_none()
                && self.pending.is_none()
                && self.events.is_empty()
                && self.scheduler.is_empty()
            {
                return Ok(());
            }

            self.scheduler.tick(self.clock);

            // The pending dispatch's context-switch delay elapses exactly
            // like any other event; fold it into the same ordered stream
            // by comparing it against the next queued event's timestamp.
            let next_event_ts = self.events.peek().map(|e| e.timestamp);
            let next_pending_ts = self.pending.as_ref().map(|p| p.effective_start);

            let next_ts = match (next_event_ts, next_pending_ts) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (Some(a), None) => Some(a),
                (None, Some(b)) => Some(b),
                (None, None) => None,
            };

            let Some(next_ts) = next_ts else {
                // Nothing queued, nothing pending; running process simply
                // has no bound event, which would be an engine bug since
                // every dispatch schedules at least CPU_BURST_COMPLETE.
                if self.running.is_some() {
                    return Err(EngineError::InvariantViolation(
                        "running process has no outstanding completion event".into(),
                    ));
                }
                return Ok(());
            };

            if next_ts > self.config.max_time {
                return Ok(());
            }

            if self.running.is_none() && self.pending.is_none() {
                self.idle_time += next_ts - self.clock;
            }
            self.clock = next_ts;

            if next_pending_ts == Some(self.clock) && self.pending.is_some() {
                self.finalize_pending();
            }

            // A pending dispatch and a same-timestamp event can coexist;
            // drain every event due at this instant before moving on.
            while let Some(event) = self.events.peek() {
                if event.timestamp != self.clock {
                    break;
                }
                let event = self.events.pop().expect("peeked Some");
                self.dispatch_event(event)?;
            }

            if self.running.is_none() && self.pending.is_none() && !self.scheduler.is_empty() {
                self.schedule_dispatch();
            }
        }
    }

    fn dispatch_event(&mut self, event: Event) -> Result<(), EngineError> {
        match event.kind {
            EventKind::Arrival => self.handle_arrival(event.pid),
            EventKind::IoBurstComplete => self.handle_io_complete(event.pid),
            EventKind::CpuBurstComplete => {
                if self.is_valid_running_event(&event) {
                    self.handle_cpu_complete();
                }
                Ok(())
            }
            EventKind::QuantumExpired => {
                if self.is_valid_running_event(&event) {
                    self.handle_quantum_expired();
                }
                Ok(())
            }
        }
    }

    /// A `CpuBurstComplete`/`QuantumExpired` event is valid only if a
    /// process is running, it is the event's target, and no dispatch has
    /// superseded it since the event was scheduled.
    fn is_valid_running_event(&self, event: &Event) -> bool {
        self.running
            .as_ref()
            .map(|slot| slot.pcb.pid == event.pid && slot.pcb.dispatch_epoch == event.dispatch_epoch)
            .unwrap_or(false)
    }

    fn handle_arrival(&mut self, pid: u32) -> Result<(), EngineError> {
        let mut pcb = self
            .processes
            .remove(&pid)
            .ok_or(EngineError::UnknownPid(pid))?;
        pcb.enter_ready(self.clock);
        let snapshot = pcb.clone();
        self.scheduler.admit(pcb);
        self.maybe_preempt(&snapshot);
        Ok(())
    }

    fn handle_io_complete(&mut self, pid: u32) -> Result<(), EngineError> {
        let mut pcb = self
            .processes
            .remove(&pid)
            .ok_or(EngineError::UnknownPid(pid))?;
        pcb.enter_ready(self.clock);
        let snapshot = pcb.clone();
        self.scheduler.admit(pcb);
        self.maybe_preempt(&snapshot);
        Ok(())
    }

    fn maybe_preempt(&mut self, arriving: &Pcb) {
        let Some(slot) = &self.running else { return };
        let live_current = self.live_view(slot);
        if self.scheduler.should_preempt(&live_current, arriving) {
            self.preempt_running();
        }
    }

    /// A clone of the running process with `remaining_cpu_time` adjusted
    /// for time already spent on the current dispatch. The slot's own copy
    /// is only updated when the process actually leaves the CPU.
    fn live_view(&self, slot: &RunningSlot) -> Pcb {
        let mut view = slot.pcb.clone();
        let elapsed = self.clock - slot.dispatch_time;
        view.remaining_cpu_time = view.remaining_cpu_time.saturating_sub(elapsed);
        view
    }

    fn preempt_running(&mut self) {
        let slot = self.running.take().expect("preempt requires a running process");
        let elapsed = self.clock - slot.dispatch_time;
        let mut pcb = slot.pcb;
        pcb.remaining_cpu_time = pcb.remaining_cpu_time.saturating_sub(elapsed);
        pcb.context_switch_count += 1;
        self.preemptions += 1;
        self.close_gantt(pcb.pid);
        pcb.enter_ready(self.clock);
        self.scheduler.admit(pcb);
    }

    fn handle_quantum_expired(&mut self) {
        let slot = self.running.take().expect("validity check confirmed running");
        let quantum = slot.slice.expect("quantum event implies a slice was set");
        let mut pcb = slot.pcb;
        pcb.remaining_cpu_time = pcb.remaining_cpu_time.saturating_sub(quantum);
        self.close_gantt(pcb.pid);
        pcb.enter_ready(self.clock);
        self.scheduler.on_quantum_expired(pcb);
    }

    /// A `CpuBurstComplete` event only ever fires once `remaining_cpu_time`
    /// has been fully run down (any earlier quantum/preemption invalidates
    /// it via the epoch check), so the branch here is not "did we finish
    /// the burst" but "has the one post-CPU I/O burst already happened":
    /// if not and one is owed, go wait for it; otherwise the process is
    /// genuinely done.
    fn handle_cpu_complete(&mut self) {
        let slot = self.running.take().expect("validity check confirmed running");
        let mut pcb = slot.pcb;
        pcb.remaining_cpu_time = 0;
        self.close_gantt(pcb.pid);

        if pcb.io_burst_time > 0 && !pcb.io_done {
            pcb.io_done = true;
            pcb.mark_waiting();
            let pid = pcb.pid;
            let resume_at = self.clock + pcb.io_burst_time;
            self.processes.insert(pid, pcb);
            self.events.schedule_io_complete(pid, resume_at);
        } else {
            pcb.mark_terminated(self.clock);
            self.completed.push(pcb);
        }
    }

    fn schedule_dispatch(&mut self) {
        let mut pcb = self.scheduler.next().expect("caller checked non-empty");
        pcb.leave_ready(self.clock);
        let slice = self.scheduler.time_slice_for(&pcb);
        let effective_start = self.clock + self.config.context_switch_time;

        self.context_switches += 1;

        self.pending = Some(PendingDispatch {
            pcb,
            slice,
            effective_start,
        });
    }

    fn finalize_pending(&mut self) {
        let pending = self.pending.take().expect("caller checked pending");
        let mut pcb = pending.pcb;
        let epoch = pcb.bump_dispatch_epoch();
        // ready_since was already consumed in schedule_dispatch (waiting
        // stops counting once the scheduler releases the pcb, not once the
        // context-switch delay elapses), so this only sets state/first_run.
        pcb.mark_running(pending.effective_start);

        let pid = pcb.pid;
        let remaining = pcb.remaining_cpu_time;
        self.gantt_open = Some((pending.effective_start, pid));
        self.events
            .schedule_cpu_complete(pid, pending.effective_start + remaining, epoch);
        if let Some(slice) = pending.slice {
            if slice < remaining {
                self.events
                    .schedule_quantum_expired(pid, pending.effective_start + slice, epoch);
            }
        }

        self.running = Some(RunningSlot {
            pcb,
            dispatch_time: pending.effective_start,
            slice: pending.slice,
        });
    }

    fn close_gantt(&mut self, pid: u32) {
        if let Some((start, open_pid)) = self.gantt_open.take() {
            debug_assert_eq!(open_pid, pid, "gantt segment closed for the wrong pid");
            if self.clock > start {
                self.gantt.push(GanttSegment {
                    start,
                    end: self.clock,
                    pid,
                });
            }
        }
    }

    fn collect_result(mut self) -> SimulationResult {
        if let Some(slot) = self.running.take() {
            self.close_gantt(slot.pcb.pid);
        }

        let records: Vec<ProcessRecord> = self
            .completed
            .iter()
            .map(|p| ProcessRecord {
                pid: p.pid,
                arrival: p.arrival_time,
                completion: p.completion_time.expect("completed implies terminated"),
                turnaround: p.turnaround().expect("completed implies terminated"),
                waiting: p.waiting(),
                response: p.response().unwrap_or(0),
                priority: p.priority,
            })
            .collect();

        let metrics = stats::compute_metrics(
            &records,
            self.clock,
            self.idle_time,
            self.context_switches,
            self.preemptions,
        );
        let cpu_utilisation = metrics.get("cpu_utilisation").copied().unwrap_or(0.0);

        SimulationResult {
            policy_name: self.scheduler.name(),
            metrics,
            per_process: records,
            gantt: self.gantt,
            cpu_utilisation,
            uncompleted_count: self.total_processes - self.completed.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{Fcfs, Priority, RoundRobin, Srtf};

    fn spec(pid: u32, arrival: u64, cpu: u64, io: u64, priority: i32) -> ProcessSpec {
        ProcessSpec {
            pid,
            arrival_time: arrival,
            total_cpu_time: cpu,
            io_burst_time: io,
            base_priority: priority,
        }
    }

    fn no_delay() -> EngineConfig {
        EngineConfig {
            context_switch_time: 0,
            max_time: u64::MAX,
        }
    }

    mod scenarios {
        use super::*;

        #[test]
        fn single_process_fcfs() {
            let sim = Simulator::new(SchedulerKind::Fcfs(Fcfs::new()), no_delay());
            let result = sim.run(vec![spec(1, 0, 50, 0, 1)]).unwrap();
            assert_eq!(result.per_process[0].turnaround, 50);
            assert_eq!(result.per_process[0].waiting, 0);
            assert_eq!(result.per_process[0].response, 0);
            assert!((result.cpu_utilisation - 100.0).abs() < 1e-9);
        }

        #[test]
        fn fcfs_queue_of_three() {
            let sim = Simulator::new(SchedulerKind::Fcfs(Fcfs::new()), no_delay());
            let result = sim
                .run(vec![
                    spec(1, 0, 50, 0, 1),
                    spec(2, 10, 30, 0, 1),
                    spec(3, 20, 40, 0, 1),
                ])
                .unwrap();
            let completions: Vec<u64> = result.per_process.iter().map(|p| p.completion).collect();
            assert_eq!(completions, vec![50, 80, 120]);
        }

        #[test]
        fn srtf_preemption() {
            let sim = Simulator::new(SchedulerKind::Srtf(Srtf::new()), no_delay());
            let result = sim
                .run(vec![spec(1, 0, 100, 0, 1), spec(2, 10, 20, 0, 1)])
                .unwrap();
            let by_pid = |pid| result.per_process.iter().find(|p| p.pid == pid).unwrap();
            assert_eq!(by_pid(1).turnaround, 120);
            assert_eq!(by_pid(2).turnaround, 20);
            assert_eq!(result.metrics["preemptions"] as u32, 1);
        }

        /// Three cpu=40 processes under RR(q=20), arriving together. Hand
        /// simulation: t0 P1 runs to 20 (remaining 20, requeued), t20 P2 to
        /// 40 (remaining 20, requeued), t40 P3 to 60 (remaining 20,
        /// requeued), t60 P1 finishes its last 20 at t80, t80 P2 finishes
        /// at t100, t100 P3 finishes at t120 — not the 60/100/120 figure
        /// sometimes quoted for this workload, which undercounts P1's
        /// second slice.
        #[test]
        fn round_robin_three_equal_jobs() {
            let sim = Simulator::new(SchedulerKind::RoundRobin(RoundRobin::new(20)), no_delay());
            let result = sim
                .run(vec![
                    spec(1, 0, 40, 0, 1),
                    spec(2, 0, 40, 0, 1),
                    spec(3, 0, 40, 0, 1),
                ])
                .unwrap();
            let by_pid = |pid| result.per_process.iter().find(|p| p.pid == pid).unwrap();
            assert_eq!(by_pid(1).completion, 80);
            assert_eq!(by_pid(2).completion, 100);
            assert_eq!(by_pid(3).completion, 120);
            assert_eq!(result.metrics["context_switches"] as u32, 6);
        }

        #[test]
        fn priority_preemptive_aging_is_ready_only() {
            let sim = Simulator::new(SchedulerKind::Priority(Priority::new(true, 100)), no_delay());
            let result = sim
                .run(vec![spec(1, 0, 1000, 0, 10), spec(2, 0, 10, 0, 1)])
                .unwrap();
            let by_pid = |pid| result.per_process.iter().find(|p| p.pid == pid).unwrap();
            assert_eq!(by_pid(2).completion, 10);
            // P1 runs uninterrupted once dispatched; aging only touches
            // Ready descriptors, so its priority never moves while running
            // and it needs no further preemption to finish its single burst.
            assert_eq!(by_pid(1).completion, 1010);
        }
    }

    #[test]
    fn io_burst_is_served_exactly_once_then_terminates() {
        let sim = Simulator::new(SchedulerKind::Fcfs(Fcfs::new()), no_delay());
        let result = sim.run(vec![spec(1, 0, 10, 5, 1)]).unwrap();
        let p = &result.per_process[0];
        assert_eq!(p.completion, 15);
        assert_eq!(p.turnaround, 15);
    }

    #[test]
    fn io_process_does_not_preempt_others_forever() {
        let sim = Simulator::new(SchedulerKind::Fcfs(Fcfs::new()), no_delay());
        let result = sim
            .run(vec![spec(1, 0, 10, 5, 1), spec(2, 1, 20, 0, 1)])
            .unwrap();
        assert_eq!(result.uncompleted_count, 0);
        assert_eq!(result.per_process.len(), 2);
    }

    #[test]
    fn max_time_truncates_and_reports_uncompleted() {
        let config = EngineConfig {
            context_switch_time: 0,
            max_time: 30,
        };
        let sim = Simulator::new(SchedulerKind::Fcfs(Fcfs::new()), config);
        let result = sim
            .run(vec![spec(1, 0, 50, 0, 1), spec(2, 60, 10, 0, 1)])
            .unwrap();
        assert_eq!(result.uncompleted_count, 2);
        assert!(result.per_process.is_empty());
    }

    #[test]
    fn context_switch_delay_is_not_counted_as_idle() {
        let config = EngineConfig {
            context_switch_time: 5,
            max_time: u64::MAX,
        };
        let sim = Simulator::new(SchedulerKind::Fcfs(Fcfs::new()), config);
        let result = sim.run(vec![spec(1, 0, 10, 0, 1)]).unwrap();
        // Completion accounts for the 5-tick dispatch delay, but idle_time
        // (which feeds cpu_utilisation) must not double-charge it.
        assert_eq!(result.per_process[0].completion, 15);
        assert!((result.cpu_utilisation - 100.0).abs() < 1e-9);
    }

    #[test]
    fn empty_workload_is_rejected() {
        let sim = Simulator::new(SchedulerKind::Fcfs(Fcfs::new()), no_delay());
        assert_eq!(sim.run(vec![]), Err(SchedulerError::EmptyWorkload));
    }

    #[test]
    fn duplicate_pid_is_rejected() {
        let sim = Simulator::new(SchedulerKind::Fcfs(Fcfs::new()), no_delay());
        let err = sim
            .run(vec![spec(1, 0, 10, 0, 1), spec(1, 5, 10, 0, 1)])
            .unwrap_err();
        assert_eq!(err, SchedulerError::DuplicatePid(1));
    }

    #[test]
    fn accounting_identity_holds_with_context_switches() {
        let config = EngineConfig {
            context_switch_time: 2,
            max_time: u64::MAX,
        };
        let sim = Simulator::new(SchedulerKind::RoundRobin(RoundRobin::new(10)), config);
        let result = sim
            .run(vec![spec(1, 0, 25, 0, 1), spec(2, 0, 15, 0, 1)])
            .unwrap();
        // completion of the last process equals T; every tick is either
        // idle, a context switch, or productive CPU for one of the two.
        let t = result.per_process.iter().map(|p| p.completion).max().unwrap();
        let cpu_sum = 25 + 15;
        let idle = (100.0 - result.cpu_utilisation) / 100.0 * t as f64;
        let switches = result.metrics["context_switches"] as u64 * 2;
        assert!(((cpu_sum + switches) as f64 - (t as f64 - idle)).abs() < 1.0);
    }
}
