//! First-Come First-Served: FIFO of admit order, never preempts, runs
//! each process to CPU-burst completion.

use std::collections::VecDeque;

use super::SchedulerPolicy;
use crate::pcb::Pcb;

#[derive(Default)]
pub struct Fcfs {
    queue: VecDeque<Pcb>,
}

impl Fcfs {
    pub fn new() -> Self {
        Fcfs {
            queue: VecDeque::new(),
        }
    }
}

impl SchedulerPolicy for Fcfs {
    fn name(&self) -> String {
        "FCFS".to_string()
    }

    fn admit(&mut self, pcb: Pcb) {
        self.queue.push_back(pcb);
    }

    fn next(&mut self) -> Option<Pcb> {
        self.queue.pop_front()
    }

    fn preemptive(&self) -> bool {
        false
    }

    fn should_preempt(&self, _current: &Pcb, _arriving: &Pcb) -> bool {
        false
    }

    fn on_quantum_expired(&mut self, pcb: Pcb) {
        // FCFS never schedules a quantum timeout; reaching here would be
        // an engine bug, but stay defensive and requeue rather than drop work.
        self.queue.push_back(pcb);
    }

    fn time_slice_for(&self, _pcb: &Pcb) -> Option<u64> {
        None
    }

    fn tick(&mut self, _current_time: u64) {}

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn pids(&self) -> Vec<u32> {
        self.queue.iter().map(|p| p.pid).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcb::ProcessSpec;

    fn pcb(pid: u32, arrival: u64, cpu: u64) -> Pcb {
        Pcb::new(ProcessSpec {
            pid,
            arrival_time: arrival,
            total_cpu_time: cpu,
            io_burst_time: 0,
            base_priority: 1,
        })
    }

    #[test]
    fn admits_in_fifo_order() {
        let mut s = Fcfs::new();
        s.admit(pcb(1, 0, 10));
        s.admit(pcb(2, 5, 10));
        s.admit(pcb(3, 10, 10));
        assert_eq!(s.next().unwrap().pid, 1);
        assert_eq!(s.next().unwrap().pid, 2);
        assert_eq!(s.next().unwrap().pid, 3);
        assert!(s.next().is_none());
    }

    #[test]
    fn never_preempts() {
        let s = Fcfs::new();
        assert!(!s.preemptive());
        assert!(!s.should_preempt(&pcb(1, 0, 10), &pcb(2, 1, 1)));
    }

    #[test]
    fn runs_to_completion_no_slice() {
        let s = Fcfs::new();
        assert_eq!(s.time_slice_for(&pcb(1, 0, 10)), None);
    }
}
