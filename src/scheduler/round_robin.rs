//! Round Robin: FIFO queue, fixed quantum `q`, never preempts on arrival
//! (only the quantum timer forces a handoff).

use std::collections::VecDeque;

use super::SchedulerPolicy;
use crate::pcb::Pcb;

pub struct RoundRobin {
    queue: VecDeque<Pcb>,
    quantum: u64,
}

impl RoundRobin {
    pub fn new(quantum: u64) -> Self {
        RoundRobin {
            queue: VecDeque::new(),
            quantum,
        }
    }
}

impl SchedulerPolicy for RoundRobin {
    fn name(&self) -> String {
        format!("RR(q={})", self.quantum)
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
        if pcb.remaining_cpu_time > 0 {
            self.queue.push_back(pcb);
        }
    }

    fn time_slice_for(&self, _pcb: &Pcb) -> Option<u64> {
        Some(self.quantum)
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

    fn pcb(pid: u32) -> Pcb {
        Pcb::new(ProcessSpec {
            pid,
            arrival_time: 0,
            total_cpu_time: 100,
            io_burst_time: 0,
            base_priority: 1,
        })
    }

    #[test]
    fn time_slice_equals_configured_quantum() {
        let s = RoundRobin::new(20);
        assert_eq!(s.time_slice_for(&pcb(1)), Some(20));
    }

    #[test]
    fn quantum_expiry_requeues_to_back_when_work_remains() {
        let mut s = RoundRobin::new(20);
        s.admit(pcb(1));
        s.admit(pcb(2));
        let p1 = s.next().unwrap();
        s.on_quantum_expired(p1);
        assert_eq!(s.next().unwrap().pid, 2);
        assert_eq!(s.next().unwrap().pid, 1);
    }

    #[test]
    fn finished_process_is_not_requeued() {
        let mut s = RoundRobin::new(20);
        let mut p = pcb(1);
        p.remaining_cpu_time = 0;
        s.on_quantum_expired(p);
        assert!(s.is_empty());
    }

    #[test]
    fn name_reports_configured_quantum() {
        assert_eq!(RoundRobin::new(20).name(), "RR(q=20)");
    }
}
