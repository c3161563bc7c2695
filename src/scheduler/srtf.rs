//! Shortest Remaining Time First: preemptive sibling of SJF, selecting on
//! `remaining_cpu_time` instead of the original `total_cpu_time`.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::SchedulerPolicy;
use crate::pcb::Pcb;

struct Entry(Pcb);

fn key(pcb: &Pcb) -> (u64, u64, u32) {
    (pcb.remaining_cpu_time, pcb.arrival_time, pcb.pid)
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        key(&self.0) == key(&other.0)
    }
}
impl Eq for Entry {}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        key(&other.0).cmp(&key(&self.0))
    }
}
impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Default)]
pub struct Srtf {
    heap: BinaryHeap<Entry>,
}

impl Srtf {
    pub fn new() -> Self {
        Srtf {
            heap: BinaryHeap::new(),
        }
    }
}

impl SchedulerPolicy for Srtf {
    fn name(&self) -> String {
        "SRTF".to_string()
    }

    fn admit(&mut self, pcb: Pcb) {
        self.heap.push(Entry(pcb));
    }

    fn next(&mut self) -> Option<Pcb> {
        self.heap.pop().map(|e| e.0)
    }

    fn preemptive(&self) -> bool {
        true
    }

    fn should_preempt(&self, current: &Pcb, arriving: &Pcb) -> bool {
        arriving.remaining_cpu_time < current.remaining_cpu_time
    }

    fn on_quantum_expired(&mut self, pcb: Pcb) {
        // SRTF never sets a time slice, so the engine never raises this;
        // requeue defensively rather than lose the process.
        if pcb.remaining_cpu_time > 0 {
            self.heap.push(Entry(pcb));
        }
    }

    fn time_slice_for(&self, _pcb: &Pcb) -> Option<u64> {
        None
    }

    fn tick(&mut self, _current_time: u64) {}

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn pids(&self) -> Vec<u32> {
        self.heap.iter().map(|e| e.0.pid).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcb::ProcessSpec;

    fn pcb_with_remaining(pid: u32, arrival: u64, remaining: u64) -> Pcb {
        let mut p = Pcb::new(ProcessSpec {
            pid,
            arrival_time: arrival,
            total_cpu_time: remaining,
            io_burst_time: 0,
            base_priority: 1,
        });
        p.remaining_cpu_time = remaining;
        p
    }

    #[test]
    fn selects_shortest_remaining_time() {
        let mut s = Srtf::new();
        s.admit(pcb_with_remaining(1, 0, 90));
        s.admit(pcb_with_remaining(2, 10, 20));
        assert_eq!(s.next().unwrap().pid, 2);
    }

    #[test]
    fn preempts_when_arriving_has_strictly_smaller_remaining_time() {
        let s = Srtf::new();
        let running = pcb_with_remaining(1, 0, 90);
        let arriving = pcb_with_remaining(2, 10, 20);
        assert!(s.should_preempt(&running, &arriving));
        assert!(!s.should_preempt(&arriving, &running));
    }

    #[test]
    fn no_preemption_on_equal_remaining_time() {
        let s = Srtf::new();
        let a = pcb_with_remaining(1, 0, 50);
        let b = pcb_with_remaining(2, 10, 50);
        assert!(!s.should_preempt(&a, &b));
    }
}
