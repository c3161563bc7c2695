//! Shortest Job First: selects the ready process with the smallest
//! `total_cpu_time`, ties broken by arrival then pid. Non-preemptive.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::SchedulerPolicy;
use crate::pcb::Pcb;

struct Entry(Pcb);

fn key(pcb: &Pcb) -> (u64, u64, u32) {
    (pcb.total_cpu_time, pcb.arrival_time, pcb.pid)
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        key(&self.0) == key(&other.0)
    }
}
impl Eq for Entry {}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the smallest key out first.
        key(&other.0).cmp(&key(&self.0))
    }
}
impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Default)]
pub struct Sjf {
    heap: BinaryHeap<Entry>,
}

impl Sjf {
    pub fn new() -> Self {
        Sjf {
            heap: BinaryHeap::new(),
        }
    }
}

impl SchedulerPolicy for Sjf {
    fn name(&self) -> String {
        "SJF".to_string()
    }

    fn admit(&mut self, pcb: Pcb) {
        self.heap.push(Entry(pcb));
    }

    fn next(&mut self) -> Option<Pcb> {
        self.heap.pop().map(|e| e.0)
    }

    fn preemptive(&self) -> bool {
        false
    }

    fn should_preempt(&self, _current: &Pcb, _arriving: &Pcb) -> bool {
        false
    }

    fn on_quantum_expired(&mut self, pcb: Pcb) {
        self.heap.push(Entry(pcb));
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
    fn selects_shortest_job_first() {
        let mut s = Sjf::new();
        s.admit(pcb(1, 0, 50));
        s.admit(pcb(2, 10, 30));
        s.admit(pcb(3, 20, 40));
        assert_eq!(s.next().unwrap().pid, 2);
        assert_eq!(s.next().unwrap().pid, 3);
        assert_eq!(s.next().unwrap().pid, 1);
    }

    #[test]
    fn ties_break_by_arrival_then_pid() {
        let mut s = Sjf::new();
        s.admit(pcb(5, 10, 20));
        s.admit(pcb(2, 0, 20));
        s.admit(pcb(3, 0, 20));
        assert_eq!(s.next().unwrap().pid, 2);
        assert_eq!(s.next().unwrap().pid, 3);
        assert_eq!(s.next().unwrap().pid, 5);
    }
}
