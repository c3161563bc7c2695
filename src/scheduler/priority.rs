//! Priority scheduling, with optional preemption and periodic aging.
//! Smaller `priority` value is more urgent. Ties break by arrival then pid.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::SchedulerPolicy;
use crate::pcb::Pcb;

struct Entry(Pcb);

fn key(pcb: &Pcb) -> (i32, u64, u32) {
    (pcb.priority, pcb.arrival_time, pcb.pid)
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

pub struct Priority {
    heap: BinaryHeap<Entry>,
    preemptive: bool,
    aging_interval: u64,
    last_aging_time: u64,
}

impl Priority {
    pub fn new(preemptive: bool, aging_interval: u64) -> Self {
        Priority {
            heap: BinaryHeap::new(),
            preemptive,
            aging_interval,
            last_aging_time: 0,
        }
    }
}

impl SchedulerPolicy for Priority {
    fn name(&self) -> String {
        format!(
            "Priority({})",
            if self.preemptive {
                "Preemptive"
            } else {
                "Non-preemptive"
            }
        )
    }

    fn admit(&mut self, pcb: Pcb) {
        self.heap.push(Entry(pcb));
    }

    fn next(&mut self) -> Option<Pcb> {
        self.heap.pop().map(|e| e.0)
    }

    fn preemptive(&self) -> bool {
        self.preemptive
    }

    fn should_preempt(&self, current: &Pcb, arriving: &Pcb) -> bool {
        self.preemptive && arriving.priority < current.priority
    }

    fn on_quantum_expired(&mut self, pcb: Pcb) {
        // Priority scheduling sets no time slice; defensive requeue only.
        if pcb.remaining_cpu_time > 0 {
            self.heap.push(Entry(pcb));
        }
    }

    fn time_slice_for(&self, _pcb: &Pcb) -> Option<u64> {
        None
    }

    /// Every `aging_interval` of virtual time, every ready descriptor with
    /// `priority > 1` decrements its priority by one (floor 1). Running
    /// and waiting descriptors are untouched — they are not held here.
    fn tick(&mut self, current_time: u64) {
        if current_time < self.last_aging_time + self.aging_interval {
            return;
        }
        self.last_aging_time = current_time;

        let entries: Vec<Entry> = std::mem::take(&mut self.heap).into_vec();
        for mut e in entries {
            if e.0.priority > 1 {
                e.0.priority -= 1;
            }
            self.heap.push(e);
        }
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn pids(&self) -> Vec<u32> {
        self.heap.iter().map(|e| e.0.pid).collect()
    }
}
