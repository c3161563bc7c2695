//! Multi-Level Feedback Queue: N ready queues, quantum shrinking with
//! queue index, demotion after `promotion_threshold` quantum exhaustions
//! at the same level, periodic boost of everything back to level 0.

use std::collections::VecDeque;

use super::SchedulerPolicy;
use crate::pcb::Pcb;

pub struct Mlfq {
    queues: Vec<VecDeque<Pcb>>,
    quanta: Vec<u64>,
    boost_interval: u64,
    promotion_threshold: u32,
    last_boost_time: u64,
}

impl Mlfq {
    pub fn new(quanta: Vec<u64>, boost_interval: u64, promotion_threshold: u32) -> Self {
        let n = quanta.len();
        Mlfq {
            queues: (0..n).map(|_| VecDeque::new()).collect(),
            quanta,
            boost_interval,
            promotion_threshold,
            last_boost_time: 0,
        }
    }

    fn num_queues(&self) -> usize {
        self.queues.len()
    }

    fn quantum_at(&self, level: usize) -> u64 {
        self.quanta[level.min(self.quanta.len() - 1)]
    }
}

impl SchedulerPolicy for Mlfq {
    fn name(&self) -> String {
        "MLFQ".to_string()
    }

    /// Enqueue at the process's current `queue_level`. A never-dispatched
    /// process starts at level 0 (set by [`Pcb::new`]); a process that was
    /// merely preempted (not demoted, not boosted) keeps the level it had.
    fn admit(&mut self, pcb: Pcb) {
        let level = pcb.queue_level.min(self.num_queues() - 1);
        self.queues[level].push_back(pcb);
    }

    fn next(&mut self) -> Option<Pcb> {
        for q in self.queues.iter_mut() {
            if let Some(pcb) = q.pop_front() {
                return Some(pcb);
            }
        }
        None
    }

    fn preemptive(&self) -> bool {
        true
    }

    fn should_preempt(&self, current: &Pcb, arriving: &Pcb) -> bool {
        arriving.queue_level < current.queue_level
    }

    /// A process exhausting its quantum `promotion_threshold` times at the
    /// same level is demoted one level (floor at the lowest queue); the
    /// run-count resets on any level change.
    fn on_quantum_expired(&mut self, mut pcb: Pcb) {
        if pcb.remaining_cpu_time == 0 {
            return;
        }
        pcb.mlfq_run_count += 1;
        let last_level = self.num_queues() - 1;
        if pcb.mlfq_run_count >= self.promotion_threshold && pcb.queue_level < last_level {
            pcb.queue_level += 1;
            pcb.mlfq_run_count = 0;
        }
        let level = pcb.queue_level;
        self.queues[level].push_back(pcb);
    }

    fn time_slice_for(&self, pcb: &Pcb) -> Option<u64> {
        Some(self.quantum_at(pcb.queue_level))
    }

    /// Periodic boost: every `boost_interval`, every queued descriptor
    /// moves to queue 0 and its run-count resets.
    fn tick(&mut self, current_time: u64) {
        if current_time < self.last_boost_time + self.boost_interval {
            return;
        }
        self.last_boost_time = current_time;

        for level in 1..self.num_queues() {
            while let Some(mut pcb) = self.queues[level].pop_front() {
                pcb.queue_level = 0;
                pcb.mlfq_run_count = 0;
                self.queues[0].push_back(pcb);
            }
        }
    }

    fn len(&self) -> usize {
        self.queues.iter().map(|q| q.len()).sum()
    }

    fn pids(&self) -> Vec<u32> {
        self.queues
            .iter()
            .flat_map(|q| q.iter().map(|p| p.pid))
            .collect()
    }
}
