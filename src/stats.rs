//! Statistics aggregator: folds a completed-process list plus engine
//! counters into the system-wide metric set.

use std::collections::BTreeMap;

use crate::result::ProcessRecord;

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by N, matching `numpy.std`'s
/// default `ddof=0`, which is what the original implementation used).
fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

fn min(values: &[f64]) -> f64 {
    values.iter().cloned().fold(f64::INFINITY, f64::min)
}

fn max(values: &[f64]) -> f64 {
    values.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
}

fn insert_family(metrics: &mut BTreeMap<String, f64>, label: &str, values: &[f64]) {
    if values.is_empty() {
        for suffix in ["avg", "std", "min", "max", "median"] {
            metrics.insert(format!("{suffix}_{label}"), 0.0);
        }
        return;
    }
    metrics.insert(format!("avg_{label}"), mean(values));
    metrics.insert(format!("std_{label}"), std_dev(values));
    metrics.insert(format!("min_{label}"), min(values));
    metrics.insert(format!("max_{label}"), max(values));
    metrics.insert(format!("median_{label}"), median(values));
}

/// Jain's fairness index over turnaround times. `1.0` if there are no
/// completed processes or every turnaround is zero.
fn fairness_index(turnarounds: &[f64]) -> f64 {
    if turnarounds.is_empty() {
        return 1.0;
    }
    let sum: f64 = turnarounds.iter().sum();
    let sum_sq: f64 = turnarounds.iter().map(|t| t * t).sum();
    if sum_sq == 0.0 {
        return 1.0;
    }
    (sum * sum) / (turnarounds.len() as f64 * sum_sq)
}

/// Fold completed processes and engine-accumulated counters into the full
/// metric set. `total_time` is the simulated clock at the end of the run;
/// `idle_time` is ticks during which nothing ran and no context switch was
/// in flight.
pub fn compute_metrics(
    completed: &[ProcessRecord],
    total_time: u64,
    idle_time: u64,
    context_switches: u32,
    preemptions: u32,
) -> BTreeMap<String, f64> {
    let mut metrics = BTreeMap::new();

    let turnarounds: Vec<f64> = completed.iter().map(|p| p.turnaround as f64).collect();
    let waitings: Vec<f64> = completed.iter().map(|p| p.waiting as f64).collect();
    let responses: Vec<f64> = completed.iter().map(|p| p.response as f64).collect();

    insert_family(&mut metrics, "turnaround", &turnarounds);
    insert_family(&mut metrics, "waiting", &waitings);
    insert_family(&mut metrics, "response", &responses);

    let cpu_utilisation = if total_time > 0 {
        100.0 * (total_time - idle_time) as f64 / total_time as f64
    } else {
        0.0
    };
    metrics.insert("cpu_utilisation".to_string(), cpu_utilisation);

    let throughput = if total_time > 0 {
        completed.len() as f64 / (total_time as f64 / 1000.0)
    } else {
        0.0
    };
    metrics.insert("throughput".to_string(), throughput);

    metrics.insert("fairness_index".to_string(), fairness_index(&turnarounds));
    metrics.insert("total_processes".to_string(), completed.len() as f64);
    metrics.insert("context_switches".to_string(), context_switches as f64);
    metrics.insert("preemptions".to_string(), preemptions as f64);

    metrics
}
