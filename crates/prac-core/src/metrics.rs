//! Aggregated results of a simulation run.

use crate::simulator::Simulator;
use crate::util::time_eq;
use itertools::Itertools;
use serde::Serialize;

/// Final counters and ALERT statistics of a run.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunMetrics {
    pub runtime_s: f64,
    pub used_time_s: f64,
    pub idle_time_s: f64,
    pub total_activations: u64,
    pub untracked_activations: u64,
    pub total_rfms: u64,
    pub total_proactive_rfms: u64,
    pub total_abo_rfms: u64,
    pub total_rfm_time_s: f64,
    pub total_alerts: usize,
    pub total_alert_time_s: f64,
    /// Longest sequence of back-to-back ALERTs, at least 1.
    pub longest_adjacent_run: usize,
    pub forced_tfaw_waits: u64,
    pub forced_tfaw_wait_s: f64,
    pub active_rows: usize,
}

impl RunMetrics {
    pub(crate) fn from_simulator(sim: &Simulator) -> Self {
        let config = sim.config();
        let used_time_s = sim.time_s();
        RunMetrics {
            runtime_s: config.runtime_s,
            used_time_s,
            idle_time_s: (config.runtime_s - used_time_s).max(0.0),
            total_activations: sim.total_activations(),
            untracked_activations: sim.untracked_activations(),
            total_rfms: sim.total_rfms(),
            total_proactive_rfms: sim.total_proactive_rfms(),
            total_abo_rfms: sim.total_abo_rfms(),
            total_rfm_time_s: sim.total_rfm_time_s(),
            total_alerts: sim.total_alerts(),
            total_alert_time_s: sim.rows().total_alert_time_s(),
            longest_adjacent_run: longest_adjacent_run(
                &sim.alert_timestamps(),
                config.alert_duration_s(),
                config.back_to_back_gap_s(),
            ),
            forced_tfaw_waits: sim.forced_tfaw_waits(),
            forced_tfaw_wait_s: sim.forced_tfaw_wait_s(),
            active_rows: sim.rows().active_count(),
        }
    }
}

/// Length of the longest run of back-to-back ALERTs.
///
/// Two consecutive ALERTs are back-to-back when the time between the end of
/// the first stall (`alert_duration_s` after its start) and the start of the
/// next equals `gap_s`. Returns 1 when fewer than two ALERTs were issued.
pub fn longest_adjacent_run(timestamps: &[f64], alert_duration_s: f64, gap_s: f64) -> usize {
    let mut longest = 1;
    let mut current = 1;
    for (a, b) in timestamps.iter().tuple_windows() {
        if time_eq(b - a - alert_duration_s, gap_s) {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 1;
        }
    }
    longest
}
