//! Refresh Management (RFM).
//!
//! Both the reactive burst that answers an ALERT and the proactive,
//! windowed maintenance RFMs target rows by descending counter value, ties
//! going to the lowest row index. An RFM resets the counter to a random value
//! in `[0, randreset]` and, in feinting and mixed workloads, retires the row.

use crate::rows::RowTable;
use crate::util::Rng;
use itertools::Itertools;
use log::debug;
use serde::Serialize;
use std::cmp::Reverse;

/// Why an RFM was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RfmKind {
    /// Scheduled inside an RFM window
    Proactive,
    /// Part of the burst answering an ALERT (ABO)
    Reactive,
}

/// One issued RFM, recorded when the simulator is built with RFM recording.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RfmEvent {
    /// Simulated time at which the RFM was issued
    pub time_s: f64,
    /// Targeted row
    pub row: usize,
    /// Counter right after the reset, `None` if the row was already retired
    pub counter: Option<u64>,
    /// Proactive or reactive
    pub kind: RfmKind,
}

/// Candidate rows ordered by descending counter, ascending row id on ties.
///
/// With `retire` set only active rows are candidates.
pub fn ranked_candidates(rows: &RowTable, retire: bool) -> Vec<usize> {
    rows.iter()
        .enumerate()
        .filter(|(_, r)| !retire || r.active)
        .sorted_by_key(|(_, r)| Reverse(r.counter))
        .map(|(i, _)| i)
        .collect()
}

/// The single row a proactive RFM targets, if any row has a nonzero counter.
pub fn proactive_target(rows: &RowTable, retire: bool) -> Option<usize> {
    rows.iter()
        .enumerate()
        .filter(|(_, r)| !retire || r.active)
        .min_by_key(|&(i, r)| (Reverse(r.counter), i))
        .filter(|(_, r)| r.counter > 0)
        .map(|(i, _)| i)
}

/// Issues one RFM to `row`.
///
/// Resets the counter to a value drawn from `[0, randreset]` and retires the
/// row when `retire` is set. A row retired earlier is neither reset nor drawn
/// for; the RFM itself is still counted. Returns the new counter value.
pub(crate) fn refresh(
    rows: &mut RowTable,
    row: usize,
    randreset: u64,
    retire: bool,
    rng: &mut Rng,
) -> Option<u64> {
    let counter = rows.is_active(row).then(|| {
        let value = rng.counter_value(randreset);
        rows.set_counter(row, value);
        value
    });
    rows.count_rfm(row);
    if retire {
        rows.retire(row);
    }
    counter
}

/// Window state of the proactive RFM scheduler.
///
/// Windows start every `rfm_freq_min_s`, each lasting
/// `rfm_freq_max_s - rfm_freq_min_s`. Inside each window one RFM is armed at
/// a uniformly drawn time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RfmSchedule {
    period_s: f64,
    width_s: f64,
    window_start_s: f64,
    window_end_s: f64,
    next_rfm_s: Option<f64>,
}

impl RfmSchedule {
    /// Creates the first window `[min, max]` and arms its RFM.
    ///
    /// Returns `None` when proactive RFMs are disabled (either bound is zero).
    pub fn new(rfm_freq_min_s: f64, rfm_freq_max_s: f64, rng: &mut Rng) -> Option<Self> {
        if rfm_freq_min_s <= 0.0 || rfm_freq_max_s <= 0.0 {
            return None;
        }
        let mut schedule = Self {
            period_s: rfm_freq_min_s,
            width_s: rfm_freq_max_s - rfm_freq_min_s,
            window_start_s: rfm_freq_min_s,
            window_end_s: rfm_freq_max_s,
            next_rfm_s: None,
        };
        schedule.arm(rng);
        Some(schedule)
    }

    fn arm(&mut self, rng: &mut Rng) {
        let window = self.window_end_s - self.window_start_s;
        self.next_rfm_s = Some(if window > 0.0 {
            self.window_start_s + rng.uniform_offset(window)
        } else {
            self.window_start_s
        });
    }

    /// Start of the current window.
    pub fn window_start_s(&self) -> f64 {
        self.window_start_s
    }

    /// End of the current window.
    pub fn window_end_s(&self) -> f64 {
        self.window_end_s
    }

    /// Armed RFM time of the current window, `None` once it fired.
    pub fn next_rfm_s(&self) -> Option<f64> {
        self.next_rfm_s
    }

    /// Whether the armed RFM is due at `now`.
    pub fn is_due(&self, now: f64) -> bool {
        self.next_rfm_s.is_some_and(|t| now >= t) && now <= self.window_end_s
    }

    /// Disarms the current window after its RFM fired.
    pub fn disarm(&mut self) {
        self.next_rfm_s = None;
    }

    /// Whether the current window has ended at `now`.
    pub fn is_expired(&self, now: f64) -> bool {
        now >= self.window_end_s
    }

    /// Moves to the next window, one period after the current start, and arms it.
    pub fn advance(&mut self, rng: &mut Rng) {
        self.window_start_s += self.period_s;
        self.window_end_s = self.window_start_s + self.width_s;
        self.arm(rng);
        debug!(
            "RFM window [{:e}, {:e}] armed at {:?}",
            self.window_start_s, self.window_end_s, self.next_rfm_s
        );
    }
}
