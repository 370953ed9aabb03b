//! ALERT handling: ISOC burst, GLOBAL STALL, reactive RFM burst, ABO delay
//! and re-alerting of rows that are still above threshold.

use crate::rfm::{self, RfmKind};
use crate::simulator::{AlertRecord, Simulator, Step};
use log::debug;

impl Simulator {
    /// Handles an ALERT triggered by `row` and every re-alert it causes.
    ///
    /// Re-alerts are processed depth-first in the order the rows were
    /// activated, using an explicit stack instead of recursion.
    pub(crate) fn raise_alert(&mut self, row: usize) {
        let mut pending = vec![row];
        while let Some(trigger) = pending.pop() {
            // an earlier sibling's RFM may have retired the row while it was queued
            if self.retire_rows && !self.rows.is_active(trigger) {
                continue;
            }
            let touched = self.alert_episode(trigger);
            let threshold = self.config.threshold;
            let realerts: Vec<usize> = touched
                .into_iter()
                .filter(|&r| self.rows.is_active(r) && self.rows.get(r).counter > threshold)
                .collect();
            if !realerts.is_empty() {
                debug!("ALERT for row {} re-alerts rows {:?}", trigger, realerts);
            }
            pending.extend(realerts.into_iter().rev());
        }
    }

    /// Runs one ALERT for `trigger` and returns the rows activated during
    /// its ISOC burst and ABO delay.
    fn alert_episode(&mut self, trigger: usize) -> Vec<usize> {
        let mut touched = Vec::new();
        self.burst(self.config.isoc, &mut touched);

        let remaining = self.config.runtime_s - self.time_s;
        if remaining > 0.0 {
            let start_s = self.time_s;
            let consumed_s = self.alert_duration_s.min(remaining);
            debug!("ALERT for row {} at {} stalls {}", trigger, start_s, consumed_s);
            self.alerts.push(AlertRecord {
                row: trigger,
                start_s,
                consumed_s,
            });
            self.rows.record_alert(trigger, consumed_s);
            self.time_s += consumed_s;
        }

        let candidates = rfm::ranked_candidates(&self.rows, self.retire_rows);
        if !candidates.is_empty() {
            for i in 0..self.config.rfmabo as usize {
                self.issue_rfm(candidates[i % candidates.len()], RfmKind::Reactive);
            }
        }

        self.burst(u64::from(self.config.abo_delay), &mut touched);
        touched
    }

    /// Issues up to `count` activations, moving the cursor before each one.
    fn burst(&mut self, count: u64, touched: &mut Vec<usize>) {
        for _ in 0..count {
            if !self.fits_activate() {
                break;
            }
            self.advance_cursor();
            match self.activate_next() {
                Step::Activated(Some(row)) => touched.push(row),
                Step::Activated(None) => {}
                Step::OutOfTime | Step::Exhausted => break,
            }
        }
    }
}
