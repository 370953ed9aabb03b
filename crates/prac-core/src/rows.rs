//! Per-row PRAC state.
//!
//! The [`RowTable`] is the single owner of every row's counters. The tFAW
//! enforcer, the row selector and the ALERT/RFM machinery all work on the
//! same table, passed by reference.

use serde::Serialize;

/// State of one tracked DRAM row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RowState {
    /// PRAC counter compared against the ALERT threshold. Reset by RFMs.
    pub counter: u64,
    /// ACTIVATEs to this row over the whole run (never reset)
    pub activations: u64,
    /// ALERTs attributed to this row
    pub alerts: u64,
    /// Stall time attributed to this row's ALERTs
    pub alert_time_s: f64,
    /// RFMs that targeted this row, proactive and reactive
    pub rfms: u64,
    /// `false` once the row was retired by an RFM (feinting and mixed workloads)
    pub active: bool,
}

/// Table of all tracked rows, indexed by row id.
#[derive(Debug, Clone)]
pub struct RowTable {
    rows: Vec<RowState>,
    active: usize,
}

impl RowTable {
    /// Creates `n` fresh rows, all active.
    pub fn new(n: usize) -> Self {
        Self {
            rows: vec![
                RowState {
                    active: true,
                    ..Default::default()
                };
                n
            ],
            active: n,
        }
    }

    /// Number of tracked rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table tracks no rows at all.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the state of `row`.
    pub fn get(&self, row: usize) -> &RowState {
        &self.rows[row]
    }

    /// Iterates over all rows in index order.
    pub fn iter(&self) -> impl Iterator<Item = &RowState> {
        self.rows.iter()
    }

    /// Whether `row` can still be activated.
    pub fn is_active(&self, row: usize) -> bool {
        self.rows[row].active
    }

    /// Number of rows that can still be activated.
    pub fn active_count(&self) -> usize {
        self.active
    }

    /// Ids of the rows that can still be activated, ascending.
    pub fn active_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.active)
            .map(|(i, _)| i)
    }

    /// Counts an ACTIVATE to `row` and returns its new counter value.
    pub(crate) fn activate(&mut self, row: usize) -> u64 {
        let r = &mut self.rows[row];
        r.counter += 1;
        r.activations += 1;
        r.counter
    }

    /// Attributes one ALERT of `consumed_s` stall time to `row`.
    pub(crate) fn record_alert(&mut self, row: usize, consumed_s: f64) {
        let r = &mut self.rows[row];
        r.alerts += 1;
        r.alert_time_s += consumed_s;
    }

    pub(crate) fn set_counter(&mut self, row: usize, value: u64) {
        self.rows[row].counter = value;
    }

    pub(crate) fn count_rfm(&mut self, row: usize) {
        self.rows[row].rfms += 1;
    }

    /// Permanently removes `row` from the active set.
    pub(crate) fn retire(&mut self, row: usize) {
        let r = &mut self.rows[row];
        if r.active {
            r.active = false;
            self.active -= 1;
        }
    }

    /// Sum of per-row ACTIVATEs.
    pub fn total_activations(&self) -> u64 {
        self.rows.iter().map(|r| r.activations).sum()
    }

    /// Sum of per-row ALERTs.
    pub fn total_alerts(&self) -> u64 {
        self.rows.iter().map(|r| r.alerts).sum()
    }

    /// Sum of per-row ALERT stall time.
    pub fn total_alert_time_s(&self) -> f64 {
        self.rows.iter().map(|r| r.alert_time_s).sum()
    }

    /// Sum of per-row RFMs.
    pub fn total_rfms(&self) -> u64 {
        self.rows.iter().map(|r| r.rfms).sum()
    }
}
