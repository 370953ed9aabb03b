//! tFAW rolling-window enforcement.
//!
//! No more than [`TFAW_ACTIVATES`] ACTIVATEs may start within any tFAW
//! interval. Before each ACTIVATE the enforcer drops timestamps older than
//! tFAW; if the window is still full, time jumps to the moment the oldest
//! entry leaves it.

use crate::util::TFAW_ACTIVATES;
use std::collections::VecDeque;

/// Rolling window of the most recent ACTIVATE start times.
#[derive(Debug, Clone)]
pub struct TfawWindow {
    tfaw_s: f64,
    timestamps: VecDeque<f64>,
}

impl TfawWindow {
    /// Creates an empty window of width `tfaw_s`.
    pub fn new(tfaw_s: f64) -> Self {
        Self {
            tfaw_s,
            timestamps: VecDeque::with_capacity(TFAW_ACTIVATES),
        }
    }

    /// Width of the window in seconds.
    pub fn tfaw_s(&self) -> f64 {
        self.tfaw_s
    }

    /// Number of ACTIVATEs currently inside the window.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether the window holds no ACTIVATE.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    fn prune(&mut self, now: f64) {
        while self
            .timestamps
            .front()
            .is_some_and(|&t| now - t >= self.tfaw_s)
        {
            self.timestamps.pop_front();
        }
    }

    /// Returns the earliest time not before `now` at which an ACTIVATE may start.
    pub fn earliest_activate(&mut self, now: f64) -> f64 {
        self.prune(now);
        match self.timestamps.front() {
            Some(&oldest) if self.timestamps.len() >= TFAW_ACTIVATES => {
                let forced = oldest + self.tfaw_s;
                self.prune(forced);
                forced
            }
            _ => now,
        }
    }

    /// Records an ACTIVATE that starts at `t`, evicting the oldest entry when full.
    pub fn record(&mut self, t: f64) {
        if self.timestamps.len() >= TFAW_ACTIVATES {
            self.timestamps.pop_front();
        }
        self.timestamps.push_back(t);
    }
}
