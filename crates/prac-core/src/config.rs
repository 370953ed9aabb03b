//! Simulation parameters.
//!
//! A [`SimulationConfig`] is built once per run and never changes afterwards.
//! [`SimulationConfig::validate`] checks every numeric invariant; the
//! simulator builder runs it again and refuses to construct an engine from an
//! invalid configuration.

use crate::util::MAX_ABO_DELAY;
use crate::workload::Workload;
use serde::Serialize;
use thiserror::Error;

/// Which ACTIVATE timing rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum TimingModel {
    /// Only tRC spaces ACTIVATEs. No tFAW window and no ABO delay.
    Legacy,
    /// tRC plus the rolling four-activate window.
    Tfaw {
        /// tFAW window width in seconds
        tfaw_s: f64,
    },
}

impl TimingModel {
    /// The tFAW width, if enforced.
    pub fn tfaw_s(&self) -> Option<f64> {
        match self {
            TimingModel::Legacy => None,
            TimingModel::Tfaw { tfaw_s } => Some(*tfaw_s),
        }
    }
}

/// Parameters of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationConfig {
    /// Number of tracked rows
    pub rows: usize,
    /// Time consumed by one ACTIVATE (tRC)
    pub trc_s: f64,
    /// ACTIVATE timing rules
    pub timing: TimingModel,
    /// An ALERT is raised once a row counter strictly exceeds this value
    pub threshold: u64,
    /// RFMs issued in response to one ALERT
    pub rfmabo: u64,
    /// Time consumed by one RFM (tRFC-RFM)
    pub trfcrfm_s: f64,
    /// Total simulated time
    pub runtime_s: f64,
    /// Proactive RFM window start (0 disables proactive RFMs)
    pub rfm_freq_min_s: f64,
    /// Proactive RFM window end (0 disables proactive RFMs)
    pub rfm_freq_max_s: f64,
    /// ACTIVATEs issued after the ALERT trigger but before the stall
    pub isoc: u64,
    /// RFMs reset counters uniformly into `[0, randreset]`
    pub randreset: u64,
    /// ACTIVATEs issued after the reactive RFMs before another ALERT may fire
    pub abo_delay: u8,
    /// Row selection policy
    pub workload: Workload,
}

impl Default for SimulationConfig {
    /// DDR5 single-bank timings over one 32 ms refresh window.
    fn default() -> Self {
        Self {
            rows: 1,
            trc_s: 45e-9,
            timing: TimingModel::Tfaw { tfaw_s: 20e-9 },
            threshold: 128,
            rfmabo: 4,
            trfcrfm_s: 410e-9,
            runtime_s: 32e-3,
            rfm_freq_min_s: 0.0,
            rfm_freq_max_s: 0.0,
            isoc: 0,
            randreset: 0,
            abo_delay: 0,
            workload: Workload::RoundRobin,
        }
    }
}

/// Violations of the configuration invariants.
#[derive(Debug, Error, PartialEq)]
#[allow(missing_docs)]
pub enum ConfigError {
    #[error("rows must be > 0")]
    NoRows,
    #[error("{name} must be > 0, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("{name} must be >= 0, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("RFM frequency max ({max}) must be >= RFM frequency min ({min})")]
    RfmWindowReversed { min: f64, max: f64 },
    #[error("RFM frequency max ({max}) must be < 2 × RFM frequency min ({min})")]
    RfmWindowTooWide { min: f64, max: f64 },
    #[error("randreset ({randreset}) must be <= threshold ({threshold})")]
    RandResetAboveThreshold { randreset: u64, threshold: u64 },
    #[error("abo_delay must be between 0 and 3, got {0}")]
    AboDelayOutOfRange(u8),
    #[error("abo_delay requires the tFAW timing model, got {0}")]
    AboDelayWithoutTfaw(u8),
    #[error("mixed workload percentage must be <= 100, got {0}")]
    MixedPercentage(u8),
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}

impl SimulationConfig {
    /// Checks every invariant of the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 {
            return Err(ConfigError::NoRows);
        }
        positive("tRC", self.trc_s)?;
        if let TimingModel::Tfaw { tfaw_s } = self.timing {
            positive("tFAW", tfaw_s)?;
        }
        positive("runtime", self.runtime_s)?;
        non_negative("RFM frequency min", self.rfm_freq_min_s)?;
        non_negative("RFM frequency max", self.rfm_freq_max_s)?;
        let (min, max) = (self.rfm_freq_min_s, self.rfm_freq_max_s);
        if min > 0.0 && max > 0.0 {
            if max < min {
                return Err(ConfigError::RfmWindowReversed { min, max });
            }
            if max >= 2.0 * min {
                return Err(ConfigError::RfmWindowTooWide { min, max });
            }
        }
        non_negative("tRFC RFM", self.trfcrfm_s)?;
        match self.timing {
            TimingModel::Tfaw { .. } => {
                if self.randreset > self.threshold {
                    return Err(ConfigError::RandResetAboveThreshold {
                        randreset: self.randreset,
                        threshold: self.threshold,
                    });
                }
                if self.abo_delay > MAX_ABO_DELAY {
                    return Err(ConfigError::AboDelayOutOfRange(self.abo_delay));
                }
            }
            TimingModel::Legacy => {
                if self.abo_delay != 0 {
                    return Err(ConfigError::AboDelayWithoutTfaw(self.abo_delay));
                }
            }
        }
        match self.workload {
            Workload::Mixed { pct } if pct > 100 => Err(ConfigError::MixedPercentage(pct)),
            _ => Ok(()),
        }
    }

    /// Stall time of one ALERT: `rfmabo × tRFC-RFM`.
    pub fn alert_duration_s(&self) -> f64 {
        self.rfmabo as f64 * self.trfcrfm_s
    }

    /// Whether proactive RFMs are scheduled.
    pub fn rfm_enabled(&self) -> bool {
        self.rfm_freq_min_s > 0.0 && self.rfm_freq_max_s > 0.0
    }

    /// ACTIVATEs that separate two back-to-back ALERTs.
    pub fn activates_between_alerts(&self) -> u64 {
        match self.timing {
            TimingModel::Legacy => self.isoc,
            TimingModel::Tfaw { .. } => self.isoc + self.abo_delay as u64,
        }
    }

    /// Gap between the end of one ALERT and the start of the next for the two
    /// to count as back-to-back.
    pub fn back_to_back_gap_s(&self) -> f64 {
        self.activates_between_alerts() as f64 * self.trc_s
    }
}
