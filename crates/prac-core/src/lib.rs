//! # PRAC Core
//!
//! `prac-core` is a discrete-event simulator for DRAM Per-Row Activation
//! Counting (PRAC). It models how an attacker's ACTIVATE stream drives row
//! counters past the ALERT threshold and how much time the resulting GLOBAL
//! STALLs take away from the memory controller.
//!
//! ## Main Components
//!
//! - [`Simulator`] - Owns one run's state and drives ACTIVATEs until the
//!   runtime is used up. Built from a [`SimulationConfig`] with
//!   [`Simulator::builder()`].
//!
//! - [`Workload`] - Row selection policy: round-robin, feinting or a
//!   mix of feinting and random untracked rows.
//!
//! - [`rfm`] module - RFM target ranking and the proactive RFM window
//!   scheduler ([`rfm::RfmSchedule`]).
//!
//! - [`tfaw`] module - Rolling four-activate window ([`tfaw::TfawWindow`]).
//!
//! - [`rows`] module - Per-row counters and statistics ([`rows::RowTable`]).
//!
//! - [`metrics`] module - ALERT adjacency statistics and final counters
//!   ([`RunMetrics`]).
//!
//! - [`util`] module - Time-string parsing, the seeded [`util::Rng`] and
//!   progress bar styling.
//!
//! ## Determinism
//!
//! A run draws all randomness from one seeded [`util::Rng`] in a fixed call
//! order: RFM window arming, counter resets after RFMs, then mixed-workload
//! row draws. The same configuration and seed always reproduce the same run.

#![warn(missing_docs)]

mod alert;
pub mod config;
pub mod metrics;
pub mod rfm;
pub mod rows;
mod simulator;
pub mod tfaw;
pub mod util;
pub mod workload;

pub use config::{ConfigError, SimulationConfig, TimingModel};
pub use metrics::RunMetrics;
pub use simulator::{AlertRecord, Error, Simulator, SimulatorBuilder};
pub use workload::{Workload, WorkloadParseError};
