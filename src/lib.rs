//! # PRAC
//!
//! Discrete-event simulator for DRAM row activations under Per-Row Activation
//! Counting (PRAC). It measures how much of a refresh window an attacker can
//! occupy with GLOBAL ALERT stalls and how Refresh Management (RFM) schedules
//! change that exposure.
//!
//! The engine lives in [`prac_core`] and is re-exported here. The `prac-sim`
//! binary in `prac-bin` wraps it with a CLI, DRAM-type configuration files and
//! text/CSV reports.

pub use prac_core::*;
