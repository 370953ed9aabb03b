//! Utility functions and types used throughout the simulator.
//!
//! This module provides:
//! - Constants for DRAM timing and workload geometry ([`TFAW_ACTIVATES`], [`BANK_ROWS`], etc.)
//! - Time-string parsing and formatting ([`parse_time`], [`human_time`])
//! - Progress reporting utilities ([`NamedProgress`])
//! - Random number generation ([`Rng`])

mod constants;
mod named_progress;
mod rng;
mod time;

pub use self::constants::*;
pub use self::named_progress::NamedProgress;
pub use self::rng::Rng;
pub use self::time::{TimeParseError, human_time, parse_time, time_eq};
