/// Maximum number of ACTIVATEs inside one rolling tFAW window
pub const TFAW_ACTIVATES: usize = 4;

/// Rows per bank addressed by the random accesses of the mixed workload (128K)
pub const BANK_ROWS: usize = 1 << 17;

/// Upper bound for the ABO delay (ACTIVATEs between two ALERTs)
pub const MAX_ABO_DELAY: u8 = 3;

/// Absolute tolerance in seconds when comparing simulated timestamps
pub const TIME_EPSILON_S: f64 = 1e-12;

/// tFAW used when a configuration does not specify one
pub const DEFAULT_TFAW: &str = "20ns";

/// Number of driving-loop iterations between two progress bar updates
pub const PROGRESS_INTERVAL: u64 = 1 << 16;
