//! # PRAC simulator
//!
//! Command-line front end of `prac-core`. It loads DRAM protocol parameters,
//! runs one simulation and prints either a human-readable summary or a single
//! CSV line suited for parameter sweeps.
//!
//! ```sh
//! cargo run --release --bin=prac-sim -- report --dram-type ddr5 --rows 1 --threshold 32
//! cargo run --release --bin=prac-sim -- explore --rows 4 --trc 45ns --threshold 32 \
//!     --rfmabo 4 --trfcrfm 410ns --runtime 32ms --csv
//! ```
//!
//! ## Modules
//!
//! - `cli`: Command line flags and their resolution into a `SimulationConfig`.
//! - `dram_config`: DRAM-type JSON configuration files in `config/`.
//! - `report`: Summary and CSV rendering.
pub mod cli;
pub mod dram_config;
pub mod report;

use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;

/// Initialises `env_logger` behind a progress-bar aware log bridge.
///
/// The default filter is `warn`; set `RUST_LOG` for more detail.
pub fn init_logging_with_progress() -> anyhow::Result<MultiProgress> {
    let logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).build();
    let progress = MultiProgress::new();
    LogWrapper::new(progress.clone(), logger).try_init()?;
    Ok(progress)
}
