//! Command line of the `prac-sim` binary.
//!
//! `report` takes DRAM protocol parameters from a configuration file,
//! `explore` takes every parameter from flags.

use crate::dram_config::{DramConfig, DramConfigError};
use crate::report::TimeStrings;
use clap::{Args, Parser, Subcommand};
use prac_core::util::{DEFAULT_TFAW, TimeParseError, parse_time};
use prac_core::{ConfigError, SimulationConfig, TimingModel, Workload};
use serde::Serialize;
use thiserror::Error;

/// Simulate DRAM ACTIVATEs with GLOBAL ALERT stalls due to PRAC.
#[derive(Debug, Parser, Serialize, Clone)]
#[clap(name = "prac-sim", version)]
pub struct CliArgs {
    #[clap(subcommand)]
    pub mode: Mode,
}

/// Simulation mode.
#[derive(Debug, Subcommand, Serialize, Clone)]
pub enum Mode {
    /// DRAM protocol parameters from a configuration file.
    Report(ReportArgs),
    /// All parameters via command-line flags.
    Explore(ExploreArgs),
}

/// Flags shared by both modes.
#[derive(Debug, Args, Serialize, Clone)]
pub struct CommonArgs {
    /// Number of rows to operate on.
    #[clap(long = "rows")]
    pub rows: usize,
    /// Counter threshold; ALERT raised when counter strictly exceeds this value.
    #[clap(long = "threshold")]
    pub threshold: u64,
    /// Proactive RFM window start (e.g. '32us'). '0' disables proactive RFMs.
    #[clap(long = "rfmfreqmin", default_value = "0")]
    pub rfmfreqmin: String,
    /// Proactive RFM window end. Must be >= rfmfreqmin and < 2×rfmfreqmin.
    #[clap(long = "rfmfreqmax", default_value = "0")]
    pub rfmfreqmax: String,
    /// RFMs reset counters to a random value in 0..=randreset.
    #[clap(long = "randreset", default_value = "0")]
    pub randreset: u64,
    /// Seed for the random number generator.
    #[clap(long = "seed", default_value = "0")]
    pub seed: u64,
    /// Row selection: round-robin, feinting or mixed:<pct>.
    #[clap(long = "workload", default_value = "round-robin")]
    pub workload: Workload,
    /// Print one CSV line instead of the summary.
    #[clap(long = "csv")]
    pub csv: bool,
    /// Print the CSV header before the CSV line.
    #[clap(long = "header")]
    pub header: bool,
    /// Output file for the run record (JSON format).
    #[clap(long = "output")]
    pub output: Option<String>,
    /// Show a progress bar over simulated time.
    #[clap(long = "progress")]
    pub progress: bool,
}

/// Flags of `prac-sim report`.
#[derive(Debug, Args, Serialize, Clone)]
pub struct ReportArgs {
    /// DRAM type, e.g. 'ddr5'. Loads `<config-dir>/<dram-type>.json`.
    #[clap(long = "dram-type")]
    pub dram_type: String,
    /// Directory holding the DRAM configuration files.
    #[clap(long = "config-dir", default_value = "config")]
    pub config_dir: String,
    #[clap(flatten)]
    pub common: CommonArgs,
}

/// Flags of `prac-sim explore`.
#[derive(Debug, Args, Serialize, Clone)]
pub struct ExploreArgs {
    /// tRC per ACTIVATE (e.g. '45ns', '3us', '0.001s').
    #[clap(long = "trc")]
    pub trc: String,
    /// tFAW window for four ACTIVATEs.
    #[clap(long = "tfaw", default_value = "20ns")]
    pub tfaw: String,
    /// RFMs per ALERT; alert duration = rfmabo × trfcrfm.
    #[clap(long = "rfmabo")]
    pub rfmabo: u64,
    /// ACTIVATEs issued after an ALERT but before the reactive RFMs.
    #[clap(long = "isoc", default_value = "0")]
    pub isoc: u64,
    /// ACTIVATEs between two consecutive ALERTs (0 to 3).
    #[clap(long = "abo-delay", alias = "abo_delay", default_value = "0")]
    pub abo_delay: u8,
    /// Total simulated runtime.
    #[clap(long = "runtime", default_value = "128ms")]
    pub runtime: String,
    /// Time consumed by one RFM. '0' for none.
    #[clap(long = "trfcrfm", default_value = "0")]
    pub trfcrfm: String,
    #[clap(flatten)]
    pub common: CommonArgs,
}

/// Configuration errors detected before the simulation starts.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    DramConfig(#[from] DramConfigError),
    #[error("--{field}: {source}")]
    Time {
        field: &'static str,
        source: TimeParseError,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A validated run configuration together with the time strings it came from.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub config: SimulationConfig,
    pub times: TimeStrings,
}

fn time(field: &'static str, s: &str) -> Result<f64, CliError> {
    parse_time(s).map_err(|source| CliError::Time { field, source })
}

impl CliArgs {
    /// Flags shared by both modes.
    pub fn common(&self) -> &CommonArgs {
        match &self.mode {
            Mode::Report(args) => &args.common,
            Mode::Explore(args) => &args.common,
        }
    }

    /// Loads the DRAM configuration if needed, parses all times and
    /// validates the resulting simulation configuration.
    pub fn resolve(&self) -> Result<Resolved, CliError> {
        let common = self.common();
        let (times, rfmabo, isoc, abo_delay) = match &self.mode {
            Mode::Report(args) => {
                let dram = DramConfig::for_dram_type(&args.config_dir, &args.dram_type)?;
                let times = TimeStrings {
                    trc: dram.trc,
                    tfaw: Some(dram.tfaw),
                    rfmfreqmin: common.rfmfreqmin.clone(),
                    rfmfreqmax: common.rfmfreqmax.clone(),
                    trfcrfm: dram.trfcrfm,
                    runtime: dram.refw,
                };
                (times, dram.rfmabo, dram.isoc, dram.abo_delay)
            }
            Mode::Explore(args) => {
                let times = TimeStrings {
                    trc: args.trc.clone(),
                    tfaw: Some(args.tfaw.clone()),
                    rfmfreqmin: common.rfmfreqmin.clone(),
                    rfmfreqmax: common.rfmfreqmax.clone(),
                    trfcrfm: args.trfcrfm.clone(),
                    runtime: args.runtime.clone(),
                };
                (times, args.rfmabo, args.isoc, args.abo_delay)
            }
        };

        let tfaw_s = time("tfaw", times.tfaw.as_deref().unwrap_or(DEFAULT_TFAW))?;
        let config = SimulationConfig {
            rows: common.rows,
            trc_s: time("trc", &times.trc)?,
            timing: TimingModel::Tfaw { tfaw_s },
            threshold: common.threshold,
            rfmabo,
            trfcrfm_s: time("trfcrfm", &times.trfcrfm)?,
            runtime_s: time("runtime", &times.runtime)?,
            rfm_freq_min_s: time("rfmfreqmin", &times.rfmfreqmin)?,
            rfm_freq_max_s: time("rfmfreqmax", &times.rfmfreqmax)?,
            isoc,
            randreset: common.randreset,
            abo_delay,
            workload: common.workload,
        };
        config.validate()?;
        Ok(Resolved { config, times })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../config");

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("prac-sim").chain(args.iter().copied()))
            .expect("valid command line")
    }

    #[test]
    fn explore_defaults() {
        let args = parse(&[
            "explore", "--rows", "4", "--trc", "45ns", "--threshold", "10", "--rfmabo", "2",
        ]);
        let resolved = args.resolve().expect("valid config");
        let config = resolved.config;
        assert_eq!(config.rows, 4);
        assert_eq!(config.trc_s, 45.0 * 1e-9);
        assert_eq!(config.timing, TimingModel::Tfaw { tfaw_s: 20.0 * 1e-9 });
        assert_eq!(config.runtime_s, 128e-3);
        assert_eq!(config.trfcrfm_s, 0.0);
        assert!(!config.rfm_enabled());
        assert_eq!(config.workload, Workload::RoundRobin);
        assert_eq!(resolved.times.runtime, "128ms");
        assert_eq!(args.common().seed, 0);
    }

    #[test]
    fn report_reads_dram_type() {
        let args = parse(&[
            "report",
            "--dram-type",
            "ddr6",
            "--config-dir",
            CONFIG_DIR,
            "--rows",
            "1",
            "--threshold",
            "32",
            "--workload",
            "mixed:50",
        ]);
        let resolved = args.resolve().expect("valid config");
        assert_eq!(resolved.config.trc_s, 63.0 * 1e-9);
        assert_eq!(resolved.config.rfmabo, 4);
        assert_eq!(resolved.config.runtime_s, 32e-3);
        assert_eq!(resolved.config.workload, Workload::Mixed { pct: 50 });
        assert_eq!(resolved.times.tfaw.as_deref(), Some("20ns"));
    }

    #[test]
    fn unknown_dram_type_is_a_config_error() {
        let args = parse(&[
            "report", "--dram-type", "ddr9", "--config-dir", CONFIG_DIR, "--rows", "1",
            "--threshold", "1",
        ]);
        assert!(matches!(
            args.resolve(),
            Err(CliError::DramConfig(DramConfigError::NotFound(_)))
        ));
    }

    #[test]
    fn malformed_time() {
        let args = parse(&[
            "explore", "--rows", "1", "--trc", "45xs", "--threshold", "1", "--rfmabo", "1",
        ]);
        let err = args.resolve().unwrap_err();
        assert!(matches!(err, CliError::Time { field: "trc", .. }));
    }

    #[test]
    fn out_of_range_values() {
        let args = parse(&[
            "explore", "--rows", "1", "--trc", "45ns", "--threshold", "1", "--rfmabo", "1",
            "--abo_delay", "4",
        ]);
        assert!(matches!(
            args.resolve(),
            Err(CliError::Config(ConfigError::AboDelayOutOfRange(4)))
        ));

        let args = parse(&[
            "explore", "--rows", "1", "--trc", "45ns", "--threshold", "1", "--rfmabo", "1",
            "--rfmfreqmin", "32us", "--rfmfreqmax", "64us",
        ]);
        assert!(matches!(
            args.resolve(),
            Err(CliError::Config(ConfigError::RfmWindowTooWide { .. }))
        ));
    }

    #[test]
    fn bad_workload_is_rejected_by_parser() {
        let args = CliArgs::try_parse_from([
            "prac-sim", "explore", "--rows", "1", "--trc", "45ns", "--threshold", "1",
            "--rfmabo", "1", "--workload", "zigzag",
        ]);
        assert!(args.is_err());
    }
}
