//! DRAM-type protocol parameters loaded from JSON files.
//!
//! A DRAM type `ddr5` is described by `<config-dir>/ddr5.json`, for example
//!
//! ```json
//! { "trc": "45ns", "tfaw": "20ns", "rfmabo": 4, "trfcrfm": "410ns", "refw": "32ms" }
//! ```

use prac_core::util::DEFAULT_TFAW;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading a DRAM configuration.
#[derive(Debug, Error)]
pub enum DramConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error(transparent)]
    IoError(#[from] io::Error),
    #[error("Invalid configuration {}: {source}", path.display())]
    JsonError {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Result type for [`DramConfig`] constructors.
pub type Result<T> = std::result::Result<T, DramConfigError>;

fn default_tfaw() -> String {
    DEFAULT_TFAW.to_string()
}

/// Protocol parameters of one DRAM type. Times are unparsed strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DramConfig {
    /// tRC between two ACTIVATEs
    pub trc: String,
    /// tFAW rolling window
    #[serde(default = "default_tfaw")]
    pub tfaw: String,
    /// RFMs per ALERT
    pub rfmabo: u64,
    /// tRFC of one RFM
    pub trfcrfm: String,
    /// Refresh window, used as the simulated runtime
    pub refw: String,
    #[serde(default)]
    pub isoc: u64,
    #[serde(default)]
    pub abo_delay: u8,
}

impl DramConfig {
    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist, cannot be read, or lacks
    /// one of the required fields `trc`, `rfmabo`, `trfcrfm` and `refw`.
    pub fn from_jsonfile(filepath: impl AsRef<Path>) -> Result<DramConfig> {
        let path = filepath.as_ref();
        let mut file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => DramConfigError::NotFound(path.to_path_buf()),
            _ => DramConfigError::IoError(e),
        })?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        serde_json::from_str(&contents).map_err(|source| DramConfigError::JsonError {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `<dir>/<dram_type>.json`.
    pub fn for_dram_type(dir: impl AsRef<Path>, dram_type: &str) -> Result<DramConfig> {
        Self::from_jsonfile(dir.as_ref().join(format!("{}.json", dram_type)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../config");

    #[test]
    fn loads_shipped_configs() {
        let ddr5 = DramConfig::for_dram_type(CONFIG_DIR, "ddr5").expect("ddr5 config");
        assert_eq!(ddr5.trc, "45ns");
        assert_eq!(ddr5.tfaw, "20ns");
        assert_eq!(ddr5.rfmabo, 4);
        assert_eq!(ddr5.trfcrfm, "410ns");
        assert_eq!(ddr5.refw, "32ms");

        for dram_type in ["ddr5_bg", "ddr6", "ddr6_bg"] {
            let config = DramConfig::for_dram_type(CONFIG_DIR, dram_type).expect("config");
            assert_eq!(config.tfaw, DEFAULT_TFAW);
            assert_eq!(config.isoc, 0);
            assert_eq!(config.abo_delay, 0);
        }
    }

    #[test]
    fn unknown_dram_type() {
        let err = DramConfig::for_dram_type(CONFIG_DIR, "ddr9").unwrap_err();
        assert!(matches!(err, DramConfigError::NotFound(_)));
        assert!(err.to_string().contains("ddr9.json"));
    }

    #[test]
    fn missing_required_field() {
        let err = serde_json::from_str::<DramConfig>(r#"{"trc": "45ns", "rfmabo": 4, "refw": "32ms"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("trfcrfm"));
    }
}
