//! Run configuration.
//!
//! Read from the TOML file named by `KTX_CONFIG` (default `ktx.toml`). A
//! missing file means defaults; every field is optional.
//!
//! ```toml
//! data_path = "data/ktx.csv.gz"
//! output_dir = "views"
//! stations = ["서울", "부산"]
//! date_from = "2023-01-01"
//! date_to = "2023-12-01"
//! top_n = 5
//! negative_counts = "warn"   # accept | warn | reject
//! encodings = ["euc-kr", "cp949", "utf-8"]
//! ```
//!
//! Dates are quoted strings.

use chrono::NaiveDate;
use ktx_chart::DEFAULT_PREFERRED_STATIONS;
use ktx_core::{KtxError, NegativeCountPolicy, Result};
use ktx_data::views::DEFAULT_TOP_N;
use ktx_source::encoding;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "KTX_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "ktx.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Ridership file; plain or gzip-compressed.
    pub data_path: PathBuf,
    /// Directory receiving one JSON document per view.
    pub output_dir: PathBuf,
    /// Stations selected by default when present in the data.
    pub preferred_stations: Vec<String>,
    /// Explicit selection replacing the preferred default.
    pub stations: Option<Vec<String>>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub top_n: usize,
    pub negative_counts: NegativeCountPolicy,
    /// Candidate text encodings, tried in order.
    pub encodings: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("ktx.csv"),
            output_dir: PathBuf::from("views"),
            preferred_stations: DEFAULT_PREFERRED_STATIONS.iter().map(|s| s.to_string()).collect(),
            stations: None,
            date_from: None,
            date_to: None,
            top_n: DEFAULT_TOP_N,
            negative_counts: NegativeCountPolicy::default(),
            encodings: encoding::default_labels(),
        }
    }
}

impl Config {
    /// Load from the path in `KTX_CONFIG`, or `ktx.toml`.
    pub fn from_env() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load(&path)
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("[KTX] config: {} not found, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(KtxError::Config(format!("{}: {}", path.display(), e))),
        };
        let config = Self::parse(&text)
            .map_err(|e| KtxError::Config(format!("{}: {}", path.display(), e)))?;
        log::info!("[KTX] config: loaded {}", path.display());
        Ok(config)
    }

    /// Parse and check a TOML document.
    pub fn parse(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text).map_err(|e| KtxError::Config(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    /// Reject settings no run could succeed with.
    ///
    /// An inverted date pair is left for the filter stage to report.
    pub fn check(&self) -> Result<()> {
        if self.top_n == 0 {
            return Err(KtxError::Config("top_n must be at least 1".to_string()));
        }
        if self.encodings.is_empty() {
            return Err(KtxError::Config("encodings must not be empty".to_string()));
        }
        encoding::resolve_labels(&self.encodings)?;
        Ok(())
    }
}
