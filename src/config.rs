use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::dashboard::preview::MAX_PREVIEW_ROWS;
use crate::data::loader::SourceLocation;
use crate::data::model::DatasetKind;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV_VAR: &str = "FOOD_DASHBOARD_CONFIG";

/// Configuration file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "food_dashboard.json";

/// Where the datasets live and how much of them to show.
///
/// ```json
/// {
///   "data_dir": "data",
///   "sources": { "receivers": "https://example.org/receivers_data.csv" },
///   "preview_rows": 5,
///   "top_n": 10
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Base directory for relative source paths.
    pub data_dir: PathBuf,
    /// Per-dataset override: a path relative to `data_dir`, or an http(s) URL.
    pub sources: BTreeMap<DatasetKind, String>,
    /// Rows shown in each raw-data preview, capped at [`MAX_PREVIEW_ROWS`].
    pub preview_rows: usize,
    /// Length of the ranked ("top N") charts.
    pub top_n: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            sources: BTreeMap::new(),
            preview_rows: 5,
            top_n: 10,
        }
    }
}

impl DashboardConfig {
    /// Resolve the configuration for this process.
    ///
    /// `$FOOD_DASHBOARD_CONFIG` wins and must point at a readable file;
    /// otherwise `food_dashboard.json` is used if it exists, else defaults.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::from_path(Path::new(&path))
                .with_context(|| format!("loading config named by ${CONFIG_ENV_VAR}"));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::from_path(local);
        }
        log::info!("No {DEFAULT_CONFIG_FILE} found, using defaults");
        Ok(Self::default())
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: DashboardConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        log::info!("Loaded config from {}: {config:?}", path.display());
        Ok(config)
    }

    /// Location of `kind`: the configured override, else `<data_dir>/<name>_data.csv`.
    pub fn source_for(&self, kind: DatasetKind) -> SourceLocation {
        match self.sources.get(&kind) {
            Some(raw) => SourceLocation::parse(&self.data_dir, raw),
            None => SourceLocation::File(self.data_dir.join(kind.default_file_name())),
        }
    }

    pub fn preview_rows(&self) -> usize {
        self.preview_rows.min(MAX_PREVIEW_ROWS)
    }
}
