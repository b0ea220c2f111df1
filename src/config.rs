//! Configuration for the roadmap CLI.
//!
//! Settings live in `config.toml` inside the data directory (`~/.roadmap` by
//! default). A missing file means defaults; a malformed one is an error.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::fields::OutputFormat;

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the database, config and reports.
    pub data_dir: PathBuf,

    /// Database file name, relative to `data_dir` unless absolute.
    pub db_file: PathBuf,

    /// Where rendered reports are written. Defaults to `<data_dir>/reports`.
    pub reports_dir: Option<PathBuf>,

    /// Week labels offered when none is given.
    pub weeks: Vec<String>,

    pub default_format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: default_data_dir(),
            db_file: PathBuf::from("roadmap.json"),
            reports_dir: None,
            weeks: vec![
                "Week 40 - 2025".to_string(),
                "Week 41 - 2025".to_string(),
                "Week 42 - 2025".to_string(),
            ],
            default_format: OutputFormat::Text,
        }
    }
}

/// `~/.roadmap`, or `./.roadmap` when no home directory is known.
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".roadmap")
}

impl Config {
    /// Load `<default data dir>/config.toml`.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from_file(&default_data_dir().join(CONFIG_FILE))
    }

    /// Load from an explicit path. A missing file yields defaults.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file)
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.reports_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("reports"))
    }
}
