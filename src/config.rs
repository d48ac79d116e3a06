//! Run configuration.
//!
//! Read from `movie_insights.json` in the working directory when that file
//! exists; every field is optional and falls back to its default.

use crate::charts::ChartStyle;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE: &str = "movie_insights.json";
pub const DEFAULT_INPUT: &str = "datatypes/data_science/top_1000_popular_movies_tmdb.csv";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub input_path: PathBuf,
    /// Where to write chart PNGs; charts stay in memory when unset.
    pub output_dir: Option<PathBuf>,
    /// Open each saved chart in the system viewer.
    pub open_charts: bool,
    pub style: ChartStyle,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT),
            output_dir: None,
            open_charts: false,
            style: ChartStyle::default(),
        }
    }
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Config from `dir/movie_insights.json`, or defaults when absent.
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::discover(dir.path()).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.input_path, PathBuf::from(DEFAULT_INPUT));
    }

    #[test]
    fn test_discover_reads_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{"input_path": "movies.csv", "output_dir": "charts", "style": {"width": 640}}"#,
        )
        .unwrap();
        let config = AppConfig::discover(dir.path()).unwrap();
        assert_eq!(config.input_path, PathBuf::from("movies.csv"));
        assert_eq!(config.output_dir, Some(PathBuf::from("charts")));
        assert!(!config.open_charts);
        assert_eq!(config.style.width, 640);
        assert_eq!(config.style.height, 600);
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{ not json").unwrap();
        assert!(matches!(
            AppConfig::discover(dir.path()),
            Err(ConfigError::Json { .. })
        ));
    }
}
