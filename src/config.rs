use crate::error::{AtlasError, Result};
use log::LevelFilter;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "atlas.toml";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    /// Event poll interval of the UI loop.
    pub tick_ms: u64,
    /// Quiet period after the last filter change before data is requested.
    pub debounce_ms: u64,
    /// Frame interval of the year scrubber.
    pub playback_ms: u64,
    pub log_file: PathBuf,
    pub log_level: String,
    pub start_route: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            tick_ms: 100,
            debounce_ms: 250,
            playback_ms: 900,
            log_file: PathBuf::from("jeju-agri-atlas.log"),
            log_level: "info".into(),
            start_route: "/".into(),
        }
    }
}

impl Config {
    /// Reads `path`, or `atlas.toml` in the working directory when no path is
    /// given. A missing default file yields the defaults; a missing explicit
    /// file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        if !path.exists() {
            if explicit {
                return Err(AtlasError::Config(format!("{} does not exist", path.display())));
            }
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.level_filter()?;
        Ok(config)
    }

    pub fn level_filter(&self) -> Result<LevelFilter> {
        self.log_level
            .parse()
            .map_err(|_| AtlasError::Config(format!("unknown log level: {}", self.log_level)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn partial_file_overrides_named_keys() {
        let c = Config::from_toml("data_dir = \"/srv/atlas\"\ndebounce_ms = 50\n").unwrap();
        assert_eq!(c.data_dir, PathBuf::from("/srv/atlas"));
        assert_eq!(c.debounce_ms, 50);
        assert_eq!(c.tick_ms, 100);
    }

    #[test]
    fn bad_level_is_rejected() {
        let err = Config::from_toml("log_level = \"loud\"").unwrap_err();
        assert!(err.to_string().contains("loud"));
        assert_eq!(Config::default().level_filter().unwrap(), LevelFilter::Info);
    }

    #[test]
    fn missing_explicit_file_errors() {
        assert!(Config::load(Some(Path::new("/nonexistent/atlas.toml"))).is_err());
    }
}
