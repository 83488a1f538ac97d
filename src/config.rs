use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "CO2_EXPLORER_CONFIG";
/// Environment variable overriding the emissions file.
pub const DATA_ENV: &str = "CO2_EXPLORER_DATA";
/// Environment variable overriding the boundary attribute file.
pub const BOUNDARIES_ENV: &str = "CO2_EXPLORER_BOUNDARIES";
/// Looked up in the working directory when no config path is given.
pub const DEFAULT_CONFIG_FILE: &str = "co2-explorer.json";

// ---------------------------------------------------------------------------
// Startup configuration
// ---------------------------------------------------------------------------

/// Process-level settings. Every field has a default, so a config file may
/// set any subset of them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Emissions table loaded at startup. `None` starts with an empty window.
    pub emissions_path: Option<PathBuf>,
    /// Optional boundary attribute table for the map tab.
    pub boundaries_path: Option<PathBuf>,
    /// Countries pre-selected in the comparison, if present in the data.
    pub default_countries: Vec<String>,
    /// Highlighted years offered as presets, if inside the data's bounds.
    pub preset_years: Vec<i64>,
    /// First year of the default comparison range.
    pub default_range_start: i64,
    /// Length of the top-emitters ranking.
    pub top_n: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            emissions_path: None,
            boundaries_path: None,
            default_countries: vec!["China".into(), "United States".into(), "India".into()],
            preset_years: vec![1751, 1851, 1951, 2000, 2024],
            default_range_start: 1960,
            top_n: crate::data::metrics::DEFAULT_TOP_N,
        }
    }
}

impl Config {
    /// Parse a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Resolve the configuration for this process.
    ///
    /// Precedence, lowest first: defaults, config file (`CO2_EXPLORER_CONFIG`
    /// or `./co2-explorer.json`), `CO2_EXPLORER_DATA` /
    /// `CO2_EXPLORER_BOUNDARIES`, then the first positional argument as the
    /// emissions path.
    pub fn resolve(args: &[String]) -> Result<Self> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        config.apply_overrides(
            std::env::var_os(DATA_ENV).map(PathBuf::from),
            std::env::var_os(BOUNDARIES_ENV).map(PathBuf::from),
            args.get(1).map(PathBuf::from),
        );
        log::debug!("resolved config: {config:?}");
        Ok(config)
    }

    fn apply_overrides(
        &mut self,
        data_env: Option<PathBuf>,
        boundaries_env: Option<PathBuf>,
        data_arg: Option<PathBuf>,
    ) {
        if let Some(path) = data_env {
            self.emissions_path = Some(path);
        }
        if let Some(path) = boundaries_env {
            self.boundaries_path = Some(path);
        }
        if let Some(path) = data_arg {
            self.emissions_path = Some(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"emissions_path": "data/co2.csv", "top_n": 5}}"#).unwrap();
        file.flush().unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.emissions_path, Some(PathBuf::from("data/co2.csv")));
        assert_eq!(config.top_n, 5);
        assert_eq!(config.default_range_start, 1960);
        assert_eq!(config.default_countries, Config::default().default_countries);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        file.flush().unwrap();
        assert!(Config::from_file(file.path()).is_err());
    }

    #[test]
    fn argument_beats_environment() {
        let mut config = Config::default();
        config.apply_overrides(
            Some(PathBuf::from("env.csv")),
            Some(PathBuf::from("countries.csv")),
            Some(PathBuf::from("arg.csv")),
        );
        assert_eq!(config.emissions_path, Some(PathBuf::from("arg.csv")));
        assert_eq!(config.boundaries_path, Some(PathBuf::from("countries.csv")));

        let mut config = Config::default();
        config.apply_overrides(Some(PathBuf::from("env.csv")), None, None);
        assert_eq!(config.emissions_path, Some(PathBuf::from("env.csv")));
        assert_eq!(config.boundaries_path, None);
    }
}
