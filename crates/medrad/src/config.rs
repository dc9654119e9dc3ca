//! Configuration for medrad.
//!
//! Loads settings from /etc/medra/config.toml (override with the
//! MEDRAD_CONFIG environment variable) or falls back to defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Default config file path
pub const CONFIG_PATH: &str = "/etc/medra/config.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedradConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Bind address. Localhost only unless explicitly reconfigured.
    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    /// Simulation trials per disease per case polarity.
    #[serde(default = "default_runs")]
    pub simulation_runs: usize,

    /// Seed for the simulation sampler. Fixed for reproducible tallies.
    #[serde(default = "default_seed")]
    pub simulation_seed: u64,

    /// Optional path to a knowledge-base JSON file. When absent, the
    /// bundled disease weight table is used.
    #[serde(default)]
    pub knowledge_file: Option<String>,
}

fn default_bind() -> String {
    "127.0.0.1:7810".to_string()
}

fn default_runs() -> usize {
    200
}

fn default_seed() -> u64 {
    42
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            simulation_runs: default_runs(),
            simulation_seed: default_seed(),
            knowledge_file: None,
        }
    }
}

impl Default for MedradConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl MedradConfig {
    /// Load configuration, falling back to defaults when no file exists.
    pub fn load() -> Self {
        let path = std::env::var("MEDRAD_CONFIG").unwrap_or_else(|_| CONFIG_PATH.to_string());
        match Self::load_from(Path::new(&path)) {
            Ok(Some(config)) => {
                info!("Loaded config from {}", path);
                config
            }
            Ok(None) => {
                info!("No config at {}, using defaults", path);
                Self::default()
            }
            Err(e) => {
                warn!("Failed to load config from {}: {:#}. Using defaults", path, e);
                Self::default()
            }
        }
    }

    fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = toml::from_str(&raw)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(Some(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_sane() {
        let config = MedradConfig::default();
        assert_eq!(config.server.bind, "127.0.0.1:7810");
        assert_eq!(config.analysis.simulation_runs, 200);
        assert_eq!(config.analysis.simulation_seed, 42);
        assert!(config.analysis.knowledge_file.is_none());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[analysis]\nsimulation_runs = 50").unwrap();

        let config = MedradConfig::load_from(file.path()).unwrap().unwrap();
        assert_eq!(config.analysis.simulation_runs, 50);
        assert_eq!(config.analysis.simulation_seed, 42);
        assert_eq!(config.server.bind, "127.0.0.1:7810");
    }

    #[test]
    fn missing_file_is_ok() {
        let config = MedradConfig::load_from(Path::new("/nonexistent/medra.toml")).unwrap();
        assert!(config.is_none());
    }

    #[test]
    fn bad_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not toml at all [[[").unwrap();
        assert!(MedradConfig::load_from(file.path()).is_err());
    }
}
