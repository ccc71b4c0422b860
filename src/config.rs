//! Configuration management for portsweep.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::PortsweepError;
use crate::probe::ProbeMatch;

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "/etc/portsweep/config.yaml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Whitelist file, one protected port per line
    pub whitelist: PathBuf,

    /// ufw executable
    pub ufw_path: String,

    /// lsof executable
    pub lsof_path: String,

    /// Exact (case-sensitive) answer that confirms deletion
    pub confirm_token: String,

    /// How a port is looked for in lsof output
    pub probe_match: ProbeMatch,

    /// Refuse to run without root privileges
    pub require_root: bool,

    /// Lock file guarding against concurrent prune runs
    pub lock_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            whitelist: PathBuf::from("whitelist.txt"),
            ufw_path: "ufw".to_string(),
            lsof_path: "lsof".to_string(),
            confirm_token: "Y".to_string(),
            probe_match: ProbeMatch::Substring,
            require_root: true,
            lock_file: PathBuf::from("/var/run/portsweep.lock"),
        }
    }
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), PortsweepError> {
        if self.confirm_token.is_empty() {
            return Err(PortsweepError::Config(
                "confirm_token must not be empty".to_string(),
            ));
        }
        if self.confirm_token.trim() != self.confirm_token {
            return Err(PortsweepError::Config(format!(
                "confirm_token '{}' must not have surrounding whitespace",
                self.confirm_token
            )));
        }
        if self.ufw_path.trim().is_empty() {
            return Err(PortsweepError::Config("ufw_path must not be empty".to_string()));
        }
        if self.lsof_path.trim().is_empty() {
            return Err(PortsweepError::Config("lsof_path must not be empty".to_string()));
        }
        if self.whitelist.as_os_str().is_empty() {
            return Err(PortsweepError::Config("whitelist path must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.whitelist, PathBuf::from("whitelist.txt"));
        assert_eq!(config.confirm_token, "Y");
        assert_eq!(config.probe_match, ProbeMatch::Substring);
        assert!(config.require_root);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "whitelist: /etc/portsweep/whitelist.txt").unwrap();
        writeln!(file, "probe_match: boundary").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.whitelist, PathBuf::from("/etc/portsweep/whitelist.txt"));
        assert_eq!(config.probe_match, ProbeMatch::Boundary);
        assert_eq!(config.ufw_path, "ufw");
        assert_eq!(config.confirm_token, "Y");
    }

    #[test]
    fn test_serialize_deserialize() {
        let config = Config {
            confirm_token: "yes".to_string(),
            ..Config::default()
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_validate_rejects_empty_token() {
        let config = Config {
            confirm_token: String::new(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_padded_token() {
        let config = Config {
            confirm_token: " Y".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_paths() {
        let config = Config {
            ufw_path: " ".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            whitelist: PathBuf::new(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_probe_match_fails_to_load() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "probe_match: fuzzy").unwrap();
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config::load_or_default(dir.path().join("config.yaml")).unwrap();
        assert_eq!(config, Config::default());
    }
}
