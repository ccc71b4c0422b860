//! Error types for portsweep.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortsweepError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Whitelist error: {0}")]
    Whitelist(String),

    #[error("Firewall error: {0}")]
    Firewall(String),

    #[error("Probe error: {0}")]
    Probe(String),

    #[error("Permission denied: {0}")]
    Permission(String),

    #[error("Invalid port spec: {0}")]
    Parse(String),

    #[error("Another instance is already running (lock file: {0})")]
    Lock(String),
}
