//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

use crate::config::DEFAULT_CONFIG_PATH;

#[derive(Parser)]
#[command(name = "portsweep")]
#[command(author, version, about = "Remove ufw allow rules for ports nothing is listening on")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Defaults to `prune`
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file path (defaults apply when it does not exist)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, global = true)]
    pub config: PathBuf,

    /// Whitelist file path (overrides the config file)
    #[arg(short, long, global = true)]
    pub whitelist: Option<PathBuf>,

    /// Quiet mode (errors only; prune always reports its decisions)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose mode (debug output)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Log level from the verbosity flags.
    ///
    /// `prune` ignores `-q`: every decision of an interactive pass is
    /// reported, and the operator must see what is about to be deleted.
    pub fn log_level(&self) -> Level {
        let prunes = matches!(self.command, None | Some(Commands::Prune));
        if self.verbose {
            Level::DEBUG
        } else if self.quiet && !prunes {
            Level::ERROR
        } else {
            Level::INFO
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Audit allow rules and delete the unused ones after confirmation
    Prune,

    /// List allow and deny rules currently configured
    Rules,

    /// Check whether a port is in use
    Check {
        /// Port or port/protocol (e.g. 22, 53/udp)
        spec: String,
    },

    /// Show the parsed whitelist
    Whitelist,

    /// Show version
    Version,
}
