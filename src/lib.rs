//! # portsweep - prune unused ufw allow rules
//!
//! Audits the host firewall's allow-list against live sockets and, after an
//! explicit confirmation, deletes the rules whose ports nothing uses. Ports
//! listed in a whitelist file are never deleted.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (clap) ── prune | rules | check | whitelist | version  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Config (serde_yaml)          Whitelist (text file)         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Reconciler                                                 │
//! │    inventory ─► probe ─► whitelist filter ─► confirm ─► del │
//! ├──────────────────────────────┬──────────────────────────────┤
//! │  FirewallStateSource (ufw)   │  SocketUsageSource (lsof)    │
//! ├──────────────────────────────┴──────────────────────────────┤
//! │  CommandExecutor (std::process, mockable)                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use portsweep::config::Config;
//! use portsweep::firewall::{check_root, UfwBackend};
//! use portsweep::probe::LsofProbe;
//! use portsweep::prompt::TerminalConfirmer;
//! use portsweep::reconcile::Reconciler;
//! use portsweep::whitelist::Whitelist;
//!
//! fn main() -> anyhow::Result<()> {
//!     check_root()?;
//!
//!     let config = Config::load_or_default("/etc/portsweep/config.yaml")?;
//!     let whitelist = Whitelist::load(&config.whitelist)?;
//!
//!     let firewall = UfwBackend::new("ufw");
//!     let probe = LsofProbe::new("lsof");
//!     let outcome = Reconciler::new(&firewall, &probe, &TerminalConfirmer, &whitelist).run();
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`cli`] - Command-line interface definitions
//! - [`cmd_abstraction`] - Mockable process execution
//! - [`commands`] - CLI command implementations
//! - [`config`] - Configuration parsing and validation
//! - [`error`] - Typed errors
//! - [`firewall`] - ufw rule inventory and deletion
//! - [`lock`] - File locking against concurrent runs
//! - [`probe`] - Live socket usage checks (lsof)
//! - [`prompt`] - Operator confirmation
//! - [`reconcile`] - The audit-and-prune pass
//! - [`rule`] - Rule model and port-field parser
//! - [`whitelist`] - Protected ports

pub mod cli;
pub mod cmd_abstraction;
pub mod commands;
pub mod config;
pub mod error;
pub mod firewall;
pub mod lock;
pub mod probe;
pub mod prompt;
pub mod reconcile;
pub mod rule;
pub mod whitelist;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use error::PortsweepError;
pub use reconcile::{Outcome, Plan, Reconciler};
pub use rule::{Action, Protocol, Rule};
