//! Prune command implementation: one reconciliation pass.

use anyhow::Result;
use tracing::info;

use super::ensure_privileges;
use crate::config::Config;
use crate::firewall::{FirewallStateSource, UfwBackend};
use crate::lock::LockGuard;
use crate::probe::{LsofProbe, SocketUsageSource};
use crate::prompt::TerminalConfirmer;
use crate::reconcile::{Outcome, Reconciler};
use crate::whitelist::Whitelist;

/// Run the prune command
pub fn run(config: &Config) -> Result<()> {
    ensure_privileges(config)?;

    // Protected ports must be known before anything else happens
    let whitelist = Whitelist::load(&config.whitelist)?;
    info!(
        "Loaded {} whitelist entries from {}",
        whitelist.len(),
        config.whitelist.display()
    );

    let firewall = UfwBackend::new(&config.ufw_path);
    let probe = LsofProbe::new(&config.lsof_path);
    firewall.preflight()?;
    probe.preflight()?;

    let _lock = LockGuard::acquire(&config.lock_file)?;

    let confirmer = TerminalConfirmer;
    let outcome = Reconciler::new(&firewall, &probe, &confirmer, &whitelist)
        .with_probe_match(config.probe_match)
        .with_confirm_token(config.confirm_token.as_str())
        .run();

    if let Outcome::Applied { deleted, failed } = outcome {
        info!("{} rule(s) deleted, {} failed", deleted.len(), failed.len());
    }
    Ok(())
}
