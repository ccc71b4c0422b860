//! CLI command implementations.

pub mod check;
pub mod prune;
pub mod rules;
pub mod whitelist;

use anyhow::Result;

use crate::config::Config;
use crate::firewall::check_root;

/// Root check, skipped when the config opts out.
pub(crate) fn ensure_privileges(config: &Config) -> Result<()> {
    if config.require_root {
        check_root()?;
    }
    Ok(())
}
