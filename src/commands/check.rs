//! Check command implementation.

use anyhow::Result;

use super::ensure_privileges;
use crate::config::Config;
use crate::probe::{is_in_use, LsofProbe, SocketUsageSource};
use crate::rule::PortSpec;

/// Run the check command
pub fn run(spec: &str, config: &Config) -> Result<()> {
    // Reject typos here; the probe itself would just answer "not in use"
    let parsed: PortSpec = spec.parse()?;
    let canonical = format!("{}/{}", parsed.port, parsed.protocol_or_default());

    ensure_privileges(config)?;

    let probe = LsofProbe::new(&config.lsof_path);
    probe.preflight()?;

    println!();
    if is_in_use(&probe, &canonical, config.probe_match) {
        println!("{} is in use", canonical);
    } else {
        println!("{} is NOT in use", canonical);
    }
    println!();

    Ok(())
}
