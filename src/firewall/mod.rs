//! Firewall rule inventory (ufw).
//!
//! The firewall is reached through [`FirewallStateSource`], which only knows
//! how to fetch status text and delete a single rule. Turning that text into
//! [`Rule`]s happens here so it can be tested without a live firewall.

mod ufw;

use anyhow::Result;
use tracing::{debug, warn};

pub use ufw::UfwBackend;

use crate::error::PortsweepError;
use crate::rule::{Action, PortSpec, Rule};

#[cfg(test)]
use mockall::automock;

/// External firewall subsystem: read state, delete one rule.
#[cfg_attr(test, automock)]
pub trait FirewallStateSource {
    /// Raw status listing (the text of `ufw status`).
    fn status(&self) -> Result<String>;

    /// Remove a single rule.
    fn delete_rule(&self, rule: &Rule) -> Result<()>;

    /// Verify the backend can be queried at all.
    fn preflight(&self) -> Result<()>;
}

/// Allow rules currently configured. Never fails: an unreadable or empty
/// status yields an empty list.
pub fn list_allowed_rules(source: &dyn FirewallStateSource) -> Vec<Rule> {
    list_rules(source, Action::Allow)
}

/// Deny rules currently configured. Diagnostic only.
pub fn list_denied_rules(source: &dyn FirewallStateSource) -> Vec<Rule> {
    list_rules(source, Action::Deny)
}

fn list_rules(source: &dyn FirewallStateSource, action: Action) -> Vec<Rule> {
    let status = match source.status() {
        Ok(status) => status,
        Err(e) => {
            warn!("Could not read firewall status, assuming no rules: {:#}", e);
            return Vec::new();
        }
    };

    if status.trim().is_empty() {
        warn!("Firewall status output is empty, assuming no rules");
        return Vec::new();
    }

    let rules = parse_rules(&status, action);
    debug!("Found {} {} rule(s)", rules.len(), action);
    rules
}

/// Extract rules with the given action from status text.
///
/// IPv4 and IPv6 entries for the same port spec collapse to one rule, in
/// order of first appearance.
pub fn parse_rules(status: &str, action: Action) -> Vec<Rule> {
    let mut rules: Vec<Rule> = Vec::new();
    for rule in status.lines().filter_map(parse_rule_line) {
        if rule.action == action && !rules.contains(&rule) {
            rules.push(rule);
        }
    }
    rules
}

/// Parse one `<port-spec> [(v6)] <ACTION> [IN|OUT] <source>` line.
///
/// Outbound rules are skipped: they say nothing about listening ports, and
/// `ufw delete allow <spec>` would not address them.
fn parse_rule_line(line: &str) -> Option<Rule> {
    let mut tokens = line.split_whitespace();
    let port_field = tokens.next()?;
    let marker = tokens.find(|t| *t != "(v6)")?;
    let action = Action::from_marker(marker)?;
    if tokens.next() == Some("OUT") {
        debug!("Skipping outbound rule '{}'", line.trim());
        return None;
    }

    match port_field.parse::<PortSpec>() {
        Ok(spec) => Some(Rule::new(spec, action)),
        Err(e) => {
            debug!("Skipping rule '{}': {}", line.trim(), e);
            None
        }
    }
}

/// Check if running as root (effective UID == 0).
///
/// ufw refuses to report status and lsof only sees the caller's own sockets
/// without root, so both queries would silently under-report.
pub fn check_root() -> Result<(), PortsweepError> {
    // SAFETY: geteuid() has no preconditions and cannot fail.
    let euid = unsafe { libc::geteuid() };

    if euid != 0 {
        return Err(PortsweepError::Permission(
            "querying ufw and lsof requires root privileges, please run with sudo".to_string(),
        ));
    }
    Ok(())
}
