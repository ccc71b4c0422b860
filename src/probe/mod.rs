//! Live socket usage checks.
//!
//! A port counts as in use when the socket inspector's report for that port
//! mentions it. This is a presence check over free text, not a parse of the
//! report; see [`ProbeMatch`] for how strict the check is.

mod lsof;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use lsof::LsofProbe;

use crate::rule::PortSpec;

#[cfg(test)]
use mockall::automock;

/// How a port number is looked for in the inspector's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeMatch {
    /// The port's digits appear anywhere. Port `8` matches output that only
    /// mentions `8080`; such false positives keep the rule.
    #[default]
    Substring,
    /// The port appears as `:<port>` not followed by another digit.
    Boundary,
}

/// External socket inspector.
#[cfg_attr(test, automock)]
pub trait SocketUsageSource {
    /// Raw report of sockets using `port`. Empty when nothing does.
    fn socket_users(&self, port: u16) -> Result<String>;

    /// Verify the inspector can be run at all.
    fn preflight(&self) -> Result<()>;
}

/// Whether anything is listening on or connected through `spec`.
///
/// `spec` is `port/protocol` or a bare port (tcp assumed). Malformed specs,
/// failed queries and empty reports all answer `false`, which makes the rule
/// a deletion candidate.
pub fn is_in_use(source: &dyn SocketUsageSource, spec: &str, mode: ProbeMatch) -> bool {
    let parsed: PortSpec = match spec.parse() {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Treating '{}' as not in use: {}", spec, e);
            return false;
        }
    };

    let report = match source.socket_users(parsed.port) {
        Ok(report) => report,
        Err(e) => {
            warn!("Usage probe for port {} failed, treating as not in use: {:#}", parsed.port, e);
            return false;
        }
    };

    let used = mentions_port(&report, parsed.port, mode);
    debug!(
        "Probe {}/{}: {}",
        parsed.port,
        parsed.protocol_or_default(),
        if used { "in use" } else { "free" }
    );
    used
}

/// Whether `report` references `port` under the given policy.
pub fn mentions_port(report: &str, port: u16, mode: ProbeMatch) -> bool {
    match mode {
        ProbeMatch::Substring => report.contains(&port.to_string()),
        ProbeMatch::Boundary => {
            let needle = format!(":{}", port);
            report.match_indices(&needle).any(|(idx, _)| {
                !report[idx + needle.len()..].starts_with(|c: char| c.is_ascii_digit())
            })
        }
    }
}
