//! Firewall rule model and the port-field grammar.
//!
//! ufw prints the port field of a rule in a few shapes: `9443/tcp`, a bare
//! `80` that covers both protocols, and occasionally a run-together `8000tcp`.
//! [`PortSpec`] is the single parser for all of them; everything downstream
//! works on the canonical `port/protocol` form.

use std::fmt;
use std::str::FromStr;

use crate::error::PortsweepError;

/// Transport protocol of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = PortsweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("tcp") {
            Ok(Protocol::Tcp)
        } else if s.eq_ignore_ascii_case("udp") {
            Ok(Protocol::Udp)
        } else {
            Err(PortsweepError::Parse(format!("unknown protocol '{}'", s)))
        }
    }
}

/// What a rule does with matching traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Allow,
    Deny,
}

impl Action {
    /// Map a ufw action column token. REJECT and LIMIT are neither.
    pub fn from_marker(token: &str) -> Option<Self> {
        match token {
            "ALLOW" => Some(Action::Allow),
            "DENY" => Some(Action::Deny),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Allow => f.write_str("allow"),
            Action::Deny => f.write_str("deny"),
        }
    }
}

/// A parsed port field: a port number and, if given, a protocol.
///
/// Grammar: `DIGITS [ "/" PROTO | PROTO ]`, with `PROTO` one of `tcp`/`udp`
/// (any case). Port 0 and values above 65535 are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortSpec {
    pub port: u16,
    pub protocol: Option<Protocol>,
}

impl PortSpec {
    /// Protocol, defaulting to tcp when none was written.
    pub fn protocol_or_default(&self) -> Protocol {
        self.protocol.unwrap_or(Protocol::Tcp)
    }
}

impl FromStr for PortSpec {
    type Err = PortsweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits_end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (digits, rest) = s.split_at(digits_end);

        if digits.is_empty() {
            return Err(PortsweepError::Parse(format!("'{}' does not start with a port", s)));
        }
        let port: u16 = digits
            .parse()
            .map_err(|_| PortsweepError::Parse(format!("port out of range in '{}'", s)))?;
        if port == 0 {
            return Err(PortsweepError::Parse(format!("port 0 in '{}'", s)));
        }

        let protocol = match rest.strip_prefix('/') {
            Some(proto) => Some(proto.parse()?),
            None if rest.is_empty() => None,
            None => Some(rest.parse()?),
        };

        Ok(PortSpec { port, protocol })
    }
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.protocol {
            Some(proto) => write!(f, "{}/{}", self.port, proto),
            None => write!(f, "{}", self.port),
        }
    }
}

/// One firewall entry, as read from `ufw status`.
///
/// `Display` yields the canonical `port/protocol` form used for matching and
/// logging; [`Rule::firewall_spec`] yields the form ufw expects on deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rule {
    pub port: u16,
    pub protocol: Protocol,
    pub action: Action,
    /// False when ufw listed the rule without a protocol (covers both).
    pub explicit_protocol: bool,
}

impl Rule {
    pub fn new(spec: PortSpec, action: Action) -> Self {
        Self {
            port: spec.port,
            protocol: spec.protocol_or_default(),
            action,
            explicit_protocol: spec.protocol.is_some(),
        }
    }

    /// Canonical `port/protocol` text.
    pub fn canonical(&self) -> String {
        self.to_string()
    }

    /// The port field as ufw knows the rule, for `ufw delete allow <spec>`.
    pub fn firewall_spec(&self) -> String {
        if self.explicit_protocol {
            self.canonical()
        } else {
            self.port.to_string()
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.port, self.protocol)
    }
}
