//! Protected ports that are never pruned.
//!
//! The whitelist file holds one entry per line: a bare port (`22`) protects
//! that port for every protocol, `port/protocol` (`53/udp`) protects exactly
//! that pair. Blank lines and `#` comments are ignored.

use anyhow::{Context, Result};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::PortsweepError;
use crate::rule::{PortSpec, Protocol, Rule};

/// One protected port specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WhitelistEntry {
    pub port: u16,
    /// `None` protects the port for any protocol.
    pub protocol: Option<Protocol>,
}

impl WhitelistEntry {
    /// Whether this entry protects `rule`.
    ///
    /// A bare entry matches any candidate whose canonical form starts with
    /// `<port>/`; a pair entry matches only the identical canonical form.
    ///
    /// A bare firewall rule (`53  ALLOW`) covers both protocols but is
    /// matched as `53/tcp`, so `53/udp` does not protect it even though
    /// deleting it also drops the udp allowance. See
    /// [`Whitelist::partial_match`].
    pub fn matches(&self, rule: &Rule) -> bool {
        self.port == rule.port && self.protocol.map_or(true, |p| p == rule.protocol)
    }
}

impl FromStr for WhitelistEntry {
    type Err = PortsweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let spec: PortSpec = s.parse()?;
        Ok(Self {
            port: spec.port,
            protocol: spec.protocol,
        })
    }
}

impl fmt::Display for WhitelistEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.protocol {
            Some(proto) => write!(f, "{}/{}", self.port, proto),
            None => write!(f, "{}", self.port),
        }
    }
}

/// The loaded set of whitelist entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Whitelist {
    entries: Vec<WhitelistEntry>,
}

impl Whitelist {
    pub fn new(entries: Vec<WhitelistEntry>) -> Self {
        Self { entries }
    }

    /// Read and parse the whitelist file. A missing file or a malformed line
    /// is an error: without it the protected ports are unknown.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| PortsweepError::Whitelist(format!("cannot read {}: {}", path.display(), e)))?;
        Self::parse(&content).with_context(|| format!("Invalid whitelist file: {}", path.display()))
    }

    /// Parse whitelist text.
    pub fn parse(content: &str) -> Result<Self, PortsweepError> {
        let mut entries = Vec::new();
        for (idx, raw) in content.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let entry = line.parse::<WhitelistEntry>().map_err(|e| {
                PortsweepError::Whitelist(format!("line {}: '{}': {}", idx + 1, line, e))
            })?;
            if !entries.contains(&entry) {
                entries.push(entry);
            }
        }
        Ok(Self { entries })
    }

    /// First entry protecting `rule`, if any.
    pub fn find_match(&self, rule: &Rule) -> Option<&WhitelistEntry> {
        self.entries.iter().find(|entry| entry.matches(rule))
    }

    /// A protocol-specific entry for the port of a bare (both-protocol) rule
    /// that [`find_match`](Self::find_match) did not protect.
    pub fn partial_match(&self, rule: &Rule) -> Option<&WhitelistEntry> {
        if rule.explicit_protocol {
            return None;
        }
        self.entries
            .iter()
            .find(|entry| entry.port == rule.port && entry.protocol.is_some() && !entry.matches(rule))
    }

    pub fn entries(&self) -> &[WhitelistEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Action;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn rule(spec: &str) -> Rule {
        Rule::new(spec.parse().unwrap(), Action::Allow)
    }

    fn entry(s: &str) -> WhitelistEntry {
        s.parse().unwrap()
    }

    #[test]
    fn test_bare_entry_matches_any_protocol() {
        let e = entry("22");
        assert!(e.matches(&rule("22/tcp")));
        assert!(e.matches(&rule("22/udp")));
        assert!(!e.matches(&rule("2222/tcp")));
        assert!(!e.matches(&rule("220/tcp")));
        assert!(!e.matches(&rule("2/tcp")));
    }

    #[test]
    fn test_pair_entry_matches_exactly() {
        let e = entry("53/udp");
        assert!(e.matches(&rule("53/udp")));
        assert!(!e.matches(&rule("53/tcp")));
        assert!(!e.matches(&rule("530/udp")));
    }

    #[test]
    fn test_pair_entry_matches_bare_rule_by_canonical_form() {
        // A bare `80` rule is canonically `80/tcp`.
        assert!(entry("80/tcp").matches(&rule("80")));
        assert!(!entry("80/udp").matches(&rule("80")));
    }

    #[test]
    fn test_partial_match_only_for_bare_rules() {
        let list = Whitelist::parse("53/udp\n80/tcp\n").unwrap();
        assert_eq!(list.partial_match(&rule("53")), Some(&entry("53/udp")));
        assert_eq!(list.partial_match(&rule("53/tcp")), None);
        // 80/tcp already protects the bare rule
        assert_eq!(list.partial_match(&rule("80")), None);
        assert_eq!(list.partial_match(&rule("8080")), None);
    }

    #[test]
    fn test_parse_skips_blanks_and_comments() {
        let list = Whitelist::parse("22\n\n   \n# ssh above\n53/udp  # dns\n443/tcp\n").unwrap();
        assert_eq!(list.entries(), &[entry("22"), entry("53/udp"), entry("443/tcp")]);
    }

    #[test]
    fn test_parse_dedupes() {
        let list = Whitelist::parse("22\n22\n22/tcp\n").unwrap();
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_parse_rejects_malformed_line_with_number() {
        let err = Whitelist::parse("22\nssh\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_find_match_returns_first() {
        let list = Whitelist::parse("8000\n8000/tcp\n").unwrap();
        assert_eq!(list.find_match(&rule("8000/tcp")), Some(&entry("8000")));
        assert_eq!(list.find_match(&rule("9000/tcp")), None);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "22").unwrap();
        writeln!(file, "1194/udp").unwrap();
        let list = Whitelist::load(file.path()).unwrap();
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = Whitelist::load(dir.path().join("whitelist.txt")).unwrap_err();
        assert!(err.to_string().contains("whitelist.txt"));
    }

    #[test]
    fn test_empty_file_is_empty_whitelist() {
        let list = Whitelist::parse("").unwrap();
        assert!(list.is_empty());
    }
}
