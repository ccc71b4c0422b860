//! Rules command implementation.

use anyhow::Result;

use super::ensure_privileges;
use crate::config::Config;
use crate::firewall::{list_allowed_rules, list_denied_rules, UfwBackend};
use crate::rule::Rule;

/// Run the rules command
pub fn run(config: &Config) -> Result<()> {
    ensure_privileges(config)?;

    let firewall = UfwBackend::new(&config.ufw_path);
    let allowed = list_allowed_rules(&firewall);
    let denied = list_denied_rules(&firewall);

    println!();
    print_section("Allowed", &allowed);
    println!();
    print_section("Denied", &denied);
    println!();

    Ok(())
}

fn print_section(title: &str, rules: &[Rule]) {
    println!("{} ({} rules):", title, rules.len());
    if rules.is_empty() {
        println!("  (none)");
    }
    for rule in rules {
        println!("  {}", rule);
    }
}
