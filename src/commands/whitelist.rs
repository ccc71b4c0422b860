//! Whitelist command implementation.

use anyhow::Result;

use crate::config::Config;
use crate::whitelist::Whitelist;

/// Run the whitelist command
pub fn run(config: &Config) -> Result<()> {
    let whitelist = Whitelist::load(&config.whitelist)?;

    println!();
    println!(
        "Whitelist {} ({} entries):",
        config.whitelist.display(),
        whitelist.len()
    );
    println!();

    if whitelist.is_empty() {
        println!("  (empty)");
    }
    for entry in whitelist.entries() {
        match entry.protocol {
            Some(_) => println!("  {}", entry),
            None => println!("  {} (tcp and udp)", entry),
        }
    }
    println!();

    Ok(())
}
