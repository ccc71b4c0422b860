//! portsweep - prune unused ufw allow rules.

use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::FmtSubscriber;

use portsweep::cli::{Cli, Commands};
use portsweep::config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level())
        .with_ansi(std::io::stdout().is_terminal())
        .with_target(false)
        .with_thread_ids(false)
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S%.6f".to_string()))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = Config::load_or_default(&cli.config)?;
    if let Some(path) = cli.whitelist {
        config.whitelist = path;
    }

    match cli.command.unwrap_or(Commands::Prune) {
        Commands::Prune => portsweep::commands::prune::run(&config),
        Commands::Rules => portsweep::commands::rules::run(&config),
        Commands::Check { spec } => portsweep::commands::check::run(&spec, &config),
        Commands::Whitelist => portsweep::commands::whitelist::run(&config),
        Commands::Version => {
            println!("portsweep {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
