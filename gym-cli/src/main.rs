use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use gym_cli::commands::{login_hint, Cli};

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let default_level = if cli.verbose() { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Initialize tokio runtime
    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async { cli.execute().await });

    if let Err(e) = &result {
        if let Some(hint) = login_hint(e) {
            eprintln!("{}", hint.yellow());
        }
    }

    result
}
