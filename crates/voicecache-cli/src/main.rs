//! CLI entry point - the composition root.
//!
//! This is the ONLY place where logging is installed and adapters are wired
//! together via bootstrap. Command dispatch routes to handlers.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use voicecache_cli::{Cli, CliConfig, Commands, bootstrap, handlers};

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before clap reads its `env` fallbacks
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Bootstrap the CLI context (composition root)
    let config = CliConfig::from_cli(&cli);
    let ctx = bootstrap(config).context("Failed to set up voicecache")?;

    let result = match cli.command {
        Commands::Say { voice, text } => handlers::say::execute(&ctx, &voice, &text).await,
        Commands::Prefetch { voices } => handlers::prefetch::execute(&ctx, voices).await,
        Commands::Interactive { voices } => handlers::interactive::execute(&ctx, voices).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
    Ok(())
}
