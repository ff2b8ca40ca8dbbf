mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli
        .config
        .unwrap_or_else(diary_config::Config::config_path);

    match cli.command {
        cli::Commands::Init { force } => commands::init::handle(&config_path, force),
        cli::Commands::Serve {
            host,
            port,
            database,
            secret,
        } => {
            let overrides = commands::serve::Overrides {
                host,
                port,
                database,
                secret,
            };
            commands::serve::handle(&config_path, overrides).await
        }
        cli::Commands::Redact { file, reveal } => {
            commands::redact::handle(&config_path, &file, reveal)
        }
    }
}
