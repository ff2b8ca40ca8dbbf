use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kokodiary")]
#[command(about = "Diary server with secret spoiler blocks", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: platform config dir)
    #[arg(long, global = true, env = "KOKODIARY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default config file with a fresh signing secret
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Start the HTTP API server
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,

        /// SQLite database file
        #[arg(long)]
        database: Option<PathBuf>,

        /// Token signing secret (overrides the config file)
        #[arg(long, env = "KOKODIARY_SECRET", hide_env_values = true)]
        secret: Option<String>,
    },

    /// Render secret blocks of a Markdown file to stdout
    Redact {
        /// Markdown file, or '-' for stdin
        file: PathBuf,

        /// Keep secret payloads instead of masking them
        #[arg(long)]
        reveal: bool,
    },
}
