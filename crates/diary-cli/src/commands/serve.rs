use anyhow::Result;
use diary_security::{MAX_TOKEN_TTL_DAYS, Redactor, TokenSigner};
use diary_server::{AppState, DiaryServer};
use diary_storage::Storage;
use std::path::{Path, PathBuf};
use time::Duration;

/// Command-line values that take precedence over the config file
#[derive(Debug, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<PathBuf>,
    pub secret: Option<String>,
}

pub async fn handle(config_path: &Path, overrides: Overrides) -> Result<()> {
    let config = diary_config::Config::load_from(config_path)?;

    let host = overrides.host.unwrap_or(config.server.host);
    let port = overrides.port.unwrap_or(config.server.port);
    let database = overrides.database.or(config.database.path);
    let secret = overrides.secret.unwrap_or(config.auth.secret);
    if secret.trim().is_empty() {
        anyhow::bail!("auth secret must not be empty");
    }

    let ttl = token_ttl(config.auth.token_ttl_days)?;

    let storage = Storage::new(database).await?;
    let tokens = TokenSigner::new(&secret, ttl);
    let redactor = Redactor::new(config.spoiler.header, config.spoiler.placeholder);

    tracing::info!(config = %config_path.display(), "starting server");

    DiaryServer::new(AppState::new(storage, tokens, redactor))
        .with_cors_origins(&config.server.cors_origins)?
        .serve(&host, port)
        .await
}

fn token_ttl(days: u32) -> Result<Duration> {
    let days = i64::from(days);
    if !(1..=MAX_TOKEN_TTL_DAYS).contains(&days) {
        anyhow::bail!(
            "auth.token_ttl_days must be between 1 and {}, got {}",
            MAX_TOKEN_TTL_DAYS,
            days
        );
    }
    Ok(Duration::days(days))
}
