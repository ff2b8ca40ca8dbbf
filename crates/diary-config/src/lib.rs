use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the kokodiary server
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub spoiler: SpoilerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file; unset uses the platform data directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Session token signing secret
    #[serde(default = "generate_secret")]
    pub secret: String,

    #[serde(default = "default_token_ttl_days")]
    pub token_ttl_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpoilerConfig {
    #[serde(default = "default_spoiler_header")]
    pub header: String,

    #[serde(default = "default_spoiler_placeholder")]
    pub placeholder: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: generate_secret(),
            token_ttl_days: default_token_ttl_days(),
        }
    }
}

impl Default for SpoilerConfig {
    fn default() -> Self {
        Self {
            header: default_spoiler_header(),
            placeholder: default_spoiler_placeholder(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_token_ttl_days() -> u32 {
    30
}

fn default_spoiler_header() -> String {
    "Secret spoiler".to_string()
}

fn default_spoiler_placeholder() -> String {
    "This content is private".to_string()
}

/// 256 bits from two v4 UUIDs
pub fn generate_secret() -> String {
    format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}

impl Config {
    /// Load config from `path`, writing defaults there if the file is missing.
    ///
    /// Persisting the defaults keeps the generated secret stable across runs.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get config file path
    pub fn config_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("com", "kokodiary", "kokodiary") {
            dirs.config_dir().join("config.toml")
        } else {
            PathBuf::from("~/.kokodiary/config.toml")
        }
    }
}
