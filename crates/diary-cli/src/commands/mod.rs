pub mod init;
pub mod redact;
pub mod serve;

use anyhow::Result;
use diary_config::Config;
use std::path::Path;

/// Read the config if one exists, without creating it
pub fn load_existing(config_path: &Path) -> Result<Config> {
    if config_path.exists() {
        Config::load_from(config_path)
    } else {
        Ok(Config::default())
    }
}
