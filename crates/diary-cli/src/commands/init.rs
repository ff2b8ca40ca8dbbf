use anyhow::Result;
use diary_config::Config;
use std::path::Path;

pub fn handle(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }

    let config = Config::default();
    config.save_to(config_path)?;

    println!("✓ Created {}", config_path.display());
    println!("  Run 'kokodiary serve' to start the API server");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        handle(&path, false).unwrap();
        let first = Config::load_from(&path).unwrap();

        assert!(handle(&path, false).is_err());
        assert_eq!(
            Config::load_from(&path).unwrap().auth.secret,
            first.auth.secret
        );

        handle(&path, true).unwrap();
        assert_ne!(
            Config::load_from(&path).unwrap().auth.secret,
            first.auth.secret
        );
    }
}
