use anyhow::{Context, Result};
use diary_security::Redactor;
use std::io::Read;
use std::path::Path;

use super::load_existing;

pub fn handle(config_path: &Path, file: &Path, reveal: bool) -> Result<()> {
    let config = load_existing(config_path)?;
    let redactor = Redactor::new(config.spoiler.header, config.spoiler.placeholder);

    let content = read_input(file)?;
    print!("{}", redactor.redact(&content, reveal));

    Ok(())
}

fn read_input(file: &Path) -> Result<String> {
    if file == Path::new("-") {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        Ok(content)
    } else {
        std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))
    }
}
