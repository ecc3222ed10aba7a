pub mod bonus;
pub mod budget;
pub mod chart;
pub mod schema;
pub mod tax;

use crate::core::ConfigDocument;
use anyhow::Context;
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Read a JSON configuration (or stdin with "-") and check its required fields
pub fn read_config<T: ConfigDocument>(path: &Path) -> anyhow::Result<T> {
    let value = if path.as_os_str() == "-" {
        read_from_stdin()?
    } else {
        read_from_file(path)?
    };

    T::check_document(&value).with_context(|| format!("invalid configuration {}", path.display()))?;
    let config = serde_json::from_value(value)
        .with_context(|| format!("invalid configuration {}", path.display()))?;
    log::info!("Loaded configuration from {}", path.display());
    Ok(config)
}

fn read_from_file(path: &Path) -> anyhow::Result<Value> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);
    let value = serde_json::from_reader(reader)
        .with_context(|| format!("failed to parse JSON in {}", path.display()))?;
    Ok(value)
}

fn read_from_stdin() -> anyhow::Result<Value> {
    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());

    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    if buffer.is_empty() {
        anyhow::bail!("No input received. Provide a file or pipe a configuration to stdin.");
    }

    let value = serde_json::from_slice(&buffer).context("failed to parse JSON from stdin")?;
    Ok(value)
}
