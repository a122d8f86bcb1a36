use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Serializes a result tree as pretty JSON.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize results to JSON")
}

/// Writes a result tree to `path`, creating parent directories as needed.
pub fn export_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create directory: {:?}", parent))?;
    }

    let json_output = to_json(value)?;
    std::fs::write(path, json_output)
        .context(format!("Failed to write results to {}", path.display()))?;

    info!("Results saved to {}", path.display());
    Ok(())
}
