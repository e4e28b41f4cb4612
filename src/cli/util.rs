//! CLI Common Utilities
//!
//! File and config helpers shared by command handlers.

use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::{Config, ConfigLoader};
use crate::document::{IconSet, RenderTheme, StructuredDocument};
use crate::types::Result;

/// Explicit config file when given, full resolution chain otherwise
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            debug!("Loading config from: {}", path.display());
            ConfigLoader::load_from_file(path)
        }
        None => ConfigLoader::load(),
    }
}

/// Read and deserialize a JSON file
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Write `text` to `path`, or stdout when no path is given
pub async fn write_or_print(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, text).await?;
            debug!("Wrote {} bytes to {}", text.len(), path.display());
        }
        None => println!("{}", text),
    }
    Ok(())
}

/// Theme for `document`: its merged branding, else configured house branding
pub fn theme_for(config: &Config, document: &StructuredDocument, icons: Option<IconSet>) -> RenderTheme {
    let icons = icons.unwrap_or(config.render.icons);
    RenderTheme::for_document(
        document.branding.as_ref(),
        &config.render.theme(&config.branding),
        icons,
    )
}
