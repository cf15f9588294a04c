//! OAuth app credentials, read from ~/.config/gcal/credentials.json.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

pub fn base_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Could not determine config directory")?
        .join("gcal"))
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn load() -> Result<Self> {
        let path = base_dir()?.join("credentials.json");

        if !path.exists() {
            anyhow::bail!(
                "Google credentials not found.\n\n\
                Create {} with:\n\n\
                {{\n  \
                  \"client_id\": \"your-client-id.apps.googleusercontent.com\",\n  \
                  \"client_secret\": \"your-client-secret\"\n\
                }}\n\n\
                See https://console.cloud.google.com/apis/credentials for setup.",
                path.display()
            );
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read credentials from {}", path.display()))?;

        let creds: Credentials = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse credentials from {}", path.display()))?;

        Ok(creds)
    }
}
