use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub catalog_path: Option<String>,
    pub port: Option<u16>,
    pub logging_level: Option<String>,
    pub frontend_dir_path: Option<String>,
    pub base_url: Option<String>,

    // Storage settings
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub albums_prefix: Option<String>,

    // Provider credentials (environment variables are the fallback)
    pub stripe_secret_key: Option<String>,
    pub stripe_webhook_secret: Option<String>,
    pub resend_api_key: Option<String>,
    pub contact_inbox: Option<String>,
    pub membership_secret: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
