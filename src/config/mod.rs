mod file_config;

pub use file_config::FileConfig;

use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that take part in config resolution.
/// Mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub catalog_path: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub base_url: Option<String>,
    pub bucket: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub catalog_path: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub base_url: String,

    // Storage settings
    pub bucket: String,
    pub region: String,
    pub albums_prefix: String,

    // Provider credentials
    pub stripe_secret_key: Option<String>,
    pub stripe_webhook_secret: Option<String>,
    pub resend_api_key: Option<String>,
    pub contact_inbox: String,
    pub membership_secret: Option<String>,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML config.
    /// TOML values override CLI values where present; provider credentials
    /// missing from both fall back to environment variables.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let catalog_path = file
            .catalog_path
            .map(PathBuf::from)
            .or_else(|| cli.catalog_path.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("catalog_path must be specified via CLI or in config file")
            })?;

        if !catalog_path.exists() {
            bail!("Catalog file does not exist: {:?}", catalog_path);
        }
        if !catalog_path.is_file() {
            bail!("catalog_path is not a file: {:?}", catalog_path);
        }

        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        let base_url = file
            .base_url
            .or_else(|| cli.base_url.clone())
            .unwrap_or_else(|| "http://localhost:3000".to_string());

        let bucket = file
            .bucket
            .or_else(|| cli.bucket.clone())
            .or_else(|| env_var("AWS_S3_BUCKET"))
            .unwrap_or_else(|| "singitpop-music".to_string());

        let region = file
            .region
            .or_else(|| cli.region.clone())
            .unwrap_or_else(|| "eu-north-1".to_string());

        let albums_prefix = file
            .albums_prefix
            .unwrap_or_else(|| "albums/".to_string());

        let stripe_secret_key = file
            .stripe_secret_key
            .or_else(|| env_var("STRIPE_SECRET_KEY"));
        let stripe_webhook_secret = file
            .stripe_webhook_secret
            .or_else(|| env_var("STRIPE_WEBHOOK_SECRET"));
        let resend_api_key = file.resend_api_key.or_else(|| env_var("RESEND_API_KEY"));
        let membership_secret = file
            .membership_secret
            .or_else(|| env_var("MEMBERSHIP_SECRET"));

        let contact_inbox = file
            .contact_inbox
            .unwrap_or_else(|| "info@singitpop.com".to_string());

        Ok(Self {
            catalog_path,
            port,
            logging_level,
            frontend_dir_path,
            base_url,
            bucket,
            region,
            albums_prefix,
            stripe_secret_key,
            stripe_webhook_secret,
            resend_api_key,
            contact_inbox,
            membership_secret,
        })
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
