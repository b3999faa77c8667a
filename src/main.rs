use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use singitpop_club_server::catalog::load_catalog;
use singitpop_club_server::config::{AppConfig, CliConfig, FileConfig};
use singitpop_club_server::mailer::ResendMailer;
use singitpop_club_server::membership::TierTokens;
use singitpop_club_server::payments::StripeClient;
use singitpop_club_server::server::{run_server, RequestsLoggingLevel};
use singitpop_club_server::storage::S3MusicStore;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the catalog JSON file (generated from the music tracker
    /// spreadsheet, maintained by cli-reconcile).
    #[clap(value_parser = parse_path)]
    pub catalog_path: Option<PathBuf>,

    /// Path to an optional TOML config file; its values override CLI flags.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Public base URL of the site, used for checkout redirect targets.
    #[clap(long)]
    pub base_url: Option<String>,

    /// S3 bucket holding the music files.
    #[clap(long)]
    pub bucket: Option<String>,

    /// AWS region of the music bucket.
    #[clap(long)]
    pub region: Option<String>,

    /// Load and check the catalog, print findings, then exit.
    #[clap(long)]
    pub check_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };

    let cli_config = CliConfig {
        catalog_path: cli_args.catalog_path.clone(),
        port: cli_args.port,
        logging_level: cli_args.logging_level.clone(),
        frontend_dir_path: cli_args.frontend_dir_path.clone(),
        base_url: cli_args.base_url.clone(),
        bucket: cli_args.bucket.clone(),
        region: cli_args.region.clone(),
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    info!("Loading catalog from {:?}...", config.catalog_path);
    let catalog = load_catalog(&config.catalog_path, !cfg!(feature = "no_checks"))?;

    if cli_args.check_only {
        return Ok(());
    }

    let store = Arc::new(S3MusicStore::new(&config.region, &config.bucket).await);
    info!(
        "Music storage configured: bucket \"{}\" in {}",
        config.bucket, config.region
    );

    let payments = Arc::new(StripeClient::new(
        config.stripe_secret_key.clone(),
        config.stripe_webhook_secret.clone(),
        config.base_url.clone(),
    ));
    if config.stripe_secret_key.is_none() {
        warn!("STRIPE_SECRET_KEY is missing. Checkout will be unavailable.");
    }
    if config.stripe_webhook_secret.is_none() {
        warn!("STRIPE_WEBHOOK_SECRET is missing. Webhook events will be rejected.");
    }

    let mailer = Arc::new(ResendMailer::new(
        config.resend_api_key.clone(),
        config.contact_inbox.clone(),
    ));

    let tier_tokens = match &config.membership_secret {
        Some(secret) => Arc::new(TierTokens::new(secret.as_bytes())),
        None => {
            warn!("MEMBERSHIP_SECRET is missing. Tier sessions will not survive restarts.");
            Arc::new(TierTokens::ephemeral())
        }
    };

    info!("Ready to serve at port {}!", config.port);
    run_server(
        Arc::new(catalog),
        store,
        payments,
        mailer,
        tier_tokens,
        config.albums_prefix.clone(),
        config.logging_level.clone(),
        config.port,
        config.frontend_dir_path.clone(),
    )
    .await
}
