//! Offline catalog/bucket reconciliation tool.
//!
//! One-shot, single-threaded maintenance commands against the music bucket
//! and the spreadsheet-generated catalog file. Never part of the live
//! request path.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use singitpop_club_server::catalog::Album;
use singitpop_club_server::reconcile::{correct_catalog_urls, match_albums_to_folders};
use singitpop_club_server::storage::{ObjectStore, S3MusicStore};

#[derive(Parser, Debug)]
#[command(about = "Reconcile the album catalog against the music bucket")]
struct CliArgs {
    /// S3 bucket holding the music files.
    #[clap(long, default_value = "singitpop-music")]
    pub bucket: String,

    /// AWS region of the music bucket.
    #[clap(long, default_value = "eu-north-1")]
    pub region: String,

    /// Storage prefix the album folders live under.
    #[clap(long, default_value = "albums/")]
    pub prefix: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare catalog album titles against actual storage folders.
    Report {
        /// Path to the catalog JSON file.
        catalog: PathBuf,
    },
    /// Fix track filenames that drifted from the real bucket contents.
    FixFilenames {
        /// Path to the catalog JSON file.
        catalog: PathBuf,
        /// Rewrite the catalog file in place instead of only reporting.
        #[clap(long)]
        apply: bool,
    },
    /// Move nested audio files up to their album folder.
    Flatten,
}

fn read_albums(path: &PathBuf) -> Result<Vec<Album>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse catalog file: {}", path.display()))
}

/// Distinct album folder names directly under the prefix.
fn folders_of(keys: &[String], prefix: &str) -> Vec<String> {
    let mut folders = BTreeSet::new();
    for key in keys {
        if let Some(rest) = key.strip_prefix(prefix) {
            if let Some((folder, _)) = rest.split_once('/') {
                if !folder.is_empty() {
                    folders.insert(folder.to_string());
                }
            }
        }
    }
    folders.into_iter().collect()
}

/// Group keys by their `albums/<slug>/` prefix.
fn keys_by_album_prefix(keys: &[String], prefix: &str) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for key in keys {
        if let Some(rest) = key.strip_prefix(prefix) {
            if let Some((folder, _)) = rest.split_once('/') {
                grouped
                    .entry(format!("{}{}/", prefix, folder))
                    .or_default()
                    .push(key.clone());
            }
        }
    }
    grouped
}

async fn run_report(store: &S3MusicStore, prefix: &str, catalog_path: &PathBuf) -> Result<()> {
    let albums = read_albums(catalog_path)?;
    let titles: Vec<String> = albums.iter().map(|a| a.title.clone()).collect();

    let keys = store.list_keys(prefix).await?;
    let folders = folders_of(&keys, prefix);

    let report = match_albums_to_folders(&titles, &folders);

    println!("# Album/Folder Matching Report");
    println!();
    println!("- Catalog albums: {}", titles.len());
    println!("- Folders found: {}", folders.len());
    println!("- Matched: {}", report.matched.len());
    println!("- Unmatched albums: {}", report.unmatched_albums.len());
    println!("- Unmatched folders: {}", report.unmatched_folders.len());

    if !report.unmatched_albums.is_empty() {
        println!();
        println!("## Albums without folders");
        for album in &report.unmatched_albums {
            println!("- \"{}\"", album);
        }
    }

    if !report.unmatched_folders.is_empty() {
        println!();
        println!("## Folders without albums");
        for folder in &report.unmatched_folders {
            println!("- \"{}\"", folder);
        }
    }

    println!();
    println!("## Matched");
    for (album, folder) in &report.matched {
        println!("- \"{}\" -> \"{}\"", album, folder);
    }

    Ok(())
}

async fn run_fix_filenames(
    store: &S3MusicStore,
    prefix: &str,
    catalog_path: &PathBuf,
    apply: bool,
) -> Result<()> {
    let mut albums = read_albums(catalog_path)?;

    let keys = store.list_keys(prefix).await?;
    let grouped = keys_by_album_prefix(&keys, prefix);

    let report = correct_catalog_urls(&mut albums, &grouped);

    for (album_id, title, old, new) in &report.corrected {
        println!("Fixing [{}] {}: {} -> {}", album_id, title, old, new);
    }
    for (album_id, title, filename) in &report.unresolved {
        println!("No match found for [{}] {}: {}", album_id, title, filename);
    }
    println!(
        "{} corrected, {} unresolved",
        report.corrected.len(),
        report.unresolved.len()
    );

    if report.corrected.is_empty() {
        return Ok(());
    }

    if apply {
        let serialized = serde_json::to_string_pretty(&albums)?;
        std::fs::write(catalog_path, serialized)
            .with_context(|| format!("Failed to write {}", catalog_path.display()))?;
        info!("Updated {}", catalog_path.display());
    } else {
        info!("Run again with --apply to rewrite the catalog file.");
    }

    Ok(())
}

async fn run_flatten(store: &S3MusicStore, prefix: &str) -> Result<()> {
    let keys = store.list_keys(prefix).await?;

    let mut moved = 0usize;
    for key in &keys {
        if !key.ends_with(".mp3") && !key.ends_with(".wav") {
            continue;
        }
        let Some(rest) = key.strip_prefix(prefix) else {
            continue;
        };
        let parts: Vec<&str> = rest.split('/').collect();
        // Expected: album-slug / filename (2 parts).
        // Nested: album-slug / sub / ... / filename (3+ parts).
        if parts.len() <= 2 {
            continue;
        }
        let album_slug = parts[0];
        let filename = parts[parts.len() - 1];
        let new_key = format!("{}{}/{}", prefix, album_slug, filename);
        if *key == new_key {
            continue;
        }

        info!("Moving nested file: {} -> {}", key, new_key);
        store.move_object(key, &new_key).await?;
        moved += 1;
    }

    if moved == 0 {
        info!("No nested files found.");
    } else {
        info!("Moved {} files.", moved);
    }
    Ok(())
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

    let store = S3MusicStore::new(&cli_args.region, &cli_args.bucket).await;
    warn!(
        "Operating on bucket \"{}\" ({})",
        cli_args.bucket, cli_args.region
    );

    match &cli_args.command {
        Command::Report { catalog } => run_report(&store, &cli_args.prefix, catalog).await,
        Command::FixFilenames { catalog, apply } => {
            run_fix_filenames(&store, &cli_args.prefix, catalog, *apply).await
        }
        Command::Flatten => run_flatten(&store, &cli_args.prefix).await,
    }
}
