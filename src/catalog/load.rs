//! Catalog loading from the spreadsheet-generated JSON file.

use super::{Album, Catalog};
use anyhow::{bail, Context, Result};
use std::path::Path;
use tracing::info;

/// Load and parse the catalog file, optionally running integrity checks.
///
/// Problems found by the checks are logged but non-fatal; the reconciler
/// exists precisely because the catalog and the bucket drift apart.
pub fn load_catalog<P: AsRef<Path>>(path: P, check: bool) -> Result<Catalog> {
    let path = path.as_ref();
    let file_text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
    let albums: Vec<Album> = serde_json::from_str(&file_text)
        .with_context(|| format!("Failed to parse catalog file: {}", path.display()))?;

    let result = Catalog::build(albums);

    if check {
        if !result.problems.is_empty() {
            info!("Found {} problems:", result.problems.len());
            for problem in result.problems.iter() {
                info!("- {:?}", problem);
            }
        }
    } else {
        info!("Skipping catalog checks.");
    }

    match (&result.catalog, result.problems.is_empty()) {
        (Some(_), true) => info!("Catalog checked, no issues found."),
        (Some(_), false) => info!(
            "Catalog was built, but check the {} non-fatal issues above.",
            result.problems.len()
        ),
        (None, _) => info!("The catalog could not be initialized."),
    }

    if let Some(catalog) = result.catalog {
        info!(
            "Catalog has {} albums, {} tracks",
            catalog.get_albums_count(),
            catalog.get_tracks_count()
        );
        return Ok(catalog);
    }

    bail!("Could not load catalog from {}", path.display())
}
