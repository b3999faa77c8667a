//! Offline catalog/bucket reconciliation.
//!
//! Pure matching and correction logic lives here; the `cli-reconcile`
//! binary wires it to the real bucket listing and the catalog file.

mod filenames;
mod matching;

pub use filenames::{build_normalized_map, correct_filename, strip_track_index, FilenameFix};
pub use matching::{match_albums_to_folders, names_match, normalize, FolderMatchReport};

use crate::catalog::Album;
use crate::storage::parse_object_url;
use std::collections::{BTreeMap, HashMap};

/// Outcome of the filename-correction pass over the whole catalog.
///
/// Regenerated fully on each run; corrections are applied to the in-memory
/// albums, and the caller decides whether to persist them.
#[derive(Debug, Default)]
pub struct CorrectionReport {
    /// (album id, track title, old filename, new filename)
    pub corrected: Vec<(String, String, String, String)>,
    /// (album id, track title, filename) left for a human to decide.
    pub unresolved: Vec<(String, String, String)>,
}

/// Check every track's audio URL against the real files under its album
/// prefix, correcting filenames that only drifted in punctuation, case, or
/// a leading track-index prefix. Unresolved mismatches are reported, never
/// auto-corrected.
///
/// `keys_by_prefix` maps an album prefix (`albums/<slug>/`) to the object
/// keys actually present under it.
pub fn correct_catalog_urls(
    albums: &mut [Album],
    keys_by_prefix: &BTreeMap<String, Vec<String>>,
) -> CorrectionReport {
    let mut report = CorrectionReport::default();

    // Per-prefix normalized filename maps, built once.
    let maps: HashMap<&String, HashMap<String, String>> = keys_by_prefix
        .iter()
        .map(|(prefix, keys)| {
            let filenames: Vec<String> = keys
                .iter()
                .filter_map(|key| key.rsplit('/').next())
                .map(str::to_string)
                .collect();
            (prefix, build_normalized_map(&filenames))
        })
        .collect();

    for album in albums.iter_mut() {
        for track in album.tracks.iter_mut() {
            let Some(parsed) = parse_object_url(&track.audio_url) else {
                continue;
            };
            let Some((folder, filename)) = parsed.key.rsplit_once('/') else {
                continue;
            };
            let prefix = format!("{}/", folder);
            let Some(map) = maps.get(&prefix) else {
                report.unresolved.push((
                    album.id.clone(),
                    track.title.clone(),
                    filename.to_string(),
                ));
                continue;
            };

            match correct_filename(filename, map) {
                FilenameFix::AlreadyCorrect => {}
                FilenameFix::Corrected(actual) => {
                    let new_url = rewrite_url_filename(&track.audio_url, &actual);
                    report.corrected.push((
                        album.id.clone(),
                        track.title.clone(),
                        filename.to_string(),
                        actual,
                    ));
                    track.audio_url = new_url;
                }
                FilenameFix::Unresolved => {
                    report.unresolved.push((
                        album.id.clone(),
                        track.title.clone(),
                        filename.to_string(),
                    ));
                }
            }
        }
    }

    report
}

/// Replace the last path segment of a storage URL with `actual`,
/// percent-encoding it the way the generator scripts did.
fn rewrite_url_filename(url: &str, actual: &str) -> String {
    match url.rsplit_once('/') {
        Some((base, _)) => format!("{}/{}", base, urlencoding::encode(actual)),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Track;

    fn track(id: u32, title: &str, url: &str) -> Track {
        Track {
            id,
            title: title.to_string(),
            duration: "3:30".to_string(),
            plays: "0".to_string(),
            locked: false,
            price: 0.99,
            genre: "Pop".to_string(),
            audio_url: url.to_string(),
            high_res_url: None,
            source_folder: None,
        }
    }

    fn album(id: &str, tracks: Vec<Track>) -> Album {
        Album {
            id: id.to_string(),
            title: id.to_string(),
            year: 2024,
            genre: vec![],
            cover_art: String::new(),
            tracks,
            release_date: "2024-01-01".to_string(),
            description: None,
            featured: None,
            trending: None,
        }
    }

    #[test]
    fn corrects_drifted_filenames_and_reports_unresolved() {
        let mut albums = vec![album(
            "valentine-country-2026",
            vec![
                track(
                    1,
                    "Front Porch Valentine",
                    "https://singitpop-music.s3.eu-north-1.amazonaws.com/albums/valentine-country/01-Front%20Porch%20Valentine.mp3",
                ),
                track(
                    2,
                    "hold me like home",
                    "https://singitpop-music.s3.eu-north-1.amazonaws.com/albums/valentine-country/02-hold-me-like-home.mp3",
                ),
                track(
                    3,
                    "mystery",
                    "https://singitpop-music.s3.eu-north-1.amazonaws.com/albums/valentine-country/totally-different.mp3",
                ),
            ],
        )];

        let mut keys = BTreeMap::new();
        keys.insert(
            "albums/valentine-country/".to_string(),
            vec![
                "albums/valentine-country/01-front-porch-valentine.mp3".to_string(),
                "albums/valentine-country/02-hold-me-like-home.mp3".to_string(),
            ],
        );

        let report = correct_catalog_urls(&mut albums, &keys);

        assert_eq!(report.corrected.len(), 1);
        assert_eq!(report.corrected[0].2, "01-Front Porch Valentine.mp3");
        assert_eq!(report.corrected[0].3, "01-front-porch-valentine.mp3");
        assert_eq!(
            albums[0].tracks[0].audio_url,
            "https://singitpop-music.s3.eu-north-1.amazonaws.com/albums/valentine-country/01-front-porch-valentine.mp3"
        );

        // Exact match untouched.
        assert!(albums[0].tracks[1]
            .audio_url
            .ends_with("02-hold-me-like-home.mp3"));

        assert_eq!(report.unresolved.len(), 1);
        assert_eq!(report.unresolved[0].2, "totally-different.mp3");
    }

    #[test]
    fn albums_without_listed_prefix_are_unresolved() {
        let mut albums = vec![album(
            "lost",
            vec![track(
                1,
                "gone",
                "https://singitpop-music.s3.eu-north-1.amazonaws.com/albums/lost/01-gone.mp3",
            )],
        )];
        let keys = BTreeMap::new();

        let report = correct_catalog_urls(&mut albums, &keys);
        assert!(report.corrected.is_empty());
        assert_eq!(report.unresolved.len(), 1);
    }
}
