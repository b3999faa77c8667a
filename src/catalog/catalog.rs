use super::{Album, Track};
use std::collections::HashSet;

/// Non-fatal issues detected while building the catalog.
#[derive(Debug)]
pub enum Problem {
    DuplicateAlbumId(String),
    DuplicateTrackId { album_id: String, track_id: u32 },
    EmptyAudioUrl { album_id: String, track_id: u32 },
}

pub struct CatalogBuildResult {
    pub catalog: Option<Catalog>,
    pub problems: Vec<Problem>,
}

/// The static album catalog, loaded once at startup and never mutated at
/// runtime. Edits happen offline through the reconciler, which rewrites the
/// source file the catalog was loaded from.
#[derive(Debug)]
pub struct Catalog {
    albums: Vec<Album>,
}

impl Catalog {
    pub fn build(albums: Vec<Album>) -> CatalogBuildResult {
        let mut problems = Vec::new();

        let mut seen_album_ids = HashSet::new();
        for album in albums.iter() {
            if !seen_album_ids.insert(album.id.clone()) {
                problems.push(Problem::DuplicateAlbumId(album.id.clone()));
            }

            let mut seen_track_ids = HashSet::new();
            for track in album.tracks.iter() {
                if !seen_track_ids.insert(track.id) {
                    problems.push(Problem::DuplicateTrackId {
                        album_id: album.id.clone(),
                        track_id: track.id,
                    });
                }
                if track.audio_url.trim().is_empty() {
                    problems.push(Problem::EmptyAudioUrl {
                        album_id: album.id.clone(),
                        track_id: track.id,
                    });
                }
            }
        }

        CatalogBuildResult {
            catalog: Some(Catalog { albums }),
            problems,
        }
    }

    pub fn albums(&self) -> &[Album] {
        &self.albums
    }

    pub fn get_album(&self, id: &str) -> Option<&Album> {
        self.albums.iter().find(|a| a.id == id)
    }

    /// Resolve a raw purchase identifier to a track.
    ///
    /// Accepts either an `"album-id:track-id"` composite, looked up within
    /// that album only, or a bare numeric id, which scans every album in
    /// catalog order and returns the first track with that id. Track ids are
    /// not globally unique, so the bare form is ambiguous by construction;
    /// composite ids are preferred wherever the caller has them.
    pub fn resolve_track(&self, raw_id: &str) -> Option<(&Album, &Track)> {
        match raw_id.split_once(':') {
            Some((album_id, track_id)) => {
                let track_id: u32 = track_id.trim().parse().ok()?;
                let album = self.get_album(album_id.trim())?;
                album
                    .tracks
                    .iter()
                    .find(|t| t.id == track_id)
                    .map(|t| (album, t))
            }
            None => {
                let track_id: u32 = raw_id.trim().parse().ok()?;
                for album in self.albums.iter() {
                    if let Some(track) = album.tracks.iter().find(|t| t.id == track_id) {
                        return Some((album, track));
                    }
                }
                None
            }
        }
    }

    pub fn get_albums_count(&self) -> usize {
        self.albums.len()
    }

    pub fn get_tracks_count(&self) -> usize {
        self.albums.iter().map(|a| a.tracks.len()).sum()
    }
}
