//! Normalized album/folder name matching.

/// Lowercase and strip everything that is not a letter or digit.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Heuristic name match: one normalized name contains the other.
///
/// Tolerant of punctuation and case drift ("Rough Hands" matches
/// "rough-hands-2024"), intolerant of word reordering or abbreviation.
pub fn names_match(a: &str, b: &str) -> bool {
    let norm_a = normalize(a);
    let norm_b = normalize(b);
    if norm_a.is_empty() || norm_b.is_empty() {
        return false;
    }
    norm_a.contains(&norm_b) || norm_b.contains(&norm_a)
}

#[derive(Debug, Default)]
pub struct FolderMatchReport {
    pub matched: Vec<(String, String)>,
    pub unmatched_albums: Vec<String>,
    pub unmatched_folders: Vec<String>,
}

/// Pair album names with storage folders. Each album takes the first folder
/// it matches; leftovers on both sides are reported.
pub fn match_albums_to_folders(albums: &[String], folders: &[String]) -> FolderMatchReport {
    let mut report = FolderMatchReport::default();
    let mut remaining_folders: Vec<String> = folders.to_vec();

    for album in albums {
        let position = remaining_folders
            .iter()
            .position(|folder| names_match(album, folder));
        match position {
            Some(index) => {
                let folder = remaining_folders.remove(index);
                report.matched.push((album.clone(), folder));
            }
            None => report.unmatched_albums.push(album.clone()),
        }
    }

    report.unmatched_folders = remaining_folders;
    report
}
