//! Fuzzy filename correction against the real bucket contents.

use super::normalize;
use std::collections::HashMap;

/// Map normalized filename -> actual stored filename, audio files only.
pub fn build_normalized_map(filenames: &[String]) -> HashMap<String, String> {
    filenames
        .iter()
        .filter(|f| f.ends_with(".mp3") || f.ends_with(".wav"))
        .map(|f| (normalize(f), f.clone()))
        .collect()
}

#[derive(Debug, PartialEq, Eq)]
pub enum FilenameFix {
    /// The persisted filename matches a real object as-is.
    AlreadyCorrect,
    /// A real object matched after normalization (or after stripping the
    /// track-index prefix); the catalog should point at this name.
    Corrected(String),
    /// No confident match; a human decides.
    Unresolved,
}

/// Try to resolve `current` to an actual stored filename: exact match after
/// normalization first, then once more with a leading numeric track-index
/// prefix ("NN-") stripped.
pub fn correct_filename(current: &str, map: &HashMap<String, String>) -> FilenameFix {
    if let Some(actual) = map.get(&normalize(current)) {
        if actual == current {
            return FilenameFix::AlreadyCorrect;
        }
        return FilenameFix::Corrected(actual.clone());
    }

    let stripped = strip_track_index(current);
    if stripped != current {
        if let Some(actual) = map.get(&normalize(stripped)) {
            return FilenameFix::Corrected(actual.clone());
        }
    }

    FilenameFix::Unresolved
}

/// Strip a leading "<digits>-" track-index prefix, if present.
pub fn strip_track_index(name: &str) -> &str {
    let digits = name.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return name;
    }
    match name[digits..].strip_prefix('-') {
        Some(rest) => rest,
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_of(names: &[&str]) -> HashMap<String, String> {
        build_normalized_map(&names.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn exact_filename_is_already_correct() {
        let map = map_of(&["01-song.mp3"]);
        assert_eq!(
            correct_filename("01-song.mp3", &map),
            FilenameFix::AlreadyCorrect
        );
    }

    #[test]
    fn case_and_punctuation_drift_is_corrected() {
        let map = map_of(&["01-front-porch-valentine.mp3"]);
        assert_eq!(
            correct_filename("01-Front Porch Valentine.mp3", &map),
            FilenameFix::Corrected("01-front-porch-valentine.mp3".to_string())
        );
    }

    #[test]
    fn track_index_prefix_is_stripped_on_retry() {
        // Catalog says "01-song.mp3", bucket has "Song.mp3".
        let map = map_of(&["Song.mp3"]);
        assert_eq!(
            correct_filename("01-song.mp3", &map),
            FilenameFix::Corrected("Song.mp3".to_string())
        );
    }

    #[test]
    fn unrelated_names_stay_unresolved() {
        let map = map_of(&["something-else.mp3"]);
        assert_eq!(
            correct_filename("01-song.mp3", &map),
            FilenameFix::Unresolved
        );
    }

    #[test]
    fn only_audio_files_enter_the_map() {
        let map = map_of(&["cover.jpg", "01-song.mp3", "notes.txt"]);
        assert_eq!(map.len(), 1);
        assert!(map.contains_key(&normalize("01-song.mp3")));
    }

    #[test]
    fn strip_track_index_cases() {
        assert_eq!(strip_track_index("01-song.mp3"), "song.mp3");
        assert_eq!(strip_track_index("123-a-b.mp3"), "a-b.mp3");
        assert_eq!(strip_track_index("song.mp3"), "song.mp3");
        assert_eq!(strip_track_index("01song.mp3"), "01song.mp3");
        assert_eq!(strip_track_index("-song.mp3"), "-song.mp3");
    }
}
