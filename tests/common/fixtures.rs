//! Test catalog fixtures.

use singitpop_club_server::catalog::{Album, Track};

pub const TEST_BUCKET: &str = "singitpop-music";
pub const WEBHOOK_SECRET: &str = "whsec_test123secret456";

fn audio_url(folder: &str, filename: &str) -> String {
    format!(
        "https://{}.s3.eu-north-1.amazonaws.com/albums/{}/{}",
        TEST_BUCKET, folder, filename
    )
}

fn track(id: u32, title: &str, folder: &str, filename: &str) -> Track {
    Track {
        id,
        title: title.to_string(),
        duration: "3:30".to_string(),
        plays: "0".to_string(),
        locked: false,
        price: 0.99,
        genre: "Pop".to_string(),
        audio_url: audio_url(folder, filename),
        high_res_url: None,
        source_folder: None,
    }
}

/// Two albums, four tracks. Track id 2 exists in both albums so the
/// bare-id scan has something ambiguous to resolve; there is no track 5
/// anywhere, matching the catalog-miss scenarios. The second album's id is
/// the numeric string "2", the shape the legacy spreadsheet produced, so
/// qualified ids like "2:7" exercise the album-qualified path.
pub fn test_albums() -> Vec<Album> {
    vec![
        Album {
            id: "first-album".to_string(),
            title: "First Album".to_string(),
            year: 2024,
            genre: vec!["Pop".to_string()],
            cover_art: "/albums/artwork/first-album.jpg".to_string(),
            tracks: vec![
                track(1, "Opening Act", "first-album", "01-opening-act.mp3"),
                track(2, "Second Wind", "first-album", "02-second-wind.mp3"),
            ],
            release_date: "2024-03-01".to_string(),
            description: None,
            featured: Some(true),
            trending: None,
        },
        Album {
            id: "2".to_string(),
            title: "Second Album".to_string(),
            year: 2025,
            genre: vec!["Country".to_string()],
            cover_art: "/albums/artwork/second-album.jpg".to_string(),
            tracks: vec![
                track(2, "Shadow Copy", "second-album", "02-shadow-copy.mp3"),
                track(7, "Lucky Seven", "second-album", "07-lucky-seven.mp3"),
            ],
            release_date: "2025-06-01".to_string(),
            description: None,
            featured: None,
            trending: Some(true),
        },
    ]
}
