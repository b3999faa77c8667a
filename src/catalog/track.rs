use serde::{Deserialize, Serialize};

/// A single track as described by the spreadsheet-generated catalog file.
///
/// Track ids are only unique within their album; cross-album lookups by bare
/// id go through [`super::Catalog::resolve_track`].
#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: u32,
    pub title: String,
    pub duration: String,
    pub plays: String,
    pub locked: bool,
    pub price: f64,
    pub genre: String,
    pub audio_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_res_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_folder: Option<String>,
}
