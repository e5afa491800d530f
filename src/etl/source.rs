//! Source record shapes and JSON file reading.

use crate::error::LoadError;
use crate::warehouse::{ArtistRow, SongRow, UserLevel};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

/// Page value of the events that represent a song being played.
pub const NEXT_SONG_PAGE: &str = "NextSong";

/// One song and its artist, as stored in a catalog file.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct CatalogRecord {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub artist_name: String,
    pub artist_location: Option<String>,
    pub artist_latitude: Option<f64>,
    pub artist_longitude: Option<f64>,
    pub duration: f64,
    pub year: i32,
}

impl CatalogRecord {
    pub fn song_row(&self) -> SongRow {
        SongRow {
            song_id: self.song_id.clone(),
            title: self.title.clone(),
            artist_id: self.artist_id.clone(),
            year: self.year,
            duration: self.duration,
        }
    }

    pub fn artist_row(&self) -> ArtistRow {
        ArtistRow {
            artist_id: self.artist_id.clone(),
            name: self.artist_name.clone(),
            location: self.artist_location.clone(),
            latitude: self.artist_latitude,
            longitude: self.artist_longitude,
        }
    }
}

/// A "NextSong" event from the activity log.
///
/// Only the fields needed to build the warehouse rows are kept; `ts`,
/// `userId`, `song`, `artist` and `length` are mandatory.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub ts: i64,
    #[serde(deserialize_with = "deserialize_user_id")]
    pub user_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<UserLevel>,
    pub song: String,
    pub artist: String,
    pub length: f64,
    pub session_id: Option<i64>,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrString {
    Int(i64),
    Str(String),
}

// The log producer writes user ids as strings ("10"), older dumps as numbers.
fn deserialize_user_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match IntOrString::deserialize(deserializer)? {
        IntOrString::Int(id) => Ok(id),
        IntOrString::Str(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid userId {:?}", s))),
    }
}

/// Whether a raw log entry is a song play.
pub fn is_song_play(value: &Value) -> bool {
    value.get("page").and_then(Value::as_str) == Some(NEXT_SONG_PAGE)
}

pub(crate) fn read_source(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::UnreadableFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse either a JSON array or a stream of concatenated / newline
/// separated JSON values.
pub(crate) fn parse_json_values(text: &str) -> serde_json::Result<Vec<Value>> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed);
    }
    serde_json::Deserializer::from_str(text)
        .into_iter::<Value>()
        .collect()
}
