//! Row models for the warehouse tables.
//!
//! Each struct maps one-to-one onto a table row. The transformers in
//! `crate::etl` build them, a [`WarehouseWriter`](super::WarehouseWriter)
//! persists them.

use chrono::{DateTime, Datelike, SecondsFormat, Timelike, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Enumerations
// =============================================================================

/// Subscription level of a user at the time of an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserLevel {
    Free,
    Paid,
}

impl UserLevel {
    /// Convert from database string representation
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "free" => Some(UserLevel::Free),
            "paid" => Some(UserLevel::Paid),
            _ => None,
        }
    }

    /// Convert to database string representation
    pub fn to_db_str(&self) -> &'static str {
        match self {
            UserLevel::Free => "free",
            UserLevel::Paid => "paid",
        }
    }
}

// =============================================================================
// Catalog Rows
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct SongRow {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: i32,
    pub duration: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArtistRow {
    pub artist_id: String,
    pub name: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// The (song, artist) key pair resolved by a catalog lookup.
///
/// Both ids travel together so a fact row can never carry only one of them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SongMatch {
    pub song_id: String,
    pub artist_id: String,
}

// =============================================================================
// Event-derived Rows
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRow {
    pub user_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<UserLevel>,
}

/// A time-dimension row.
///
/// Calendar convention: UTC, ISO-8601 week number, weekday counted from
/// Monday = 0, `year` is the calendar year of the date (not the ISO week-year).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeRow {
    pub start_time: DateTime<Utc>,
    pub hour: u32,
    pub day: u32,
    pub week: u32,
    pub month: u32,
    pub year: i32,
    pub weekday: u32,
}

impl TimeRow {
    pub fn from_timestamp(start_time: DateTime<Utc>) -> Self {
        TimeRow {
            start_time,
            hour: start_time.hour(),
            day: start_time.day(),
            week: start_time.iso_week().week(),
            month: start_time.month(),
            year: start_time.year(),
            weekday: start_time.weekday().num_days_from_monday(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SongPlayRow {
    pub start_time: DateTime<Utc>,
    pub user_id: i64,
    pub level: Option<UserLevel>,
    pub song: Option<SongMatch>,
    pub session_id: Option<i64>,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

/// Row counts of every warehouse table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub songplays: usize,
    pub users: usize,
    pub songs: usize,
    pub artists: usize,
    pub time: usize,
}

/// Formats a timestamp the way it is stored in `start_time` columns.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}
