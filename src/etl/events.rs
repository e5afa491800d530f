//! Event transformer: one activity log becomes time, user and song-play rows.
//!
//! Rows are written in three passes over the retained plays: every time row
//! first, then the user upserts, then the fact rows with their catalog
//! lookup. Each play converts its `ts` exactly once, and both the time row
//! and the fact row reuse that value.

use super::source::{is_song_play, parse_json_values, read_source, EventRecord};
use super::stats::FileStats;
use crate::error::LoadError;
use crate::warehouse::{SongMatch, SongPlayRow, TimeRow, UserRow, WarehouseWriter};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

/// A retained song play with its converted timestamp.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayEvent {
    pub start_time: DateTime<Utc>,
    pub record: EventRecord,
}

impl PlayEvent {
    fn from_value(index: usize, value: Value) -> Result<Self, LoadError> {
        let malformed = |reason: String| LoadError::MalformedEventRecord { index, reason };

        let record: EventRecord =
            serde_json::from_value(value).map_err(|e| malformed(e.to_string()))?;
        let start_time = Utc
            .timestamp_millis_opt(record.ts)
            .single()
            .ok_or_else(|| malformed(format!("timestamp {} out of range", record.ts)))?;

        Ok(PlayEvent { start_time, record })
    }

    pub fn time_row(&self) -> TimeRow {
        TimeRow::from_timestamp(self.start_time)
    }

    pub fn user_row(&self) -> UserRow {
        UserRow {
            user_id: self.record.user_id,
            first_name: self.record.first_name.clone(),
            last_name: self.record.last_name.clone(),
            gender: self.record.gender.clone(),
            level: self.record.level,
        }
    }

    pub fn songplay_row(&self, song: Option<SongMatch>) -> SongPlayRow {
        SongPlayRow {
            start_time: self.start_time,
            user_id: self.record.user_id,
            level: self.record.level,
            song,
            session_id: self.record.session_id,
            location: self.record.location.clone(),
            user_agent: self.record.user_agent.clone(),
        }
    }
}

/// Keep the song plays of a log, dropping malformed ones.
fn collect_plays(path: &Path, values: Vec<Value>, stats: &mut FileStats) -> Vec<PlayEvent> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            if !is_song_play(&value) {
                stats.events_filtered += 1;
                return None;
            }
            match PlayEvent::from_value(index, value) {
                Ok(play) => Some(play),
                Err(err) => {
                    warn!("Skipping record in {}: {}", path.display(), err);
                    stats.malformed_rows += 1;
                    None
                }
            }
        })
        .collect()
}

/// Load one activity log through `writer`. Does not commit.
pub fn process_event_file(
    writer: &dyn WarehouseWriter,
    path: &Path,
) -> Result<FileStats, LoadError> {
    let text = read_source(path)?;
    let values = parse_json_values(&text).map_err(|e| LoadError::MalformedEventLog {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut stats = FileStats::default();
    let plays = collect_plays(path, values, &mut stats);

    for play in &plays {
        writer.insert_time(&play.time_row())?;
        stats.time_rows += 1;
    }

    for play in &plays {
        writer.upsert_user(&play.user_row())?;
        stats.users_upserted += 1;
    }

    for play in &plays {
        let song = writer.find_song(&play.record.song, &play.record.artist, play.record.length)?;
        if song.is_some() {
            stats.lookup_hits += 1;
        } else {
            stats.lookup_misses += 1;
        }
        writer.insert_songplay(&play.songplay_row(song))?;
        stats.songplays += 1;
    }

    debug!(
        "{}: {} plays, {} filtered, {} malformed",
        path.display(),
        stats.songplays,
        stats.events_filtered,
        stats.malformed_rows
    );
    Ok(stats)
}
