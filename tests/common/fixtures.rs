//! Test fixtures: a temporary warehouse with its data roots.

use super::constants::*;
use rusqlite::Connection;
use serde_json::{json, Value};
use songplay_etl::etl::{progress_bar, LoadSummary};
use songplay_etl::{process_catalog_file, process_data, process_event_file, SqliteWarehouseStore};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Catalog record for "Song A" by "Artist X", with the given song id.
pub fn catalog_record(song_id: &str) -> Value {
    json!({
        "num_songs": 1,
        "artist_id": ARTIST_X_ID,
        "artist_latitude": 40.7,
        "artist_longitude": -74.0,
        "artist_location": "New York, NY",
        "artist_name": ARTIST_X_NAME,
        "song_id": song_id,
        "title": SONG_A_TITLE,
        "duration": SONG_A_DURATION,
        "year": 2004
    })
}

/// A "NextSong" event for user 10 playing "Song A" at `ts`.
pub fn play_event(ts: i64, level: &str) -> Value {
    json!({
        "artist": ARTIST_X_NAME,
        "auth": "Logged In",
        "firstName": "Walter",
        "gender": "M",
        "itemInSession": 0,
        "lastName": "Frye",
        "length": SONG_A_DURATION,
        "level": level,
        "location": "San Francisco-Oakland-Hayward, CA",
        "method": "PUT",
        "page": "NextSong",
        "registration": 1540919166796.0,
        "sessionId": 38,
        "song": SONG_A_TITLE,
        "status": 200,
        "ts": ts,
        "userAgent": "Mozilla/5.0",
        "userId": USER_ID.to_string()
    })
}

/// Warehouse database and data roots living in a temporary directory.
pub struct TestWarehouse {
    pub store: SqliteWarehouseStore,
    pub db_path: PathBuf,
    pub song_data: PathBuf,
    pub log_data: PathBuf,
    // Dropped last, after the store closed its connection.
    _dir: TempDir,
}

impl TestWarehouse {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let song_data = dir.path().join("song_data");
        let log_data = dir.path().join("log_data");
        fs::create_dir_all(&song_data).expect("Failed to create song_data");
        fs::create_dir_all(&log_data).expect("Failed to create log_data");

        let db_path = dir.path().join("sparkify.db");
        let mut store = SqliteWarehouseStore::open(&db_path).expect("Failed to open warehouse");
        store.reset_schema().expect("Failed to create schema");

        TestWarehouse {
            store,
            db_path,
            song_data,
            log_data,
            _dir: dir,
        }
    }

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(path, content).expect("Failed to write data file");
    }

    pub fn write_catalog_file(&self, relative: &str, record: &Value) {
        Self::write(&self.song_data, relative, &record.to_string());
    }

    pub fn write_raw_catalog_file(&self, relative: &str, content: &str) {
        Self::write(&self.song_data, relative, content);
    }

    /// Write events as JSON lines, the way the activity logs are produced.
    pub fn write_event_file(&self, relative: &str, events: &[Value]) {
        let lines: Vec<String> = events.iter().map(Value::to_string).collect();
        Self::write(&self.log_data, relative, &lines.join("\n"));
    }

    pub fn write_raw_event_file(&self, relative: &str, content: &str) {
        Self::write(&self.log_data, relative, content);
    }

    pub fn load_song_data(&mut self) -> LoadSummary {
        let root = self.song_data.clone();
        process_data(
            &mut self.store,
            &root,
            process_catalog_file,
            &progress_bar("song_data", false),
        )
        .expect("song_data load failed")
    }

    pub fn load_log_data(&mut self) -> LoadSummary {
        let root = self.log_data.clone();
        process_data(
            &mut self.store,
            &root,
            process_event_file,
            &progress_bar("log_data", false),
        )
        .expect("log_data load failed")
    }

    /// Separate read connection on the warehouse file.
    pub fn connection(&self) -> Connection {
        Connection::open(&self.db_path).expect("Failed to open read connection")
    }
}
