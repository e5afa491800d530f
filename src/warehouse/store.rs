//! SQLite-backed warehouse store.
//!
//! `SqliteWarehouseStore` owns the single connection of a run. Every source
//! file is loaded inside its own [`FileTransaction`], which is the only
//! handle the transformers ever see.

use super::models::*;
use super::schema::{table_names, WAREHOUSE_SCHEMA};
use super::trait_def::{InsertOutcome, WarehouseWriter};
use crate::error::LoadError;
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::path::Path;
use tracing::{debug, info};

pub struct SqliteWarehouseStore {
    conn: Connection,
}

impl SqliteWarehouseStore {
    /// Open (or create) the warehouse database file.
    ///
    /// The schema is left untouched; call [`ensure_schema`](Self::ensure_schema)
    /// or [`reset_schema`](Self::reset_schema) before loading.
    pub fn open<P: AsRef<Path>>(db_path: P) -> std::result::Result<Self, LoadError> {
        let path = db_path.as_ref();
        let connection_error = |source| LoadError::Connection {
            path: path.to_path_buf(),
            source,
        };

        let conn = Connection::open(path).map_err(connection_error)?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(connection_error)?;

        info!("Opened warehouse database at {:?}", path);
        Ok(SqliteWarehouseStore { conn })
    }

    pub fn open_in_memory() -> std::result::Result<Self, LoadError> {
        let conn = Connection::open_in_memory().map_err(|source| LoadError::Connection {
            path: ":memory:".into(),
            source,
        })?;
        Ok(SqliteWarehouseStore { conn })
    }

    /// Create the schema on an empty database, validate it otherwise.
    pub fn ensure_schema(&self) -> Result<()> {
        let table_count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
            [],
            |r| r.get(0),
        )?;

        if table_count == 0 {
            info!(
                "Creating warehouse schema at version {}",
                WAREHOUSE_SCHEMA.version
            );
            WAREHOUSE_SCHEMA.create(&self.conn)?;
            return Ok(());
        }

        WAREHOUSE_SCHEMA
            .validate(&self.conn)
            .context("Warehouse schema validation failed, run without --keep-existing to recreate it")
    }

    /// Drop and recreate every warehouse table.
    pub fn reset_schema(&mut self) -> Result<()> {
        info!("Dropping and recreating warehouse tables");
        let tx = self.conn.transaction()?;
        WAREHOUSE_SCHEMA.drop(&tx)?;
        WAREHOUSE_SCHEMA.create(&tx)?;
        tx.commit()?;
        Ok(())
    }

    /// Start the transaction that holds every row derived from one file.
    pub fn begin_file(&mut self) -> std::result::Result<FileTransaction<'_>, LoadError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        Ok(FileTransaction { tx })
    }

    pub fn table_counts(&self) -> Result<TableCounts> {
        let mut counts = TableCounts::default();
        for table in table_names() {
            let count: i64 =
                self.conn
                    .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| {
                        r.get(0)
                    })?;
            let count = count as usize;
            match table {
                "songplays" => counts.songplays = count,
                "users" => counts.users = count,
                "songs" => counts.songs = count,
                "artists" => counts.artists = count,
                "time" => counts.time = count,
                _ => {}
            }
        }
        Ok(counts)
    }
}

/// Transaction scoped to one source file.
///
/// Dropping it without [`commit`](Self::commit) rolls every statement back.
pub struct FileTransaction<'conn> {
    tx: Transaction<'conn>,
}

impl FileTransaction<'_> {
    pub fn commit(self) -> rusqlite::Result<()> {
        self.tx.commit()
    }

    pub fn rollback(self) -> rusqlite::Result<()> {
        self.tx.rollback()
    }

    fn insert_outcome(changed: usize) -> InsertOutcome {
        if changed == 0 {
            InsertOutcome::AlreadyPresent
        } else {
            InsertOutcome::Inserted
        }
    }
}

impl WarehouseWriter for FileTransaction<'_> {
    fn insert_song(&self, song: &SongRow) -> rusqlite::Result<InsertOutcome> {
        let mut stmt = self.tx.prepare_cached(
            "INSERT INTO songs (song_id, title, artist_id, year, duration)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(song_id) DO NOTHING",
        )?;
        let changed = stmt.execute(params![
            &song.song_id,
            &song.title,
            &song.artist_id,
            song.year,
            song.duration
        ])?;
        Ok(Self::insert_outcome(changed))
    }

    fn insert_artist(&self, artist: &ArtistRow) -> rusqlite::Result<InsertOutcome> {
        let mut stmt = self.tx.prepare_cached(
            "INSERT INTO artists (artist_id, name, location, latitude, longitude)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(artist_id) DO NOTHING",
        )?;
        let changed = stmt.execute(params![
            &artist.artist_id,
            &artist.name,
            &artist.location,
            artist.latitude,
            artist.longitude
        ])?;
        Ok(Self::insert_outcome(changed))
    }

    fn find_song(
        &self,
        title: &str,
        artist_name: &str,
        duration: f64,
    ) -> rusqlite::Result<Option<SongMatch>> {
        let mut stmt = self.tx.prepare_cached(
            "SELECT s.song_id, a.artist_id
             FROM songs s
             JOIN artists a ON s.artist_id = a.artist_id
             WHERE s.title = ?1 AND a.name = ?2 AND s.duration = ?3
             ORDER BY s.song_id ASC
             LIMIT 1",
        )?;
        let found = stmt
            .query_row(params![title, artist_name, duration], |row| {
                Ok(SongMatch {
                    song_id: row.get(0)?,
                    artist_id: row.get(1)?,
                })
            })
            .optional()?;
        if found.is_none() {
            debug!(
                "No catalog match for {:?} by {:?} ({})",
                title, artist_name, duration
            );
        }
        Ok(found)
    }

    fn upsert_user(&self, user: &UserRow) -> rusqlite::Result<()> {
        let mut stmt = self.tx.prepare_cached(
            "INSERT INTO users (user_id, first_name, last_name, gender, level)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id) DO UPDATE SET
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                gender = excluded.gender,
                level = excluded.level",
        )?;
        stmt.execute(params![
            user.user_id,
            &user.first_name,
            &user.last_name,
            &user.gender,
            user.level.map(|l| l.to_db_str())
        ])?;
        Ok(())
    }

    fn insert_time(&self, time: &TimeRow) -> rusqlite::Result<()> {
        let mut stmt = self.tx.prepare_cached(
            "INSERT INTO time (start_time, hour, day, week, month, year, weekday)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        stmt.execute(params![
            format_timestamp(&time.start_time),
            time.hour,
            time.day,
            time.week,
            time.month,
            time.year,
            time.weekday
        ])?;
        Ok(())
    }

    fn insert_songplay(&self, songplay: &SongPlayRow) -> rusqlite::Result<i64> {
        let mut stmt = self.tx.prepare_cached(
            "INSERT INTO songplays
                (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        let (song_id, artist_id) = match &songplay.song {
            Some(m) => (Some(m.song_id.as_str()), Some(m.artist_id.as_str())),
            None => (None, None),
        };
        stmt.execute(params![
            format_timestamp(&songplay.start_time),
            songplay.user_id,
            songplay.level.map(|l| l.to_db_str()),
            song_id,
            artist_id,
            songplay.session_id,
            &songplay.location,
            &songplay.user_agent
        ])?;
        Ok(self.tx.last_insert_rowid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn store() -> SqliteWarehouseStore {
        let store = SqliteWarehouseStore::open_in_memory().unwrap();
        store.ensure_schema().unwrap();
        store
    }

    fn song(song_id: &str, title: &str, artist_id: &str, duration: f64) -> SongRow {
        SongRow {
            song_id: song_id.to_string(),
            title: title.to_string(),
            artist_id: artist_id.to_string(),
            year: 2004,
            duration,
        }
    }

    fn artist(artist_id: &str, name: &str) -> ArtistRow {
        ArtistRow {
            artist_id: artist_id.to_string(),
            name: name.to_string(),
            location: Some("Berlin".to_string()),
            latitude: Some(52.52),
            longitude: None,
        }
    }

    fn user(user_id: i64, first_name: &str, level: UserLevel) -> UserRow {
        UserRow {
            user_id,
            first_name: Some(first_name.to_string()),
            last_name: Some("Cruz".to_string()),
            gender: Some("F".to_string()),
            level: Some(level),
        }
    }

    #[test]
    fn test_song_and_artist_insert_first_wins() {
        let mut store = store();
        let tx = store.begin_file().unwrap();

        assert_eq!(
            tx.insert_song(&song("S1", "Song A", "AR1", 210.5)).unwrap(),
            InsertOutcome::Inserted
        );
        assert_eq!(
            tx.insert_song(&song("S1", "Other title", "AR1", 1.0))
                .unwrap(),
            InsertOutcome::AlreadyPresent
        );
        assert_eq!(
            tx.insert_artist(&artist("AR1", "Artist X")).unwrap(),
            InsertOutcome::Inserted
        );
        assert_eq!(
            tx.insert_artist(&artist("AR1", "Artist Y")).unwrap(),
            InsertOutcome::AlreadyPresent
        );
        tx.commit().unwrap();

        let title: String = store
            .conn
            .query_row("SELECT title FROM songs WHERE song_id = 'S1'", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(title, "Song A");
        let counts = store.table_counts().unwrap();
        assert_eq!(counts.songs, 1);
        assert_eq!(counts.artists, 1);
    }

    #[test]
    fn test_find_song_exact_match_only() {
        let mut store = store();
        let tx = store.begin_file().unwrap();
        tx.insert_song(&song("S1", "Song A", "AR1", 210.5)).unwrap();
        tx.insert_artist(&artist("AR1", "Artist X")).unwrap();

        assert_eq!(
            tx.find_song("Song A", "Artist X", 210.5).unwrap(),
            Some(SongMatch {
                song_id: "S1".to_string(),
                artist_id: "AR1".to_string()
            })
        );
        assert_eq!(tx.find_song("Song A", "Artist X", 210.50001).unwrap(), None);
        assert_eq!(tx.find_song("Song A", "Artist Y", 210.5).unwrap(), None);
        assert_eq!(tx.find_song("Song B", "Artist X", 210.5).unwrap(), None);
    }

    #[test]
    fn test_find_song_requires_both_song_and_artist() {
        let mut store = store();
        let tx = store.begin_file().unwrap();
        tx.insert_song(&song("S1", "Song A", "AR1", 210.5)).unwrap();

        assert_eq!(tx.find_song("Song A", "Artist X", 210.5).unwrap(), None);
    }

    #[test]
    fn test_find_song_tie_break_lowest_song_id() {
        let mut store = store();
        let tx = store.begin_file().unwrap();
        tx.insert_artist(&artist("AR1", "Artist X")).unwrap();
        tx.insert_song(&song("S9", "Song A", "AR1", 210.5)).unwrap();
        tx.insert_song(&song("S2", "Song A", "AR1", 210.5)).unwrap();
        tx.insert_song(&song("S5", "Song A", "AR1", 210.5)).unwrap();

        let found = tx.find_song("Song A", "Artist X", 210.5).unwrap().unwrap();
        assert_eq!(found.song_id, "S2");
    }

    #[test]
    fn test_upsert_user_last_write_wins() {
        let mut store = store();
        let tx = store.begin_file().unwrap();
        tx.upsert_user(&user(10, "Sylvie", UserLevel::Free)).unwrap();
        tx.upsert_user(&user(10, "Sylvie", UserLevel::Free)).unwrap();
        tx.commit().unwrap();

        let tx = store.begin_file().unwrap();
        tx.upsert_user(&UserRow {
            user_id: 10,
            first_name: Some("Sylvia".to_string()),
            last_name: None,
            gender: Some("F".to_string()),
            level: Some(UserLevel::Paid),
        })
        .unwrap();
        tx.commit().unwrap();

        let (count, first_name, last_name, level): (i64, String, Option<String>, String) = store
            .conn
            .query_row(
                "SELECT COUNT(*), first_name, last_name, level FROM users",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
            )
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(first_name, "Sylvia");
        assert_eq!(last_name, None);
        assert_eq!(level, "paid");
    }

    #[test]
    fn test_insert_songplay_with_and_without_match() {
        let mut store = store();
        let tx = store.begin_file().unwrap();
        let start_time = Utc.timestamp_millis_opt(1541106106796).unwrap();
        let base = SongPlayRow {
            start_time,
            user_id: 8,
            level: Some(UserLevel::Free),
            song: None,
            session_id: Some(139),
            location: Some("Phoenix-Mesa-Scottsdale, AZ".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
        };

        let first = tx.insert_songplay(&base).unwrap();
        let second = tx
            .insert_songplay(&SongPlayRow {
                song: Some(SongMatch {
                    song_id: "S1".to_string(),
                    artist_id: "AR1".to_string(),
                }),
                ..base.clone()
            })
            .unwrap();
        assert!(second > first);
        tx.commit().unwrap();

        let rows: Vec<(String, Option<String>, Option<String>)> = store
            .conn
            .prepare("SELECT start_time, song_id, artist_id FROM songplays ORDER BY songplay_id")
            .unwrap()
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        assert_eq!(
            rows,
            vec![
                ("2018-11-01T21:01:46.796Z".to_string(), None, None),
                (
                    "2018-11-01T21:01:46.796Z".to_string(),
                    Some("S1".to_string()),
                    Some("AR1".to_string())
                ),
            ]
        );
    }

    #[test]
    fn test_dropped_transaction_rolls_back() {
        let mut store = store();
        {
            let tx = store.begin_file().unwrap();
            tx.insert_song(&song("S1", "Song A", "AR1", 210.5)).unwrap();
        }
        assert_eq!(store.table_counts().unwrap().songs, 0);
    }

    #[test]
    fn test_reset_schema_empties_tables() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("warehouse.db");

        let mut store = SqliteWarehouseStore::open(&db_path).unwrap();
        store.ensure_schema().unwrap();
        let tx = store.begin_file().unwrap();
        tx.insert_song(&song("S1", "Song A", "AR1", 210.5)).unwrap();
        tx.commit().unwrap();
        drop(store);

        let mut store = SqliteWarehouseStore::open(&db_path).unwrap();
        store.ensure_schema().unwrap();
        assert_eq!(store.table_counts().unwrap().songs, 1);

        store.reset_schema().unwrap();
        assert_eq!(store.table_counts().unwrap(), TableCounts::default());
        WAREHOUSE_SCHEMA.validate(&store.conn).unwrap();
    }

    #[test]
    fn test_ensure_schema_rejects_foreign_tables() {
        let store = SqliteWarehouseStore::open_in_memory().unwrap();
        store
            .conn
            .execute("CREATE TABLE songs (id INTEGER PRIMARY KEY)", [])
            .unwrap();

        assert!(store.ensure_schema().is_err());
    }

    #[test]
    fn test_open_unreachable_path_is_connection_error() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("missing").join("warehouse.db");

        let err = SqliteWarehouseStore::open(&db_path).err().unwrap();
        assert!(matches!(err, LoadError::Connection { .. }));
    }
}
