//! WarehouseWriter trait definition.
//!
//! Transformers receive a `&dyn WarehouseWriter` for the file they are
//! processing instead of reaching for a shared connection.

use super::models::{ArtistRow, SongMatch, SongPlayRow, SongRow, TimeRow, UserRow};
use rusqlite::Result;

/// Outcome of a keyed insert.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A row with the same key already existed and was left untouched.
    AlreadyPresent,
}

/// Write and lookup operations available while loading one file.
pub trait WarehouseWriter {
    // =========================================================================
    // Catalog
    // =========================================================================

    /// Insert a song. The first row written for a `song_id` wins.
    fn insert_song(&self, song: &SongRow) -> Result<InsertOutcome>;

    /// Insert an artist. The first row written for an `artist_id` wins.
    fn insert_artist(&self, artist: &ArtistRow) -> Result<InsertOutcome>;

    /// Find the song/artist pair matching title, artist name and exact
    /// duration. Ties resolve to the lowest `song_id`.
    fn find_song(&self, title: &str, artist_name: &str, duration: f64)
        -> Result<Option<SongMatch>>;

    // =========================================================================
    // Events
    // =========================================================================

    /// Insert or overwrite a user; every column takes the new value.
    fn upsert_user(&self, user: &UserRow) -> Result<()>;

    fn insert_time(&self, time: &TimeRow) -> Result<()>;

    /// Append a fact row, returning its `songplay_id`.
    fn insert_songplay(&self, songplay: &SongPlayRow) -> Result<i64>;
}
