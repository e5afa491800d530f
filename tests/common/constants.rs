//! Shared constants for end-to-end tests
//!
//! When the test catalog changes, update only this file.

// ============================================================================
// Test Catalog
// ============================================================================

pub const SONG_A_ID: &str = "SOAAAAA12A8C13A001";
pub const SONG_A_TITLE: &str = "Song A";
pub const SONG_A_DURATION: f64 = 210.5;

pub const ARTIST_X_ID: &str = "ARXXXXX1187B98C001";
pub const ARTIST_X_NAME: &str = "Artist X";

// ============================================================================
// Test Events
// ============================================================================

pub const USER_ID: i64 = 10;

/// 2018-11-01T21:01:46.796Z, a Thursday in ISO week 44
pub const PLAY_TS: i64 = 1_541_106_106_796;
pub const PLAY_START_TIME: &str = "2018-11-01T21:01:46.796Z";
