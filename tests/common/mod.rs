//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{catalog_record, TestWarehouse, SONG_A_ID};
//!
//! #[test]
//! fn test_load_song() {
//!     let mut warehouse = TestWarehouse::new();
//!     warehouse.write_catalog_file("A/song.json", &catalog_record(SONG_A_ID));
//!     warehouse.load_song_data();
//! }
//! ```

mod constants;
mod fixtures;

// Public API - this is what tests import
pub use constants::*;
pub use fixtures::{catalog_record, play_event, TestWarehouse};
