//! Song-play warehouse loader
//!
//! Loads the song catalog and the listening event logs into a star-schema
//! SQLite warehouse. The library exposes the modules for testing and reuse.

pub mod config;
pub mod error;
pub mod etl;
pub mod sqlite_persistence;
pub mod warehouse;

// Re-export commonly used types for convenience
pub use error::LoadError;
pub use etl::{process_catalog_file, process_data, process_event_file, LoadSummary};
pub use warehouse::{SqliteWarehouseStore, WarehouseWriter};
