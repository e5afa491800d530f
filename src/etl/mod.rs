mod catalog;
mod driver;
mod events;
mod files;
mod source;
mod stats;

pub use catalog::process_catalog_file;
pub use driver::{process_data, progress_bar};
pub use events::{process_event_file, PlayEvent};
pub use files::enumerate_json_files;
pub use source::{is_song_play, CatalogRecord, EventRecord, NEXT_SONG_PAGE};
pub use stats::{FileStats, LoadSummary};
