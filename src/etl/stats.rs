use crate::warehouse::InsertOutcome;
use std::ops::AddAssign;
use std::path::PathBuf;

/// Row-level counters of one loaded file, or of a whole run once merged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileStats {
    pub songs_inserted: usize,
    pub artists_inserted: usize,
    /// Catalog rows whose key was already loaded.
    pub duplicates_skipped: usize,
    /// Log entries that are not song plays.
    pub events_filtered: usize,
    /// Song plays dropped because a mandatory field was missing or invalid.
    pub malformed_rows: usize,
    pub time_rows: usize,
    pub users_upserted: usize,
    pub songplays: usize,
    pub lookup_hits: usize,
    pub lookup_misses: usize,
}

impl FileStats {
    pub(crate) fn record_song(&mut self, outcome: InsertOutcome) {
        match outcome {
            InsertOutcome::Inserted => self.songs_inserted += 1,
            InsertOutcome::AlreadyPresent => self.duplicates_skipped += 1,
        }
    }

    pub(crate) fn record_artist(&mut self, outcome: InsertOutcome) {
        match outcome {
            InsertOutcome::Inserted => self.artists_inserted += 1,
            InsertOutcome::AlreadyPresent => self.duplicates_skipped += 1,
        }
    }
}

impl AddAssign for FileStats {
    fn add_assign(&mut self, other: Self) {
        self.songs_inserted += other.songs_inserted;
        self.artists_inserted += other.artists_inserted;
        self.duplicates_skipped += other.duplicates_skipped;
        self.events_filtered += other.events_filtered;
        self.malformed_rows += other.malformed_rows;
        self.time_rows += other.time_rows;
        self.users_upserted += other.users_upserted;
        self.songplays += other.songplays;
        self.lookup_hits += other.lookup_hits;
        self.lookup_misses += other.lookup_misses;
    }
}

/// Outcome of loading every file under one root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadSummary {
    pub root: PathBuf,
    pub files_found: usize,
    pub files_loaded: usize,
    /// Files rolled back because of a file-level error.
    pub failed_files: Vec<PathBuf>,
    pub rows: FileStats,
}

impl LoadSummary {
    pub fn new(root: PathBuf, files_found: usize) -> Self {
        LoadSummary {
            root,
            files_found,
            files_loaded: 0,
            failed_files: Vec::new(),
            rows: FileStats::default(),
        }
    }
}
