//! Catalog transformer: one song file becomes one song row and one artist row.

use super::source::{parse_json_values, read_source, CatalogRecord};
use super::stats::FileStats;
use crate::error::LoadError;
use crate::warehouse::WarehouseWriter;
use std::path::Path;
use tracing::debug;

fn parse_catalog_record(text: &str) -> Result<CatalogRecord, String> {
    let mut values = parse_json_values(text).map_err(|e| e.to_string())?;
    if values.len() != 1 {
        return Err(format!(
            "expected exactly one record, found {}",
            values.len()
        ));
    }
    serde_json::from_value(values.remove(0)).map_err(|e| e.to_string())
}

/// Load one catalog file through `writer`. Does not commit.
pub fn process_catalog_file(
    writer: &dyn WarehouseWriter,
    path: &Path,
) -> Result<FileStats, LoadError> {
    let text = read_source(path)?;
    let record =
        parse_catalog_record(&text).map_err(|reason| LoadError::MalformedCatalogRecord {
            path: path.to_path_buf(),
            reason,
        })?;

    let mut stats = FileStats::default();
    stats.record_song(writer.insert_song(&record.song_row())?);
    stats.record_artist(writer.insert_artist(&record.artist_row())?);

    debug!(
        "Loaded song {} ({}) by artist {}",
        record.song_id, record.title, record.artist_id
    );
    Ok(stats)
}
