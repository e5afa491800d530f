//! Load driver: for each file under a root, transform then commit.

use super::files::enumerate_json_files;
use super::stats::{FileStats, LoadSummary};
use crate::error::LoadError;
use crate::warehouse::{SqliteWarehouseStore, WarehouseWriter};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::path::Path;
use tracing::{error, info};

/// Build the progress bar shown while a root is loaded.
pub fn progress_bar(label: &str, visible: bool) -> ProgressBar {
    let pb = ProgressBar::new(0);
    if visible {
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
    } else {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }
    pb.set_message(label.to_string());
    pb
}

/// Load every JSON file under `root` with `transform`, one transaction per file.
///
/// A file-level error rolls back that file only; any other error aborts.
pub fn process_data<F>(
    store: &mut SqliteWarehouseStore,
    root: &Path,
    transform: F,
    progress: &ProgressBar,
) -> Result<LoadSummary, LoadError>
where
    F: Fn(&dyn WarehouseWriter, &Path) -> Result<FileStats, LoadError>,
{
    let files = enumerate_json_files(root)?;
    let total = files.len();
    info!("{} files found in {}", total, root.display());

    progress.set_length(total as u64);
    progress.set_position(0);

    let mut summary = LoadSummary::new(root.to_path_buf(), total);
    for (i, path) in files.iter().enumerate() {
        let tx = store.begin_file()?;
        let writer: &dyn WarehouseWriter = &tx;
        match transform(writer, path) {
            Ok(stats) => {
                tx.commit()?;
                summary.files_loaded += 1;
                summary.rows += stats;
            }
            Err(err) if err.is_file_level() => {
                tx.rollback()?;
                error!("Skipping {}: {}", path.display(), err);
                summary.failed_files.push(path.clone());
            }
            Err(err) => return Err(err),
        }

        progress.inc(1);
        if progress.is_hidden() {
            info!("{}/{} files processed.", i + 1, total);
        }
    }
    progress.finish();

    info!(
        "Finished {}: {} loaded, {} failed",
        root.display(),
        summary.files_loaded,
        summary.failed_files.len()
    );
    Ok(summary)
}
