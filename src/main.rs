use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use songplay_etl::config::{
    AppConfig, CliConfig, FileConfig, DEFAULT_DB_PATH, DEFAULT_LOG_DATA_DIR,
    DEFAULT_SONG_DATA_DIR,
};
use songplay_etl::etl::{progress_bar, LoadSummary};
use songplay_etl::{process_catalog_file, process_data, process_event_file, SqliteWarehouseStore};

#[derive(Parser, Debug)]
#[command(about = "Load song catalog and listening logs into the song-play warehouse")]
struct CliArgs {
    /// Path to the SQLite warehouse database file.
    #[clap(long, default_value = DEFAULT_DB_PATH)]
    pub db_path: PathBuf,

    /// Root directory of the song catalog JSON files.
    #[clap(long, default_value = DEFAULT_SONG_DATA_DIR)]
    pub song_data: PathBuf,

    /// Root directory of the listening event log files.
    #[clap(long, default_value = DEFAULT_LOG_DATA_DIR)]
    pub log_data: PathBuf,

    /// Keep the existing warehouse tables instead of dropping and recreating them.
    #[clap(long)]
    pub keep_existing: bool,

    /// Disable the progress bars.
    #[clap(long)]
    pub no_progress: bool,

    /// Path to a TOML config file. Its values override the CLI arguments.
    #[clap(long)]
    pub config: Option<PathBuf>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_path: self.db_path.clone(),
            song_data_dir: self.song_data.clone(),
            log_data_dir: self.log_data.clone(),
            keep_existing: self.keep_existing,
            no_progress: self.no_progress,
        }
    }
}

fn log_summary(label: &str, summary: &LoadSummary) {
    info!(
        "{}: {}/{} files loaded from {}",
        label,
        summary.files_loaded,
        summary.files_found,
        summary.root.display()
    );
    for path in &summary.failed_files {
        warn!("{}: skipped {}", label, path.display());
    }
    info!("{} rows: {:?}", label, summary.rows);
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    let mut store = SqliteWarehouseStore::open(&config.db_path)?;
    if config.keep_existing {
        store.ensure_schema()?;
    } else {
        store.reset_schema()?;
    }

    let songs = process_data(
        &mut store,
        &config.song_data_dir,
        process_catalog_file,
        &progress_bar("song_data", config.show_progress),
    )?;
    log_summary("song_data", &songs);

    let logs = process_data(
        &mut store,
        &config.log_data_dir,
        process_event_file,
        &progress_bar("log_data", config.show_progress),
    )?;
    log_summary("log_data", &logs);

    let counts = store.table_counts()?;
    info!(
        "Warehouse now holds {} songplays, {} users, {} songs, {} artists, {} time rows",
        counts.songplays, counts.users, counts.songs, counts.artists, counts.time
    );

    Ok(())
}
