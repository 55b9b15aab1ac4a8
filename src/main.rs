// main.rs
use crate::config::Config;
use crate::table::PgTableWriter;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

mod columns;
mod config;
mod engine;
mod load_files;
mod table;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let cfg: Config = config::load_config()?;

    let engine = engine::get_engine(&cfg.db)?;
    let mut writer = PgTableWriter::new(engine);

    info!("Reading CSV files from {}...", cfg.data_dir.display());
    let report = load_files::load_csv_to_postgres(&cfg, &mut writer).await?;

    info!(
        tables = report.loaded.len(),
        rows = report.total_rows(),
        skipped_folders = report.skipped.len(),
        "All CSVs loaded successfully!"
    );

    Ok(())
}
