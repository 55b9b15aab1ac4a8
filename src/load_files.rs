use crate::columns::{normalize_columns, table_name_for};
use crate::config::Config;
use crate::table::{TableRef, TableWriter};
use anyhow::Context;
use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What a run did, in load order.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<(TableRef, u64)>,
    pub skipped: Vec<PathBuf>,
}

impl LoadReport {
    pub fn total_rows(&self) -> u64 {
        self.loaded.iter().map(|(_, rows)| rows).sum()
    }
}

pub async fn load_csv_to_postgres<W: TableWriter>(cfg: &Config, writer: &mut W) -> anyhow::Result<LoadReport> {
    let mut report = LoadReport::default();

    for source in &cfg.sources {
        // 1. resolve the source folder, a missing one is only a warning
        let folder_path = cfg.data_dir.join(&source.folder);
        if !folder_path.exists() {
            warn!("Folder {} not found, skipping.", folder_path.display());
            report.skipped.push(folder_path);
            continue;
        }

        // 2. every `*.csv` in the folder goes to `schema.<lowercased stem>`
        for file in csv_files(&folder_path)? {
            let table = TableRef::new(source.schema.as_str(), file.table_name);
            let file_path = file.path;
            info!("Loading {} → {}", file.file_name, table);

            // 3. read and clean up the headers
            let mut df = read_csv(&file_path)
                .with_context(|| format!("failed to read {}", file_path.display()))?;
            normalize_columns(&mut df)
                .with_context(|| format!("failed to rename columns of {}", file_path.display()))?;

            // 4. replace the table wholesale
            let rows = writer
                .replace_table(&table, &mut df)
                .await
                .with_context(|| format!("failed to load {} into {}", file_path.display(), table))?;
            info!("Loaded {} rows into {}", rows, table);

            report.loaded.push((table, rows));
        }
    }

    Ok(report)
}

struct CsvFile {
    file_name: String,
    table_name: String,
    path: PathBuf,
}

/// Regular files ending in `.csv`, sorted by name.
fn csv_files(folder: &Path) -> anyhow::Result<Vec<CsvFile>> {
    let mut files = Vec::new();
    let entries =
        fs::read_dir(folder).with_context(|| format!("failed to list {}", folder.display()))?;
    for entry in entries {
        let entry = entry?;
        // follows symlinks, unlike `DirEntry::file_type`
        if !entry.path().is_file() {
            continue;
        }
        let Ok(file_name) = entry.file_name().into_string() else {
            continue;
        };
        if let Some(table_name) = table_name_for(&file_name) {
            files.push(CsvFile {
                file_name,
                table_name,
                path: entry.path(),
            });
        }
    }
    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(files)
}

/// Header row, comma delimiter, `"` quoting, UTF-8. Dtypes are inferred from
/// every row, so one late non-numeric value turns the column into text.
fn read_csv(path: &Path) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
}
