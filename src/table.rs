use anyhow::Context;
use polars::prelude::*;
use sqlx::PgPool;
use std::fmt;

/// `schema.name` of a target table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub schema: String,
    pub name: String,
}

impl TableRef {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        TableRef {
            schema: schema.into(),
            name: name.into(),
        }
    }

    pub fn qualified(&self) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(&self.name))
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// Destination for loaded frames.
///
/// `replace_table` drops whatever `table` held before, structure included,
/// and recreates it from `df`: afterwards the table has exactly the frame's
/// columns and rows. Nothing is appended or merged. Returns the number of
/// rows written.
#[allow(async_fn_in_trait)]
pub trait TableWriter {
    async fn replace_table(&mut self, table: &TableRef, df: &mut DataFrame) -> anyhow::Result<u64>;
}

pub struct PgTableWriter {
    pool: PgPool,
}

impl PgTableWriter {
    pub fn new(pool: PgPool) -> Self {
        PgTableWriter { pool }
    }
}

impl TableWriter for PgTableWriter {
    async fn replace_table(&mut self, table: &TableRef, df: &mut DataFrame) -> anyhow::Result<u64> {
        // one transaction per table; earlier tables are already committed
        let mut tx = self.pool.begin().await.context("begin transaction")?;

        sqlx::query(&drop_table_sql(table))
            .execute(&mut *tx)
            .await
            .with_context(|| format!("drop {table}"))?;
        sqlx::query(&create_table_sql(table, df))
            .execute(&mut *tx)
            .await
            .with_context(|| format!("create {table}"))?;

        let rows = if df.width() == 0 {
            0
        } else {
            let payload = frame_to_csv(df)?;
            let mut copy = tx
                .copy_in_raw(&copy_sql(table, df))
                .await
                .with_context(|| format!("start copy into {table}"))?;
            copy.send(payload).await?;
            let copied = copy.finish().await.with_context(|| format!("copy into {table}"))?;
            check_copied_rows(table, df.height(), copied)?
        };

        tx.commit().await.with_context(|| format!("commit {table}"))?;
        Ok(rows)
    }
}

/// COPY stops early at an unquoted `\.` line without reporting an error,
/// so a short count means rows were lost.
fn check_copied_rows(table: &TableRef, expected: usize, copied: u64) -> anyhow::Result<u64> {
    if copied != expected as u64 {
        anyhow::bail!("copy into {table} wrote {copied} of {expected} rows");
    }
    Ok(copied)
}

pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

pub fn pg_type(dtype: &DataType) -> &'static str {
    match dtype {
        DataType::Boolean => "BOOLEAN",
        DataType::Int8 | DataType::Int16 | DataType::UInt8 => "SMALLINT",
        DataType::Int32 | DataType::UInt16 => "INTEGER",
        DataType::Int64 | DataType::UInt32 => "BIGINT",
        DataType::UInt64 => "NUMERIC",
        DataType::Float32 => "REAL",
        DataType::Float64 => "DOUBLE PRECISION",
        DataType::Date => "DATE",
        DataType::Datetime(_, Some(_)) => "TIMESTAMPTZ",
        DataType::Datetime(_, None) => "TIMESTAMP",
        DataType::Time => "TIME",
        _ => "TEXT",
    }
}

fn column_list(df: &DataFrame) -> String {
    df.get_columns()
        .iter()
        .map(|s| quote_ident(s.name()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn drop_table_sql(table: &TableRef) -> String {
    format!("DROP TABLE IF EXISTS {}", table.qualified())
}

fn create_table_sql(table: &TableRef, df: &DataFrame) -> String {
    let columns = df
        .get_columns()
        .iter()
        .map(|s| format!("{} {}", quote_ident(s.name()), pg_type(s.dtype())))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE {} ({})", table.qualified(), columns)
}

fn copy_sql(table: &TableRef, df: &DataFrame) -> String {
    format!(
        "COPY {} ({}) FROM STDIN WITH (FORMAT csv)",
        table.qualified(),
        column_list(df)
    )
}

/// Rows as header-less CSV; nulls come out as empty unquoted fields, which
/// `COPY ... (FORMAT csv)` reads back as NULL.
fn frame_to_csv(df: &mut DataFrame) -> PolarsResult<Vec<u8>> {
    let mut buf = Vec::new();
    CsvWriter::new(&mut buf).include_header(false).finish(df)?;
    Ok(buf)
}
