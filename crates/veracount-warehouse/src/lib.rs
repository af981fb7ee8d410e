//! # Veracount Warehouse
//!
//! DuckDB-backed analytics for staged Parquet datasets.
//!
//! ## Overview
//!
//! The refresh pipeline stages every Parquet file it discovers into a local
//! directory and then hands the file list to this crate, which:
//!
//! - resolves the timestamp column from the union schema of all files
//!   ([`resolve_timestamp_column`])
//! - counts rows per calendar day ([`aggregate_daily_counts`])
//! - writes the sorted `day,count` CSV ([`write_daily_counts_csv`])
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use veracount_warehouse::{
//!     aggregate_daily_counts, open_in_memory, resolve_timestamp_column,
//!     write_daily_counts_csv, DEFAULT_TIMESTAMP_CANDIDATES,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let files = vec![PathBuf::from("staging/part-0001.parquet")];
//!     let connection = open_in_memory()?;
//!
//!     let column = resolve_timestamp_column(&connection, &files, DEFAULT_TIMESTAMP_CANDIDATES)?;
//!     let rows = aggregate_daily_counts(&connection, &files, &column)?;
//!     write_daily_counts_csv("data/daily_counts.csv", &rows)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## SQL safety
//!
//! File paths only ever come from the staging directory the pipeline created
//! and are embedded as escaped string literals. Column names are quoted as
//! identifiers, so a column literally named `"date"` or containing quotes is
//! still addressed exactly.

pub mod aggregate;
pub mod csv;
pub mod duckdb;
pub mod schema;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use aggregate::{aggregate_daily_counts, DailyCount};
pub use csv::{day_label, render_daily_counts, write_daily_counts_csv, CSV_HEADER};
pub use self::duckdb::open_in_memory;
pub use schema::{
    describe_columns, resolve_timestamp_column, select_timestamp_column,
    DEFAULT_TIMESTAMP_CANDIDATES,
};

/// Errors that can occur while inspecting or aggregating staged files.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// `DuckDB` database error.
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    /// I/O error while writing the output file.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// None of the candidate timestamp columns exist in the dataset.
    #[error(
        "could not find a timestamp column in parquet schema. Columns: {}",
        columns.join(", ")
    )]
    NoTimestampColumn { columns: Vec<String> },

    /// The engine produced a value that does not fit the output model.
    #[error("invalid aggregate row: {0}")]
    InvalidRow(String),
}

/// Build a `read_parquet([...], union_by_name = true)` table expression.
pub(crate) fn parquet_source(files: &[PathBuf]) -> String {
    let list = files
        .iter()
        .map(|path| format!("'{}'", escape_sql_string(path_to_sql(path).as_str())))
        .collect::<Vec<_>>()
        .join(", ");
    format!("read_parquet([{list}], union_by_name = true)")
}

/// Quote a column name as a SQL identifier.
pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Convert a path to a SQL-compatible string (forward slashes).
fn path_to_sql(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Escape a string for inclusion in a single-quoted SQL literal.
///
/// Only used for staging paths created by the pipeline itself.
fn escape_sql_string(value: &str) -> String {
    value.replace('\'', "''")
}

/// Parquet fixture builder shared by the unit tests.
#[cfg(test)]
pub(crate) fn write_parquet_fixture(path: &Path, select_sql: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("fixture dir");
    }
    let connection = ::duckdb::Connection::open_in_memory().expect("fixture connection");
    connection
        .execute_batch(
            format!(
                "COPY ({select_sql}) TO '{}' (FORMAT PARQUET)",
                escape_sql_string(path_to_sql(path).as_str())
            )
            .as_str(),
        )
        .expect("write parquet fixture");
}
