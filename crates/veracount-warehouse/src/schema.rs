//! Timestamp column resolution over the union schema of staged files.

use std::path::PathBuf;

use ::duckdb::Connection;
use tracing::debug;

use crate::{parquet_source, AggregateError};

/// Timestamp column candidates, most preferred first.
pub const DEFAULT_TIMESTAMP_CANDIDATES: &[&str] = &[
    "created_at",
    "verified_at",
    "inserted_at",
    "updated_at",
    "timestamp",
    "block_timestamp",
    "date",
];

/// List the column names of all files read as one logical table.
///
/// Files with differing schemas are unioned by column name, so a column that
/// exists in any file is reported once.
///
/// # Errors
/// Returns an error if a file cannot be read as Parquet.
pub fn describe_columns(
    connection: &Connection,
    files: &[PathBuf],
) -> Result<Vec<String>, AggregateError> {
    if files.is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!("DESCRIBE SELECT * FROM {}", parquet_source(files));
    let mut statement = connection.prepare(sql.as_str())?;
    let columns = statement
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    debug!(files = files.len(), columns = columns.len(), "described staged dataset");
    Ok(columns)
}

/// Pick the first candidate, in priority order, that appears in `columns`.
///
/// The position of a column inside the schema never matters; only the order
/// of `candidates` does.
pub fn select_timestamp_column<'a, S>(columns: &[String], candidates: &'a [S]) -> Option<&'a str>
where
    S: AsRef<str>,
{
    candidates
        .iter()
        .map(|candidate| candidate.as_ref())
        .find(|candidate| columns.iter().any(|column| column.as_str() == *candidate))
}

/// Resolve the timestamp column of the staged dataset.
///
/// # Errors
/// Returns [`AggregateError::NoTimestampColumn`] with every observed column
/// when no candidate matches, or an engine error if the files are unreadable.
pub fn resolve_timestamp_column<S>(
    connection: &Connection,
    files: &[PathBuf],
    candidates: &[S],
) -> Result<String, AggregateError>
where
    S: AsRef<str>,
{
    let columns = describe_columns(connection, files)?;
    match select_timestamp_column(&columns, candidates) {
        Some(column) => Ok(column.to_string()),
        None => Err(AggregateError::NoTimestampColumn { columns }),
    }
}
