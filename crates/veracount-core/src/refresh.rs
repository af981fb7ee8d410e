//! End-to-end refresh: enumerate, stage, resolve, aggregate, write.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tempfile::TempDir;
use tracing::{debug, info};
use veracount_warehouse::{
    aggregate_daily_counts, open_in_memory, resolve_timestamp_column, write_daily_counts_csv,
};

use crate::config::RefreshConfig;
use crate::error::RefreshError;
use crate::http_client::HttpClient;
use crate::listing::ListingEnumerator;
use crate::retrieval::Retriever;

const STAGING_PREFIX: &str = "verified_contracts_daily_";

/// Summary of a completed refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub keys_discovered: usize,
    pub timestamp_column: String,
    pub rows_written: usize,
    pub output_path: PathBuf,
    /// Set only when the staging directory was kept on request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staging_dir: Option<PathBuf>,
}

/// Rebuild the daily counts file described by `config`.
///
/// Stages run strictly one after another. The staging directory is removed
/// when this function returns, on success and on every error path, unless
/// `config.keep_staging` is set and the run succeeded up to that point.
///
/// # Errors
/// Any [`RefreshError`]; [`RefreshError::EmptyDiscovery`] when the listing
/// yields no matching key.
pub async fn refresh(
    config: &RefreshConfig,
    http_client: Arc<dyn HttpClient>,
) -> Result<RefreshReport, RefreshError> {
    let enumerator = ListingEnumerator::new(Arc::clone(&http_client), config);
    let keys = enumerator.enumerate().await?;
    if keys.is_empty() {
        return Err(RefreshError::EmptyDiscovery {
            prefix: config.prefix.clone(),
            extension: config.extension.clone(),
        });
    }
    info!(count = keys.len(), "found {} parquet files", keys.len());

    let mut builder = tempfile::Builder::new();
    builder.prefix(STAGING_PREFIX);
    let staging = match &config.staging_root {
        Some(root) => {
            fs::create_dir_all(root)?;
            builder.tempdir_in(root)?
        }
        None => builder.tempdir()?,
    };
    let retriever = Retriever::new(http_client, config);
    let files = retriever.retrieve(&keys, staging.path()).await?;

    let (timestamp_column, rows_written) = summarize(config, &files)?;
    let staging_dir = finish_staging(staging, config.keep_staging)?;

    info!(
        output = %config.output_path.display(),
        column = %timestamp_column,
        rows = rows_written,
        "refresh complete"
    );

    Ok(RefreshReport {
        keys_discovered: keys.len(),
        timestamp_column,
        rows_written,
        output_path: config.output_path.clone(),
        staging_dir,
    })
}

/// Resolve the timestamp column over `files` and write the CSV.
fn summarize(config: &RefreshConfig, files: &[PathBuf]) -> Result<(String, usize), RefreshError> {
    let connection = open_in_memory().map_err(veracount_warehouse::AggregateError::from)?;
    let column = resolve_timestamp_column(&connection, files, config.timestamp_candidates.as_slice())?;
    info!(column = %column, "resolved timestamp column");

    let rows = aggregate_daily_counts(&connection, files, &column)?;
    write_daily_counts_csv(&config.output_path, &rows)?;
    Ok((column, rows.len()))
}

fn finish_staging(staging: TempDir, keep: bool) -> Result<Option<PathBuf>, RefreshError> {
    if keep {
        let path = staging.keep();
        info!(path = %path.display(), "keeping staging directory");
        return Ok(Some(path));
    }
    debug!(path = %staging.path().display(), "removing staging directory");
    staging.close()?;
    Ok(None)
}
