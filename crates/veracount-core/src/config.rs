//! Run parameters for a refresh.

use std::env;
use std::path::{Path, PathBuf};

use veracount_warehouse::DEFAULT_TIMESTAMP_CANDIDATES;

/// Public export bucket holding the verified contracts dataset.
pub const DEFAULT_ORIGIN: &str = "https://export.verifieralliance.org";
/// Key prefix of the verified contracts Parquet files.
pub const DEFAULT_PREFIX: &str = "v2/verified_contracts/";
pub const DEFAULT_EXTENSION: &str = ".parquet";
pub const DEFAULT_MAX_LISTING_PAGES: usize = 500;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 120_000;
/// Output location relative to the working directory.
pub const DEFAULT_OUTPUT_PATH: &str = "data/verified_contracts_daily_counts.csv";

/// Configuration for one refresh run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshConfig {
    /// Bucket origin, without trailing slash.
    pub origin: String,
    /// Key prefix to enumerate; stripped to form local staging paths.
    pub prefix: String,
    /// Required key suffix.
    pub extension: String,
    /// CSV destination.
    pub output_path: PathBuf,
    /// Upper bound on listing requests per run.
    pub max_listing_pages: usize,
    /// Per-request timeout passed to the transport.
    pub request_timeout_ms: u64,
    /// Timestamp column candidates, most preferred first.
    pub timestamp_candidates: Vec<String>,
    pub user_agent: String,
    /// Parent of the per-run staging directory; the system temp dir if unset.
    pub staging_root: Option<PathBuf>,
    /// Persist the staging directory instead of deleting it.
    pub keep_staging: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            origin: resolve_env("VERACOUNT_ORIGIN", DEFAULT_ORIGIN),
            prefix: resolve_env("VERACOUNT_PREFIX", DEFAULT_PREFIX),
            extension: String::from(DEFAULT_EXTENSION),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            max_listing_pages: DEFAULT_MAX_LISTING_PAGES,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            timestamp_candidates: DEFAULT_TIMESTAMP_CANDIDATES
                .iter()
                .map(|candidate| (*candidate).to_string())
                .collect(),
            user_agent: format!("veracount/{}", env!("CARGO_PKG_VERSION")),
            staging_root: None,
            keep_staging: false,
        }
    }
}

impl RefreshConfig {
    /// Origin with any trailing slashes removed.
    pub fn origin_base(&self) -> &str {
        self.origin.trim_end_matches('/')
    }
}

fn resolve_env(name: &str, fallback: &str) -> String {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => String::from(fallback),
    }
}

/// Expand a leading `~/` and make the path absolute against the current
/// working directory.
pub fn resolve_output_path(path: &Path) -> std::io::Result<PathBuf> {
    let expanded = match path.strip_prefix("~") {
        Ok(rest) => match env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    };

    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(env::current_dir()?.join(expanded))
    }
}
