//! CLI argument definitions for veracount.
//!
//! A single command: rebuild the daily counts CSV from the bucket.
//!
//! # Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--output` | `data/verified_contracts_daily_counts.csv` | CSV destination |
//! | `--origin` | `$VERACOUNT_ORIGIN` or the public export bucket | Bucket origin |
//! | `--prefix` | `$VERACOUNT_PREFIX` or `v2/verified_contracts/` | Key prefix |
//! | `--max-pages` | `500` | Listing page ceiling |
//! | `--timeout-secs` | `120` | Per-request timeout |
//! | `--log-level` | `info` | Default log filter when `RUST_LOG` is unset |
//! | `--keep-staging` | `false` | Keep downloaded files after the run |
//! | `--staging-root` | system temp dir | Parent of the staging directory |
//! | `--json` | `false` | Print the run report as JSON |
//!
//! # Examples
//!
//! ```bash
//! # Refresh into the default location
//! veracount
//!
//! # Write elsewhere and keep the downloads for inspection
//! veracount --output ~/counts.csv --keep-staging
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use veracount_core::config::{
    DEFAULT_MAX_LISTING_PAGES, DEFAULT_OUTPUT_PATH, DEFAULT_REQUEST_TIMEOUT_MS,
};
use veracount_core::{resolve_output_path, RefreshConfig};

/// Rebuild the verified contracts daily counts CSV from the public export bucket.
#[derive(Debug, Parser)]
#[command(name = "veracount", author, version, about)]
pub struct Cli {
    /// Destination of the daily counts CSV.
    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    pub output: PathBuf,

    /// Bucket origin, for example `https://export.verifieralliance.org`.
    #[arg(long)]
    pub origin: Option<String>,

    /// Key prefix to enumerate.
    #[arg(long)]
    pub prefix: Option<String>,

    /// Maximum number of listing requests before the run is aborted.
    #[arg(long, default_value_t = DEFAULT_MAX_LISTING_PAGES, value_parser = parse_page_ceiling)]
    pub max_pages: usize,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_MS / 1_000)]
    pub timeout_secs: u64,

    /// Log level used when `RUST_LOG` is not set.
    #[arg(long, value_enum, env = "VERACOUNT_LOG_LEVEL", default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Keep the staging directory and log its location.
    #[arg(long, default_value_t = false)]
    pub keep_staging: bool,

    /// Directory in which the per-run staging directory is created.
    #[arg(long)]
    pub staging_root: Option<PathBuf>,

    /// Print the run report as JSON instead of the summary line.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl Cli {
    /// Overlay the arguments on the default configuration.
    pub fn to_config(&self) -> std::io::Result<RefreshConfig> {
        let mut config = RefreshConfig {
            output_path: resolve_output_path(&self.output)?,
            max_listing_pages: self.max_pages,
            request_timeout_ms: self.timeout_secs.saturating_mul(1_000),
            staging_root: self.staging_root.clone(),
            keep_staging: self.keep_staging,
            ..RefreshConfig::default()
        };
        if let Some(origin) = &self.origin {
            config.origin = origin.clone();
        }
        if let Some(prefix) = &self.prefix {
            config.prefix = prefix.clone();
        }
        Ok(config)
    }
}

fn parse_page_ceiling(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err(String::from("at least one listing page is required")),
        Ok(pages) => Ok(pages),
        Err(error) => Err(error.to_string()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_production_run() {
        let cli = Cli::try_parse_from(["veracount"]).expect("parse");

        assert_eq!(cli.output, PathBuf::from(DEFAULT_OUTPUT_PATH));
        assert_eq!(cli.max_pages, 500);
        assert_eq!(cli.timeout_secs, 120);
        assert!(!cli.keep_staging);
        assert!(!cli.json);
    }

    #[test]
    fn arguments_override_the_configuration() {
        let temp = tempfile::tempdir().expect("tempdir");
        let output = temp.path().join("counts.csv");
        let cli = Cli::try_parse_from([
            "veracount",
            "--output",
            output.to_str().expect("utf-8 temp path"),
            "--origin",
            "https://mirror.test/",
            "--prefix",
            "v3/contracts/",
            "--max-pages",
            "7",
            "--timeout-secs",
            "5",
            "--keep-staging",
        ])
        .expect("parse");

        let config = cli.to_config().expect("config");
        assert_eq!(config.output_path, output);
        assert_eq!(config.origin_base(), "https://mirror.test");
        assert_eq!(config.prefix, "v3/contracts/");
        assert_eq!(config.max_listing_pages, 7);
        assert_eq!(config.request_timeout_ms, 5_000);
        assert!(config.keep_staging);
    }

    #[test]
    fn relative_output_is_made_absolute() {
        let cli = Cli::try_parse_from(["veracount", "--output", "out/daily.csv"]).expect("parse");
        let config = cli.to_config().expect("config");

        assert!(config.output_path.is_absolute());
        assert!(config.output_path.ends_with("out/daily.csv"));
    }

    #[test]
    fn zero_page_ceiling_is_rejected() {
        let error = Cli::try_parse_from(["veracount", "--max-pages", "0"]).expect_err("zero pages");
        assert!(error.to_string().contains("at least one listing page"));

        assert!(Cli::try_parse_from(["veracount", "--max-pages", "many"]).is_err());
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let result = Cli::try_parse_from(["veracount", "--log-level", "loud"]);
        assert!(result.is_err());
    }
}
