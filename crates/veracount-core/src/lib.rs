//! # Veracount Core
//!
//! Rebuilds a daily record-count CSV from Parquet files published in a
//! public object-storage bucket.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────────────┐
//! │ Listing Enumerator   │  paginated discovery (marker / continuation token)
//! └──────────┬───────────┘
//!            │ BTreeSet<ObjectKey>
//!            ▼
//! ┌──────────────────────┐     ┌──────────────────┐
//! │ Retriever            │────▶│ HTTP Client      │
//! │ (staging directory)  │     │ (reqwest/mock)   │
//! └──────────┬───────────┘     └──────────────────┘
//!            │ Vec<PathBuf>
//!            ▼
//! ┌──────────────────────┐
//! │ veracount-warehouse  │  schema resolution, daily aggregation, CSV
//! └──────────────────────┘
//! ```
//!
//! Every stage finishes before the next begins, and every refresh is a full
//! rebuild.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Run parameters and defaults |
//! | [`error`] | Run-terminating error taxonomy |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`key`] | Object keys and the prefix/extension filter |
//! | [`listing`] | Paginated listing enumerator |
//! | [`refresh`] | End-to-end pipeline |
//! | [`retrieval`] | Staging downloads |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use veracount_core::{refresh, RefreshConfig, ReqwestHttpClient};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RefreshConfig::default();
//!     let client = Arc::new(ReqwestHttpClient::new(&config.user_agent)?);
//!
//!     let report = refresh(&config, client).await?;
//!     println!("{} daily rows", report.rows_written);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod http_client;
pub mod key;
pub mod listing;
pub mod refresh;
pub mod retrieval;

pub use config::{resolve_output_path, RefreshConfig};
pub use error::RefreshError;
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use key::{KeyFilter, ObjectKey};
pub use listing::{CursorTracker, ListingEnumerator, ListingPage, PaginationCursor};
pub use refresh::{refresh, RefreshReport};
pub use retrieval::Retriever;

// Warehouse (re-exported from veracount-warehouse)
pub use veracount_warehouse::{AggregateError, DailyCount, DEFAULT_TIMESTAMP_CANDIDATES};
