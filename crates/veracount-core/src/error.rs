use thiserror::Error;
use veracount_warehouse::AggregateError;

/// Errors that terminate a refresh run.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// Malformed listing response, listing transport failure, or the page
    /// ceiling was reached without a terminal page.
    #[error("listing failed: {0}")]
    Listing(String),

    /// A discovered object could not be fetched.
    #[error("failed to retrieve '{key}': {cause}")]
    Retrieval { key: String, cause: String },

    /// No candidate timestamp column exists in the staged dataset.
    #[error(
        "could not find a timestamp column in parquet schema. Columns: {}",
        columns.join(", ")
    )]
    Schema { columns: Vec<String> },

    /// Nothing under the prefix matched before any download was attempted.
    #[error("no {extension} files were found under '{prefix}'")]
    EmptyDiscovery { prefix: String, extension: String },

    #[error(transparent)]
    Aggregate(AggregateError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<AggregateError> for RefreshError {
    fn from(error: AggregateError) -> Self {
        match error {
            AggregateError::NoTimestampColumn { columns } => Self::Schema { columns },
            other => Self::Aggregate(other),
        }
    }
}
