use thiserror::Error;
use veracount_core::{HttpError, RefreshError};

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Refresh(#[from] RefreshError),

    #[error("failed to initialise http transport: {0}")]
    Transport(#[from] HttpError),

    #[error("failed to initialise logging: {0}")]
    Logging(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Refresh(error) => match error {
                RefreshError::Listing(_) => 3,
                RefreshError::Retrieval { .. } => 4,
                RefreshError::Schema { .. } => 5,
                RefreshError::EmptyDiscovery { .. } => 6,
                RefreshError::Aggregate(_) => 7,
                RefreshError::Io(_) => 10,
            },
            Self::Transport(_) => 2,
            Self::Logging(_) => 2,
            Self::Serialization(_) => 8,
            Self::Io(_) => 10,
        }
    }
}
