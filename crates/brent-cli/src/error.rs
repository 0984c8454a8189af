use brent_core::{LoadError, ProviderErrorKind};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] brent_core::ValidationError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Load(error) => match error {
                LoadError::InvalidTicker(_) | LoadError::InvalidRange { .. } => 2,
                LoadError::EmptyResult { .. } => 3,
                LoadError::MissingPriceField { .. } | LoadError::InvalidPrice(_) => 4,
                LoadError::Network(inner) if inner.kind() == ProviderErrorKind::Malformed => 4,
                LoadError::Network(_) => 5,
            },
            Self::Serialization(_) | Self::Io(_) => 10,
        }
    }
}
