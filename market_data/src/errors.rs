use thiserror::Error;

use crate::providers::{ProviderError, ProviderInitError};

/// The unified error type for the `market_data` crate.
#[derive(Debug, Error)]
pub enum Error {
    /// An error originating from a data provider (request, status, payload).
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The provider could not be constructed.
    #[error("Provider initialization error: {0}")]
    Init(#[from] ProviderInitError),

    /// An error related to configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// `true` when the upstream throttled the request.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::Provider(e) if e.is_rate_limited())
    }
}
