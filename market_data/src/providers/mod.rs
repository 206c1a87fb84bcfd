//! Provider abstraction for market data sources.
//!
//! This module defines the [`MarketDataProvider`] trait, the single interface
//! the rest of the workspace uses to read quotes, daily history and option
//! chains from a market data vendor (currently Polygon.io).
//!
//! Each concrete provider handles vendor-specific URLs, authentication and
//! payload decoding, and returns the vendor-agnostic models from
//! [`crate::models`].
//!
//! The trait is async and object safe, so callers can hold a
//! `Box<dyn MarketDataProvider>` and swap in a stub for tests.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use market_data::models::{
//!     bar::HistoricalBar,
//!     option_contract::OptionContract,
//!     quote::Quote,
//!     request_params::{DailyBarsParams, OptionsChainParams},
//! };
//! use market_data::providers::{MarketDataProvider, ProviderError, ValidationSnafu};
//!
//! struct EmptyProvider;
//!
//! #[async_trait]
//! impl MarketDataProvider for EmptyProvider {
//!     async fn fetch_quote(&self, symbol: &str) -> Result<Quote, ProviderError> {
//!         ValidationSnafu { message: format!("no quote for {symbol}") }.fail()
//!     }
//!     async fn fetch_daily_bars(
//!         &self,
//!         _params: DailyBarsParams,
//!     ) -> Result<Vec<HistoricalBar>, ProviderError> {
//!         Ok(vec![])
//!     }
//!     async fn fetch_options_chain(
//!         &self,
//!         _params: OptionsChainParams,
//!     ) -> Result<Vec<OptionContract>, ProviderError> {
//!         Ok(vec![])
//!     }
//! }
//! ```

pub mod polygon_rest;

use async_trait::async_trait;
use shared_utils::env::MissingEnvVarError;
use snafu::{Backtrace, Snafu};

use crate::models::{
    bar::HistoricalBar,
    option_contract::OptionContract,
    quote::Quote,
    request_params::{DailyBarsParams, OptionsChainParams},
};

/// HTTP status used by providers to signal throttling.
pub const STATUS_TOO_MANY_REQUESTS: u16 = 429;

/// Read access to a market data vendor.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetches the current quote snapshot for `symbol`.
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, ProviderError>;

    /// Fetches one-day bars for an inclusive date range, oldest first.
    async fn fetch_daily_bars(
        &self,
        params: DailyBarsParams,
    ) -> Result<Vec<HistoricalBar>, ProviderError>;

    /// Fetches contracts on `params.underlying` expiring after `params.expiration_after`.
    async fn fetch_options_chain(
        &self,
        params: OptionsChainParams,
    ) -> Result<Vec<OptionContract>, ProviderError>;
}

/// Errors that can occur during the creation of a provider instance
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// missed environment variable.
    #[snafu(display("Missing environment variable: {source}"))]
    MissingEnvVar {
        source: MissingEnvVarError,
        backtrace: Backtrace,
    },

    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// Base URL is not an http(s) URL.
    #[snafu(display("Invalid base URL: {url}"))]
    InvalidBaseUrl { url: String, backtrace: Backtrace },
}

/// Errors that can occur within a `MarketDataProvider` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout).
    #[snafu(display("API request failed: {source}"))]
    Reqwest {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The provider answered with a non-success status.
    #[snafu(display("API error ({status}): {message}"))]
    Api {
        status: u16,
        message: String,
        backtrace: Backtrace,
    },

    /// The provider kept throttling after the allowed retries.
    #[snafu(display("Rate limited by provider after {attempts} attempts"))]
    RateLimited { attempts: u32, backtrace: Backtrace },

    /// The response body did not match the expected shape.
    #[snafu(display("Malformed provider response: {message}"))]
    Decode {
        message: String,
        backtrace: Backtrace,
    },

    /// The request parameters were invalid for this specific provider.
    #[snafu(display("Invalid parameters for provider: {message}"))]
    Validation {
        message: String,
        backtrace: Backtrace,
    },

    /// An error during provider configuration or initialization.
    #[snafu(display("Provider initialization error: {source}"))]
    Init {
        #[snafu(backtrace)]
        source: ProviderInitError,
    },
}

impl ProviderError {
    /// `true` for throttling responses, whether or not retries were spent.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            ProviderError::Api { status, .. } => *status == STATUS_TOO_MANY_REQUESTS,
            ProviderError::RateLimited { .. } => true,
            _ => false,
        }
    }
}
