//! Errors raised by the engine.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by the engine.
///
/// Arithmetic never errors; only invalid selections do.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The requested expiration is not present in the chain.
    #[error("No contracts expire on {date}")]
    UnknownExpiration {
        /// The date that was asked for.
        date: NaiveDate,
    },
}
