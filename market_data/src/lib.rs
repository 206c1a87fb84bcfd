//! Market data access for the wheel report.
//!
//! Quotes, daily history and option chains are read through the
//! [`providers::MarketDataProvider`] trait. [`providers::polygon_rest`] talks to
//! Polygon.io with a per-request timeout and a single fixed-delay retry on
//! throttling. [`latest`] and [`cache`] give callers "last request wins"
//! publishing and time-to-live reuse of fetched data.

pub mod cache;
pub mod errors;
pub mod latest;
pub mod models;
pub mod providers;
pub mod retry;

pub use errors::Error;
