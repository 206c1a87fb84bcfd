//! Polygon.io REST implementation of [`MarketDataProvider`](crate::providers::MarketDataProvider).

pub mod params;
pub mod provider;
pub mod response;

pub use provider::{PolygonConfig, PolygonProvider};
