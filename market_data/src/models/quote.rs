//! Point-in-time snapshot of a stock's trading day.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Open/high/low/close/volume summary for one session.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionSummary {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// Volume-weighted average price. Not always supplied.
    pub vwap: Option<f64>,
}

/// Current quote for a single symbol.
///
/// A quote is an immutable snapshot: a refetch replaces it wholesale, fields
/// are never patched individually.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// The ticker this quote belongs to (e.g., "AAPL").
    pub symbol: String,

    /// Price of the most recent trade.
    pub last_price: f64,

    /// Absolute change versus the previous close.
    pub todays_change: f64,

    /// Percentage change versus the previous close.
    pub todays_change_pct: f64,

    /// When the upstream last updated this snapshot.
    pub updated: Option<DateTime<Utc>>,

    /// Current session.
    pub day: SessionSummary,

    /// Previous session.
    pub prev_day: SessionSummary,
}
