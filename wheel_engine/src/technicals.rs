//! Price-section figures derived from a quote and its daily history.

use market_data::models::{bar::HistoricalBar, quote::Quote};
use serde::Serialize;

/// Window of the moving average drawn over the price history.
pub const SMA_WINDOW: usize = 20;

/// One value of a moving average, stamped with the bar that closes its window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SmaPoint {
    /// Timestamp of the last bar in the window, Unix milliseconds.
    pub timestamp_ms: i64,
    /// Mean close over the window.
    pub value: f64,
}

/// Simple moving average of closing prices.
///
/// Yields one point per bar starting at index `window - 1`; empty when there
/// are fewer bars than `window` or `window` is zero.
pub fn simple_moving_average(bars: &[HistoricalBar], window: usize) -> Vec<SmaPoint> {
    if window == 0 {
        return Vec::new();
    }
    bars.windows(window)
        .map(|w| SmaPoint {
            timestamp_ms: w[window - 1].timestamp_ms,
            value: w.iter().map(|b| b.close).sum::<f64>() / window as f64,
        })
        .collect()
}

/// Lowest low and highest high across a bar series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceRange {
    /// Lowest low.
    pub low: f64,
    /// Highest high.
    pub high: f64,
}

impl PriceRange {
    /// `None` for an empty series.
    pub fn from_bars(bars: &[HistoricalBar]) -> Option<Self> {
        let (first, rest) = bars.split_first()?;
        Some(rest.iter().fold(
            Self {
                low: first.low,
                high: first.high,
            },
            |range, b| Self {
                low: range.low.min(b.low),
                high: range.high.max(b.high),
            },
        ))
    }
}

/// Headline figures for the price section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteSummary {
    /// Ticker.
    pub symbol: String,
    /// Last traded price.
    pub last_price: f64,
    /// Change versus the previous close, in percent.
    pub change_pct: f64,
    /// Today's volume in millions of shares.
    pub volume_millions: f64,
    /// Previous session's volume in millions of shares.
    pub prev_volume_millions: f64,
    /// Range over the fetched history, when any history was fetched.
    pub range: Option<PriceRange>,
}

impl QuoteSummary {
    /// Summary of `quote` alone.
    pub fn from_quote(quote: &Quote) -> Self {
        Self {
            symbol: quote.symbol.clone(),
            last_price: quote.last_price,
            change_pct: quote.todays_change_pct,
            volume_millions: quote.day.volume / 1_000_000.0,
            prev_volume_millions: quote.prev_day.volume / 1_000_000.0,
            range: None,
        }
    }

    /// Adds the high/low range of `bars`.
    pub fn with_history(self, bars: &[HistoricalBar]) -> Self {
        Self {
            range: PriceRange::from_bars(bars),
            ..self
        }
    }
}
