//! Endpoint paths and query strings for the Polygon REST API.

use chrono::NaiveDate;

use crate::models::request_params::OptionsChainParams;

/// Query parameter carrying the API key.
pub const API_KEY_PARAM: &str = "apiKey";

/// Upper bound Polygon accepts for aggregate result counts.
pub const MAX_AGGREGATE_LIMIT: u32 = 50_000;

pub const OPTIONS_CONTRACTS_PATH: &str = "/v3/reference/options/contracts";

pub fn snapshot_path(symbol: &str) -> String {
    format!("/v2/snapshot/locale/us/markets/stocks/tickers/{symbol}")
}

pub fn daily_bars_path(symbol: &str, from: NaiveDate, to: NaiveDate) -> String {
    format!(
        "/v2/aggs/ticker/{symbol}/range/1/day/{}/{}",
        from.format("%Y-%m-%d"),
        to.format("%Y-%m-%d")
    )
}

pub fn daily_bars_query() -> Vec<(&'static str, String)> {
    vec![
        ("adjusted", "true".to_string()),
        ("sort", "asc".to_string()),
        ("limit", MAX_AGGREGATE_LIMIT.to_string()),
    ]
}

pub fn options_chain_query(params: &OptionsChainParams) -> Vec<(&'static str, String)> {
    vec![
        ("underlying_ticker", params.underlying.clone()),
        (
            "expiration_date.gt",
            params.expiration_after.format("%Y-%m-%d").to_string(),
        ),
        ("limit", params.limit.to_string()),
    ]
}
