//! Wheel strategy engine.
//!
//! Pure, synchronous building blocks for a cash-secured-put / covered-call
//! ladder:
//! - [`estimate`]: fills in premium and delta when the data source omits them
//! - [`ladder`]: moneyness filtering, ranking and expiration grouping
//! - [`calculator`]: annualized return, max profit and downside protection
//! - [`technicals`]: moving average and quote summary for the price section
//!
//! Nothing here performs I/O. Every function returns a finite number for
//! degenerate inputs instead of `NaN` or infinity.

#![deny(missing_docs)]

pub mod calculator;
pub mod error;
pub mod estimate;
pub mod ladder;
pub mod technicals;

pub use error::EngineError;

/// Which leg of the wheel an option belongs to.
pub use market_data::models::option_contract::ContractType as Side;

/// Replaces `NaN` and infinities with `0.0`.
pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// `numerator / denominator * 100`, or `0.0` when the ratio is undefined.
pub(crate) fn percent_of(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    finite_or_zero(numerator / denominator * 100.0)
}
