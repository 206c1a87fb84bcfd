//! Premium, delta and ROI estimates for contracts the data source left blank.
//!
//! These are **approximations**, not an option pricing model. Premium decays
//! linearly with distance from the money and delta moves linearly around
//! 0.5. They exist so a ladder can be ranked and displayed when the upstream
//! only supplies reference data (type, strike, expiration).

use market_data::models::option_contract::OptionContract;
use serde::Serialize;

use crate::{Side, finite_or_zero, percent_of};

/// Share of the stock price used as the at-the-money call premium.
pub const CALL_BASE_RATE: f64 = 0.02;
/// Share of the stock price used as the at-the-money put premium.
pub const PUT_BASE_RATE: f64 = 0.03;
/// Delta of an at-the-money contract.
pub const DELTA_MIDPOINT: f64 = 0.5;
/// Delta change per unit of relative moneyness.
pub const DELTA_SLOPE: f64 = 0.5;

/// Base premium rate for a side.
pub fn base_rate(side: Side) -> f64 {
    match side {
        Side::Call => CALL_BASE_RATE,
        Side::Put => PUT_BASE_RATE,
    }
}

fn direction(side: Side) -> f64 {
    match side {
        Side::Call => 1.0,
        Side::Put => -1.0,
    }
}

fn usable_price(stock_price: f64) -> bool {
    stock_price.is_finite() && stock_price > 0.0
}

/// Estimated premium per share, never negative.
///
/// `stock_price * base_rate * (1 - |strike - stock_price| / stock_price)`.
/// Strikes more than 100 % away from the price floor at zero.
pub fn estimate_premium(strike: f64, stock_price: f64, side: Side) -> f64 {
    if !usable_price(stock_price) {
        return 0.0;
    }
    let moneyness = 1.0 - (strike - stock_price).abs() / stock_price;
    finite_or_zero(stock_price * base_rate(side) * moneyness).max(0.0)
}

/// Estimated delta, clamped to `[0, 1]`.
pub fn estimate_delta(strike: f64, stock_price: f64, side: Side) -> f64 {
    if !usable_price(stock_price) {
        return 0.0;
    }
    let delta =
        DELTA_MIDPOINT + direction(side) * ((stock_price - strike) / stock_price) * DELTA_SLOPE;
    finite_or_zero(delta).clamp(0.0, 1.0)
}

/// Premium as a percentage of the capital tied up by the leg.
///
/// A cash-secured put ties up the strike; a covered call ties up shares
/// bought at the stock price.
pub fn roi_pct(premium: f64, strike: f64, stock_price: f64, side: Side) -> f64 {
    let reference = match side {
        Side::Put => strike,
        Side::Call => stock_price,
    };
    if !(reference.is_finite() && reference > 0.0) {
        return 0.0;
    }
    percent_of(premium, reference)
}

/// Values derived for a contract from its strike and the stock price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Estimate {
    /// Estimated premium per share.
    pub premium: f64,
    /// Estimated delta in `[0, 1]`.
    pub delta: f64,
    /// Estimated premium as a percentage of the leg's capital.
    pub roi: f64,
    /// Open interest when the source supplied it. Never fabricated.
    pub open_interest: Option<u64>,
    /// Implied volatility when the source supplied it. Never fabricated.
    pub implied_volatility: Option<f64>,
}

/// Estimates premium, delta and ROI for `contract` treated as `side`.
///
/// Only the strike is read for the estimates; open interest and implied
/// volatility cannot be estimated and are passed through when present.
/// A non-positive stock price yields zeros.
pub fn estimate(contract: &OptionContract, stock_price: f64, side: Side) -> Estimate {
    let strike = contract.strike_price;
    let premium = estimate_premium(strike, stock_price, side);
    Estimate {
        premium,
        delta: estimate_delta(strike, stock_price, side),
        roi: if usable_price(stock_price) {
            roi_pct(premium, strike, stock_price, side)
        } else {
            0.0
        },
        open_interest: contract.open_interest.filter(|oi| *oi > 0),
        implied_volatility: present(contract.implied_volatility),
    }
}

/// Where a display value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    /// Supplied by the data source.
    Upstream,
    /// Computed by [`estimate`].
    Estimated,
}

/// A contract with display values overlaid.
///
/// Each overlaid field is either the source's value or the estimate, never
/// a mix. The contract itself is copied untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuotedContract {
    /// The contract as fetched.
    pub contract: OptionContract,
    /// Premium per share.
    pub premium: f64,
    /// Origin of [`QuotedContract::premium`].
    pub premium_source: ValueSource,
    /// Delta.
    pub delta: f64,
    /// Origin of [`QuotedContract::delta`].
    pub delta_source: ValueSource,
    /// Premium as a percentage of the leg's capital, from the displayed premium.
    pub roi: f64,
    /// Open interest, `None` when unknown.
    pub open_interest: Option<u64>,
    /// Implied volatility as a fraction, `None` when unknown.
    pub implied_volatility: Option<f64>,
}

impl QuotedContract {
    /// Builds the display record for `contract`, using its own type as the side.
    pub fn new(contract: &OptionContract, stock_price: f64) -> Self {
        let side = contract.contract_type;
        let estimated = estimate(contract, stock_price, side);

        let (premium, premium_source) = overlay(contract.premium, estimated.premium);
        let (delta, delta_source) = overlay(contract.delta, estimated.delta);
        let roi = roi_pct(premium, contract.strike_price, stock_price, side);

        Self {
            contract: contract.clone(),
            premium,
            premium_source,
            delta,
            delta_source,
            roi,
            open_interest: estimated.open_interest,
            implied_volatility: estimated.implied_volatility,
        }
    }
}

/// Shorthand for [`QuotedContract::new`].
pub fn quote_contract(contract: &OptionContract, stock_price: f64) -> QuotedContract {
    QuotedContract::new(contract, stock_price)
}

/// Display records for every contract in `contracts`, in input order.
pub fn quote_contracts(contracts: &[OptionContract], stock_price: f64) -> Vec<QuotedContract> {
    contracts
        .iter()
        .map(|c| quote_contract(c, stock_price))
        .collect()
}

/// A source value counts as present when it is finite and non-zero.
fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0)
}

fn overlay(source: Option<f64>, estimated: f64) -> (f64, ValueSource) {
    match present(source) {
        Some(v) => (v, ValueSource::Upstream),
        None => (estimated, ValueSource::Estimated),
    }
}
