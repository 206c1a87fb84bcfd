//! Strike selection for the put and call ladders.
//!
//! A ladder is the short list of strikes worth writing on one side of the
//! wheel: puts slightly below (or just above) the money, calls at or above
//! it. Contracts are filtered by moneyness, ranked by strike and truncated.

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};
use market_data::models::option_contract::OptionContract;

use crate::{EngineError, Side};

/// Number of strikes shown per side.
pub const DEFAULT_LADDER_SIZE: usize = 5;
/// Puts are kept while `strike < stock_price * PUT_MONEYNESS_CEILING`.
pub const PUT_MONEYNESS_CEILING: f64 = 1.05;
/// Calls are kept while `strike > stock_price * CALL_MONEYNESS_FLOOR`.
pub const CALL_MONEYNESS_FLOOR: f64 = 0.98;
/// Horizon of the near-term chain, in calendar days.
pub const NEAR_TERM_DAYS: u64 = 30;

/// `true` when `strike` passes the moneyness filter for `side`.
pub fn in_band(strike: f64, stock_price: f64, side: Side) -> bool {
    match side {
        Side::Put => strike < stock_price * PUT_MONEYNESS_CEILING,
        Side::Call => strike > stock_price * CALL_MONEYNESS_FLOOR,
    }
}

/// Filters, ranks and truncates `contracts` into a ladder for `side`.
///
/// Contracts of the other type are ignored. Puts come out by strike
/// descending (closest to the money first), calls ascending. Equal strikes
/// keep their input order. An empty result is not an error.
pub fn select_ladder(
    contracts: &[OptionContract],
    stock_price: f64,
    side: Side,
    ladder_size: usize,
) -> Vec<OptionContract> {
    let mut ladder: Vec<OptionContract> = contracts
        .iter()
        .filter(|c| c.contract_type == side && in_band(c.strike_price, stock_price, side))
        .cloned()
        .collect();

    match side {
        Side::Put => ladder.sort_by(|a, b| b.strike_price.total_cmp(&a.strike_price)),
        Side::Call => ladder.sort_by(|a, b| a.strike_price.total_cmp(&b.strike_price)),
    }
    ladder.truncate(ladder_size);
    ladder
}

/// Distinct expiration dates across `contracts`, ascending.
pub fn group_by_expiration<'a>(
    contracts: impl IntoIterator<Item = &'a OptionContract>,
) -> Vec<NaiveDate> {
    contracts
        .into_iter()
        .map(|c| c.expiration_date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Contracts expiring on or before `today + horizon_days`, in input order.
pub fn near_term(
    contracts: &[OptionContract],
    today: NaiveDate,
    horizon_days: u64,
) -> Vec<OptionContract> {
    let cutoff = today
        .checked_add_days(Days::new(horizon_days))
        .unwrap_or(NaiveDate::MAX);
    contracts
        .iter()
        .filter(|c| c.expiration_date <= cutoff)
        .cloned()
        .collect()
}

/// Whole days from `today` until `expiration`; past dates give 0.
pub fn days_to_expiration(expiration: NaiveDate, today: NaiveDate) -> u64 {
    u64::try_from((expiration - today).num_days()).unwrap_or(0)
}

/// A chain seen through one selected expiration.
///
/// Selecting an expiration re-runs the ladder selection scoped to that date.
/// The active expiration starts out as the earliest one.
#[derive(Debug, Clone)]
pub struct ExpirationView {
    contracts: Vec<OptionContract>,
    stock_price: f64,
    ladder_size: usize,
    expirations: Vec<NaiveDate>,
    active: Option<NaiveDate>,
}

impl ExpirationView {
    /// Builds a view over `contracts` (puts and calls together).
    pub fn new(contracts: Vec<OptionContract>, stock_price: f64, ladder_size: usize) -> Self {
        let expirations = group_by_expiration(&contracts);
        let active = expirations.first().copied();
        Self {
            contracts,
            stock_price,
            ladder_size,
            expirations,
            active,
        }
    }

    /// All expirations in the chain, ascending.
    pub fn expirations(&self) -> &[NaiveDate] {
        &self.expirations
    }

    /// The selected expiration; `None` only for an empty chain.
    pub fn active(&self) -> Option<NaiveDate> {
        self.active
    }

    /// Returns the view with `date` selected.
    pub fn with_active(mut self, date: NaiveDate) -> Result<Self, EngineError> {
        if self.expirations.binary_search(&date).is_err() {
            return Err(EngineError::UnknownExpiration { date });
        }
        self.active = Some(date);
        Ok(self)
    }

    /// The stock price the ladders are ranked against.
    pub fn stock_price(&self) -> f64 {
        self.stock_price
    }

    /// Put ladder for the active expiration.
    pub fn puts(&self) -> Vec<OptionContract> {
        self.ladder(Side::Put)
    }

    /// Call ladder for the active expiration.
    pub fn calls(&self) -> Vec<OptionContract> {
        self.ladder(Side::Call)
    }

    /// Days from `today` until the active expiration.
    pub fn days_to_expiration(&self, today: NaiveDate) -> Option<u64> {
        self.active.map(|date| days_to_expiration(date, today))
    }

    fn ladder(&self, side: Side) -> Vec<OptionContract> {
        let Some(active) = self.active else {
            return Vec::new();
        };
        let scoped: Vec<OptionContract> = self
            .contracts
            .iter()
            .filter(|c| c.expiration_date == active)
            .cloned()
            .collect();
        select_ladder(&scoped, self.stock_price, side, self.ladder_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn contract(side: Side, strike: f64, expiration: NaiveDate) -> OptionContract {
        OptionContract {
            ticker: format!("O:T{side}{strike}"),
            underlying_ticker: "T".into(),
            contract_type: side,
            strike_price: strike,
            expiration_date: expiration,
            premium: None,
            delta: None,
            open_interest: None,
            implied_volatility: None,
        }
    }

    fn strikes(ladder: &[OptionContract]) -> Vec<f64> {
        ladder.iter().map(|c| c.strike_price).collect()
    }

    #[test]
    fn put_ladder_is_filtered_and_descending() {
        let exp = date(2025, 10, 24);
        let chain: Vec<_> = [130.0, 160.0, 145.0, 157.0, 140.0, 150.0, 135.0, 125.0]
            .into_iter()
            .map(|k| contract(Side::Put, k, exp))
            .collect();

        // 157.5 is the ceiling at 150, so 157 stays and 160 goes.
        let ladder = select_ladder(&chain, 150.0, Side::Put, DEFAULT_LADDER_SIZE);
        assert_eq!(strikes(&ladder), vec![157.0, 150.0, 145.0, 140.0, 135.0]);
    }

    #[test]
    fn call_ladder_is_filtered_and_ascending() {
        let exp = date(2025, 10, 24);
        let mut chain: Vec<_> = [170.0, 140.0, 147.0, 155.0, 160.0]
            .into_iter()
            .map(|k| contract(Side::Call, k, exp))
            .collect();
        chain.push(contract(Side::Put, 152.0, exp));

        let ladder = select_ladder(&chain, 150.0, Side::Call, 3);
        assert_eq!(strikes(&ladder), vec![155.0, 160.0, 170.0]);
    }

    #[test]
    fn boundaries_are_exclusive() {
        let exp = date(2025, 10, 24);
        assert!(!in_band(105.0, 100.0, Side::Put));
        assert!(!in_band(98.0, 100.0, Side::Call));
        let chain = vec![contract(Side::Call, 98.0, exp)];
        assert!(select_ladder(&chain, 100.0, Side::Call, 5).is_empty());
    }

    #[test]
    fn equal_strikes_keep_input_order() {
        let exp = date(2025, 10, 24);
        let mut a = contract(Side::Put, 140.0, exp);
        a.ticker = "A".into();
        let mut b = contract(Side::Put, 140.0, exp);
        b.ticker = "B".into();

        let ladder = select_ladder(&[a, b], 150.0, Side::Put, 5);
        assert_eq!(ladder[0].ticker, "A");
        assert_eq!(ladder[1].ticker, "B");
    }

    #[test]
    fn expirations_are_distinct_and_sorted() {
        let chain = vec![
            contract(Side::Put, 1.0, date(2025, 11, 7)),
            contract(Side::Call, 1.0, date(2025, 10, 24)),
            contract(Side::Put, 2.0, date(2025, 11, 7)),
            contract(Side::Put, 2.0, date(2025, 10, 31)),
        ];
        assert_eq!(
            group_by_expiration(&chain),
            vec![date(2025, 10, 24), date(2025, 10, 31), date(2025, 11, 7)]
        );
        assert!(group_by_expiration(&[]).is_empty());
    }

    #[test]
    fn near_term_keeps_the_horizon_day() {
        let today = date(2025, 10, 1);
        let chain = vec![
            contract(Side::Put, 1.0, date(2025, 10, 30)),
            contract(Side::Put, 1.0, date(2025, 10, 31)),
            contract(Side::Put, 1.0, date(2025, 11, 1)),
            contract(Side::Put, 1.0, date(2025, 12, 19)),
        ];
        let kept: Vec<NaiveDate> = near_term(&chain, today, NEAR_TERM_DAYS)
            .iter()
            .map(|c| c.expiration_date)
            .collect();
        assert_eq!(kept, vec![date(2025, 10, 30), date(2025, 10, 31)]);
    }

    #[test]
    fn days_to_expiration_clamps_past_dates() {
        let today = date(2025, 10, 20);
        assert_eq!(days_to_expiration(date(2025, 10, 24), today), 4);
        assert_eq!(days_to_expiration(today, today), 0);
        assert_eq!(days_to_expiration(date(2025, 10, 1), today), 0);
    }

    #[test]
    fn view_scopes_ladders_to_active_expiration() {
        let first = date(2025, 10, 24);
        let second = date(2025, 10, 31);
        let chain = vec![
            contract(Side::Put, 145.0, second),
            contract(Side::Put, 140.0, first),
            contract(Side::Call, 155.0, first),
            contract(Side::Call, 160.0, second),
        ];

        let view = ExpirationView::new(chain, 150.0, DEFAULT_LADDER_SIZE);
        assert_eq!(view.expirations(), &[first, second]);
        assert_eq!(view.active(), Some(first));
        assert_eq!(strikes(&view.puts()), vec![140.0]);
        assert_eq!(view.days_to_expiration(date(2025, 10, 20)), Some(4));

        let view = view.with_active(second).unwrap();
        assert_eq!(strikes(&view.puts()), vec![145.0]);
        assert_eq!(strikes(&view.calls()), vec![160.0]);

        let missing = date(2026, 1, 16);
        assert_eq!(
            view.with_active(missing).unwrap_err(),
            EngineError::UnknownExpiration { date: missing }
        );
    }

    #[test]
    fn empty_view_has_no_ladders() {
        let view = ExpirationView::new(Vec::new(), 150.0, DEFAULT_LADDER_SIZE);
        assert!(view.active().is_none());
        assert!(view.puts().is_empty());
        assert!(view.calls().is_empty());
        assert_eq!(view.days_to_expiration(date(2025, 10, 20)), None);
    }
}
