//! Wheel strategy return calculator.
//!
//! One cycle sells a cash-secured put and, when it is assigned, a covered
//! call against the shares. Returns are annualized from the number of
//! cycles that fit in the trading year.

use serde::{Deserialize, Serialize};

use crate::{finite_or_zero, percent_of};

/// Length of one put-then-call cycle in weeks.
///
/// A simplifying assumption: real cycles vary with assignment and the
/// expirations chosen.
pub const WEEKS_PER_CYCLE: f64 = 6.0;
/// Default put strike as a fraction of the stock price.
pub const PUT_STRIKE_FACTOR: f64 = 0.95;
/// Default call strike as a fraction of the stock price.
pub const CALL_STRIKE_FACTOR: f64 = 1.05;
/// Default put premium as a fraction of the stock price.
pub const PUT_PREMIUM_FACTOR: f64 = 0.03;
/// Default call premium as a fraction of the stock price.
pub const CALL_PREMIUM_FACTOR: f64 = 0.02;
/// Shares per standard contract.
pub const DEFAULT_SHARES: u32 = 100;
/// Trading weeks per year.
pub const DEFAULT_TRADES_PER_YEAR: u32 = 52;
/// Default assignment probability for either leg, in percent.
pub const DEFAULT_ASSIGNMENT_PCT: f64 = 30.0;

/// Calculator inputs. Edited by value through the `with_*` methods.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelInput {
    /// Shares covered by the position.
    pub shares: u32,
    /// Strike of the cash-secured put.
    pub put_strike: f64,
    /// Put premium per share.
    pub put_premium: f64,
    /// Strike of the covered call.
    pub call_strike: f64,
    /// Call premium per share.
    pub call_premium: f64,
    /// Weeks traded per year.
    pub trades_per_year: u32,
    /// Chance the put is assigned, in percent.
    pub put_assign_prob: f64,
    /// Chance the call is assigned, in percent. Shown, not used in the returns.
    pub call_assign_prob: f64,
}

impl WheelInput {
    /// Defaults derived from the current stock price.
    ///
    /// Strikes and premiums are rounded down to whole dollars.
    pub fn from_stock_price(stock_price: f64) -> Self {
        let floor = |factor: f64| finite_or_zero((stock_price * factor).floor()).max(0.0);
        Self {
            shares: DEFAULT_SHARES,
            put_strike: floor(PUT_STRIKE_FACTOR),
            put_premium: floor(PUT_PREMIUM_FACTOR),
            call_strike: floor(CALL_STRIKE_FACTOR),
            call_premium: floor(CALL_PREMIUM_FACTOR),
            trades_per_year: DEFAULT_TRADES_PER_YEAR,
            put_assign_prob: DEFAULT_ASSIGNMENT_PCT,
            call_assign_prob: DEFAULT_ASSIGNMENT_PCT,
        }
    }

    /// Sets the share count.
    pub fn with_shares(self, shares: u32) -> Self {
        Self { shares, ..self }
    }

    /// Sets the put strike and premium.
    pub fn with_put(self, strike: f64, premium: f64) -> Self {
        Self {
            put_strike: strike,
            put_premium: premium,
            ..self
        }
    }

    /// Sets the call strike and premium.
    pub fn with_call(self, strike: f64, premium: f64) -> Self {
        Self {
            call_strike: strike,
            call_premium: premium,
            ..self
        }
    }

    /// Sets the weeks traded per year.
    pub fn with_trades_per_year(self, trades_per_year: u32) -> Self {
        Self {
            trades_per_year,
            ..self
        }
    }

    /// Sets both assignment probabilities, clamped to `[0, 100]`.
    pub fn with_assignment(self, put_pct: f64, call_pct: f64) -> Self {
        Self {
            put_assign_prob: clamp_pct(put_pct),
            call_assign_prob: clamp_pct(call_pct),
            ..self
        }
    }
}

fn clamp_pct(pct: f64) -> f64 {
    finite_or_zero(pct).clamp(0.0, 100.0)
}

/// Outputs of [`compute_wheel_metrics`]. Every field is finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WheelMetrics {
    /// Cash needed to secure the put.
    pub capital: f64,
    /// Premium collected on the put leg.
    pub put_income: f64,
    /// Premium collected on the call leg.
    pub call_income: f64,
    /// Probability-weighted premium per cycle.
    pub avg_premium_per_cycle: f64,
    /// Cycles per year.
    pub cycles_per_year: f64,
    /// Annualized premium over capital, in percent.
    pub annual_return_pct: f64,
    /// Return when both legs are assigned, in percent of capital.
    pub max_profit_pct: f64,
    /// Put premium over put strike, in percent.
    pub downside_protection_pct: f64,
    /// Put strike less put premium.
    pub break_even: f64,
}

/// Computes the wheel returns for `input`.
///
/// Zero capital or a zero put strike gives `0.0` for the affected
/// percentages.
pub fn compute_wheel_metrics(input: &WheelInput) -> WheelMetrics {
    let shares = f64::from(input.shares);
    let capital = finite_or_zero(input.put_strike * shares);
    let put_income = finite_or_zero(input.put_premium * shares);
    let call_income = finite_or_zero(input.call_premium * shares);

    let put_assigned = clamp_pct(input.put_assign_prob) / 100.0;
    let avg_premium_per_cycle = finite_or_zero(put_income + put_assigned * call_income);
    let cycles_per_year = f64::from(input.trades_per_year) / WEEKS_PER_CYCLE;

    let max_profit =
        (input.call_strike - input.put_strike) * shares + put_income + call_income;

    WheelMetrics {
        capital,
        put_income,
        call_income,
        avg_premium_per_cycle,
        cycles_per_year,
        annual_return_pct: percent_of(avg_premium_per_cycle * cycles_per_year, capital),
        max_profit_pct: percent_of(max_profit, capital),
        downside_protection_pct: percent_of(input.put_premium, input.put_strike),
        break_even: finite_or_zero(input.put_strike - input.put_premium),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_input() -> WheelInput {
        WheelInput {
            shares: 100,
            put_strike: 142.0,
            put_premium: 4.0,
            call_strike: 158.0,
            call_premium: 3.0,
            trades_per_year: 52,
            put_assign_prob: 30.0,
            call_assign_prob: 30.0,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn reference_scenario() {
        let m = compute_wheel_metrics(&reference_input());
        assert_eq!(m.capital, 14_200.0);
        assert_eq!(m.put_income, 400.0);
        assert_eq!(m.call_income, 300.0);
        assert!(approx(m.avg_premium_per_cycle, 490.0));
        assert!(approx(m.annual_return_pct, 29.906));
        assert!(approx(m.max_profit_pct, 16.197));
        assert!(approx(m.downside_protection_pct, 2.817));
        assert_eq!(m.break_even, 138.0);
    }

    #[test]
    fn defaults_follow_stock_price() {
        let input = WheelInput::from_stock_price(150.0);
        assert_eq!(input.put_strike, 142.0);
        assert_eq!(input.call_strike, 157.0);
        assert_eq!(input.put_premium, 4.0);
        assert_eq!(input.call_premium, 3.0);
        assert_eq!(input.shares, DEFAULT_SHARES);
        assert_eq!(input.trades_per_year, DEFAULT_TRADES_PER_YEAR);
    }

    #[test]
    fn builders_edit_copies() {
        let base = reference_input();
        let edited = base
            .with_shares(200)
            .with_put(140.0, 5.0)
            .with_call(160.0, 2.5)
            .with_trades_per_year(26)
            .with_assignment(150.0, -5.0);

        assert_eq!(base.shares, 100);
        assert_eq!(edited.shares, 200);
        assert_eq!((edited.put_strike, edited.put_premium), (140.0, 5.0));
        assert_eq!((edited.call_strike, edited.call_premium), (160.0, 2.5));
        assert_eq!(edited.trades_per_year, 26);
        assert_eq!(edited.put_assign_prob, 100.0);
        assert_eq!(edited.call_assign_prob, 0.0);
    }

    #[test]
    fn degenerate_inputs_stay_finite() {
        let zero_shares = compute_wheel_metrics(&reference_input().with_shares(0));
        assert_eq!(zero_shares.capital, 0.0);
        assert_eq!(zero_shares.annual_return_pct, 0.0);
        assert_eq!(zero_shares.max_profit_pct, 0.0);

        let zero_strike = compute_wheel_metrics(&reference_input().with_put(0.0, 4.0));
        assert_eq!(zero_strike.downside_protection_pct, 0.0);
        assert_eq!(zero_strike.annual_return_pct, 0.0);

        let zero_price = WheelInput::from_stock_price(0.0);
        let m = compute_wheel_metrics(&zero_price);
        for v in [
            m.capital,
            m.annual_return_pct,
            m.max_profit_pct,
            m.downside_protection_pct,
            m.break_even,
        ] {
            assert!(v.is_finite());
        }
    }
}
