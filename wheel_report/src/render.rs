//! Plain-text rendering of reports, chains and calculator results.

use std::fmt::{self, Write};

use chrono::NaiveDate;
use indexmap::IndexMap;
use wheel_engine::{
    Side,
    calculator::{WheelInput, WheelMetrics},
    estimate::{QuotedContract, ValueSource, quote_contracts},
    ladder::ExpirationView,
    technicals::{QuoteSummary, SmaPoint},
};

use crate::{config::ReportSection, report::Report};

const NOT_AVAILABLE: &str = "N/A";

fn money(v: f64) -> String {
    format!("${v:.2}")
}

fn signed_pct(v: f64) -> String {
    format!("{}{v:.2}%", if v >= 0.0 { "+" } else { "" })
}

fn open_interest(v: Option<u64>) -> String {
    v.map_or_else(|| NOT_AVAILABLE.to_string(), |oi| oi.to_string())
}

fn implied_volatility(v: Option<f64>) -> String {
    v.map_or_else(|| NOT_AVAILABLE.to_string(), |iv| format!("{:.1}%", iv * 100.0))
}

/// Estimated values carry a `~` prefix.
fn marked(v: String, source: ValueSource) -> String {
    match source {
        ValueSource::Upstream => v,
        ValueSource::Estimated => format!("~{v}"),
    }
}

fn side_label(side: Side) -> &'static str {
    match side {
        Side::Put => "put",
        Side::Call => "call",
    }
}

/// Runs a writer against a fresh `String`. Writing to a `String` cannot fail.
fn rendered(write: impl FnOnce(&mut String) -> fmt::Result) -> String {
    let mut out = String::new();
    write(&mut out).map_or_else(|_| String::new(), |()| out)
}

fn write_ladder(out: &mut impl Write, rows: &[QuotedContract], side: Side) -> fmt::Result {
    if rows.is_empty() {
        return writeln!(
            out,
            "  No {} options available for this expiration",
            side_label(side)
        );
    }
    writeln!(
        out,
        "  {:>9}  {:>9}  {:>6}  {:>7}  {:>8}  {:>7}",
        "Strike", "Premium", "Delta", "ROI", "OI", "IV"
    )?;
    for row in rows {
        writeln!(
            out,
            "  {:>9}  {:>9}  {:>6}  {:>7}  {:>8}  {:>7}",
            money(row.contract.strike_price),
            marked(money(row.premium), row.premium_source),
            marked(format!("{:.2}", row.delta), row.delta_source),
            format!("{:.2}%", row.roi),
            open_interest(row.open_interest),
            implied_volatility(row.implied_volatility),
        )?;
    }
    Ok(())
}

/// One ladder table, or the empty-ladder notice.
pub fn render_ladder(rows: &[QuotedContract], side: Side) -> String {
    rendered(|out| write_ladder(out, rows, side))
}

fn write_price(
    out: &mut impl Write,
    summary: &QuoteSummary,
    sma: &[SmaPoint],
    days: u32,
) -> fmt::Result {
    writeln!(out, "Price")?;
    writeln!(
        out,
        "  Last: {}  Change: {}",
        money(summary.last_price),
        signed_pct(summary.change_pct)
    )?;
    writeln!(
        out,
        "  Volume: {:.1}M / Prev {:.1}M",
        summary.volume_millions, summary.prev_volume_millions
    )?;
    let range = summary.range.map_or_else(
        || NOT_AVAILABLE.to_string(),
        |r| format!("{} - {}", money(r.low), money(r.high)),
    );
    writeln!(out, "  Range ({days}d): {range}")?;
    let sma = sma
        .last()
        .map_or_else(|| NOT_AVAILABLE.to_string(), |p| money(p.value));
    writeln!(out, "  SMA(20): {sma}")
}

fn write_expirations(out: &mut impl Write, view: &ExpirationView, as_of: NaiveDate) -> fmt::Result {
    let dates: Vec<String> = view
        .expirations()
        .iter()
        .map(|d| {
            if Some(*d) == view.active() {
                format!("[{d}]")
            } else {
                d.to_string()
            }
        })
        .collect();
    writeln!(out, "Expirations: {}", dates.join(" "))?;

    let Some(active) = view.active() else {
        return writeln!(out, "  No near-term expirations");
    };
    let days = view.days_to_expiration(as_of).unwrap_or(0);

    for side in [Side::Put, Side::Call] {
        let (ladder, heading) = match side {
            Side::Put => (view.puts(), "Cash-secured puts"),
            Side::Call => (view.calls(), "Covered calls"),
        };
        writeln!(out, "{heading} ({active}, {days} days)")?;
        write_ladder(out, &quote_contracts(&ladder, view.stock_price()), side)?;
    }
    Ok(())
}

fn write_calculator(out: &mut impl Write, input: &WheelInput, metrics: &WheelMetrics) -> fmt::Result {
    writeln!(out, "Wheel calculator")?;
    writeln!(
        out,
        "  Shares: {}  Trades/year: {}",
        input.shares, input.trades_per_year
    )?;
    writeln!(
        out,
        "  Put: strike {} premium {} (assigned {:.0}%)",
        money(input.put_strike),
        money(input.put_premium),
        input.put_assign_prob
    )?;
    writeln!(
        out,
        "  Call: strike {} premium {} (assigned {:.0}%)",
        money(input.call_strike),
        money(input.call_premium),
        input.call_assign_prob
    )?;
    writeln!(out, "  Capital required: {}", money(metrics.capital))?;
    writeln!(
        out,
        "  Avg premium/cycle: {}  Cycles/year: {:.2}",
        money(metrics.avg_premium_per_cycle),
        metrics.cycles_per_year
    )?;
    writeln!(out, "  Annual return: {:.2}%", metrics.annual_return_pct)?;
    writeln!(out, "  Max profit: {:.2}%", metrics.max_profit_pct)?;
    writeln!(
        out,
        "  Downside protection: {:.2}%",
        metrics.downside_protection_pct
    )?;
    writeln!(out, "  Break-even: {}", money(metrics.break_even))
}

/// Calculator inputs and results.
pub fn render_calculator(input: &WheelInput, metrics: &WheelMetrics) -> String {
    rendered(|out| write_calculator(out, input, metrics))
}

fn write_report(
    out: &mut impl Write,
    report: &Report,
    view: Option<&ExpirationView>,
    settings: &ReportSection,
) -> fmt::Result {
    writeln!(out, "{} wheel report, {}", report.symbol, report.as_of)?;
    writeln!(out)?;

    match report.summary() {
        Some(summary) => write_price(
            out,
            &summary,
            &report.moving_average(),
            settings.history_days,
        )?,
        None => writeln!(out, "Price: {NOT_AVAILABLE}")?,
    }
    writeln!(out)?;

    match view {
        Some(view) => write_expirations(out, view, report.as_of)?,
        None => writeln!(out, "Options: {NOT_AVAILABLE}")?,
    }
    writeln!(out)?;

    if let Some((input, metrics)) = report.calculator() {
        write_calculator(out, &input, &metrics)?;
    }

    let failures = report.failures();
    if !failures.is_empty() {
        writeln!(out)?;
        for (source, err) in failures {
            writeln!(out, "! {source} unavailable: {err}")?;
        }
    }
    Ok(())
}

/// The full report. `view` is the chain scoped to the selected expiration.
pub fn render_report(
    report: &Report,
    view: Option<&ExpirationView>,
    settings: &ReportSection,
) -> String {
    rendered(|out| write_report(out, report, view, settings))
}

fn write_chain(out: &mut impl Write, rows: &[QuotedContract], side: Side) -> fmt::Result {
    let mut groups: IndexMap<NaiveDate, Vec<QuotedContract>> = IndexMap::new();
    for row in rows.iter().filter(|r| r.contract.contract_type == side) {
        groups
            .entry(row.contract.expiration_date)
            .or_default()
            .push(row.clone());
    }
    groups.sort_keys();

    if groups.is_empty() {
        return write_ladder(out, &[], side);
    }
    for (date, mut rows) in groups {
        rows.sort_by(|a, b| a.contract.strike_price.total_cmp(&b.contract.strike_price));
        writeln!(out, "{date} ({} {}s)", rows.len(), side_label(side))?;
        write_ladder(out, &rows, side)?;
    }
    Ok(())
}

/// Every contract of one side, grouped by expiration.
pub fn render_chain(rows: &[QuotedContract], side: Side) -> String {
    rendered(|out| write_chain(out, rows, side))
}
