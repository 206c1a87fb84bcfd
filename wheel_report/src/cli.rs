//! Command-line interface of `wheel-report`.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, Utc};
use clap::{ArgAction, Parser, Subcommand};
use market_data::models::option_contract::ContractType;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wheel_engine::{
    calculator::{WheelInput, compute_wheel_metrics},
    estimate::quote_contracts,
};

use crate::{
    config::{AppConfig, load_config},
    render::{render_calculator, render_chain, render_report},
    service::ReportService,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Wheel strategy report for a US stock")]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Price summary, expirations, put and call ladders, calculator
    Report {
        /// Ticker symbol (e.g. "AAPL")
        #[arg(long)]
        symbol: String,

        /// Calendar days of daily history
        #[arg(long)]
        days: Option<u32>,

        /// Expiration to show (YYYY-MM-DD); defaults to the earliest
        #[arg(long)]
        expiry: Option<NaiveDate>,

        /// Strikes per ladder
        #[arg(long)]
        ladder: Option<usize>,
    },

    /// Every near-term contract of one side
    Chain {
        /// Ticker symbol (e.g. "AAPL")
        #[arg(long)]
        symbol: String,

        /// put or call
        #[arg(long, default_value = "put")]
        side: ContractType,
    },

    /// Offline wheel return calculator
    Calc {
        /// Current stock price; seeds every other input
        #[arg(long)]
        price: f64,

        #[arg(long)]
        shares: Option<u32>,

        #[arg(long)]
        put_strike: Option<f64>,

        #[arg(long)]
        put_premium: Option<f64>,

        #[arg(long)]
        call_strike: Option<f64>,

        #[arg(long)]
        call_premium: Option<f64>,

        /// Weeks traded per year
        #[arg(long)]
        trades_per_year: Option<u32>,

        /// Put assignment probability, percent
        #[arg(long)]
        put_assign: Option<f64>,

        /// Call assignment probability, percent
        #[arg(long)]
        call_assign: Option<f64>,
    },
}

/// Installs the fmt subscriber. `RUST_LOG` wins over `-v`.
pub fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Runs one command and returns the text to print.
pub async fn run(cli: Cli) -> Result<String> {
    let mut cfg = load_config(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Command::Calc {
            price,
            shares,
            put_strike,
            put_premium,
            call_strike,
            call_premium,
            trades_per_year,
            put_assign,
            call_assign,
        } => {
            if !(price.is_finite() && price > 0.0) {
                bail!("--price must be a positive number, got {price}");
            }
            let seeded = WheelInput::from_stock_price(price);
            let input = seeded
                .with_shares(shares.unwrap_or(seeded.shares))
                .with_put(
                    put_strike.unwrap_or(seeded.put_strike),
                    put_premium.unwrap_or(seeded.put_premium),
                )
                .with_call(
                    call_strike.unwrap_or(seeded.call_strike),
                    call_premium.unwrap_or(seeded.call_premium),
                )
                .with_trades_per_year(trades_per_year.unwrap_or(seeded.trades_per_year))
                .with_assignment(
                    put_assign.unwrap_or(seeded.put_assign_prob),
                    call_assign.unwrap_or(seeded.call_assign_prob),
                );
            Ok(render_calculator(&input, &compute_wheel_metrics(&input)))
        }

        Command::Report {
            symbol,
            days,
            expiry,
            ladder,
        } => {
            if let Some(days) = days {
                cfg.report.history_days = days;
            }
            if let Some(size) = ladder {
                cfg.report.ladder_size = size;
            }
            let service = build_service(&cfg)?;
            let published = service
                .report(&symbol, today())
                .await
                .context("report superseded by a newer request")?;
            let report = &published.value;

            let view = match (report.expiration_view(service.settings()), expiry) {
                (Some(view), Some(date)) => Some(
                    view.with_active(date)
                        .with_context(|| format!("selecting expiration for {}", report.symbol))?,
                ),
                (view, _) => view,
            };
            info!(symbol = %report.symbol, failed = report.failures().len(), "report ready");
            Ok(render_report(report, view.as_ref(), service.settings()))
        }

        Command::Chain { symbol, side } => {
            let service = build_service(&cfg)?;
            let as_of = today();
            let (quote, chain) = tokio::join!(
                service.quote(&symbol),
                service.options_chain(&symbol, as_of)
            );
            let quote = quote.with_context(|| format!("fetching quote for {symbol}"))?;
            let chain = chain.with_context(|| format!("fetching options chain for {symbol}"))?;

            let near = wheel_engine::ladder::near_term(&chain, as_of, cfg.report.near_term_days);
            let rows = quote_contracts(&near, quote.last_price);
            Ok(format!(
                "{} {} chain at ${:.2}\n{}",
                quote.symbol,
                side,
                quote.last_price,
                render_chain(&rows, side)
            ))
        }
    }
}

fn build_service(
    cfg: &AppConfig,
) -> Result<ReportService<market_data::providers::polygon_rest::PolygonProvider>> {
    ReportService::from_config(cfg).context("creating Polygon client (is POLYGON_API_KEY set?)")
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn report_arguments_parse() {
        let cli = Cli::try_parse_from([
            "wheel-report",
            "-vv",
            "report",
            "--symbol",
            "AAPL",
            "--expiry",
            "2025-10-24",
            "--ladder",
            "3",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Report {
                symbol,
                expiry,
                ladder,
                days,
            } => {
                assert_eq!(symbol, "AAPL");
                assert_eq!(expiry, NaiveDate::from_ymd_opt(2025, 10, 24));
                assert_eq!(ladder, Some(3));
                assert_eq!(days, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn chain_side_parses_and_rejects_unknown() {
        let cli =
            Cli::try_parse_from(["wheel-report", "chain", "--symbol", "MSFT", "--side", "call"])
                .unwrap();
        assert!(matches!(
            cli.command,
            Command::Chain {
                side: ContractType::Call,
                ..
            }
        ));
        assert!(
            Cli::try_parse_from(["wheel-report", "chain", "--symbol", "MSFT", "--side", "straddle"])
                .is_err()
        );
    }

    #[tokio::test]
    #[serial]
    async fn calc_runs_offline() {
        let cli = Cli::try_parse_from([
            "wheel-report",
            "calc",
            "--price",
            "150",
            "--call-strike",
            "158",
        ])
        .unwrap();
        let text = run(cli).await.unwrap();
        assert!(text.contains("Capital required: $14200.00"));
        assert!(text.contains("Annual return: 29.91%"));
    }

    #[tokio::test]
    #[serial]
    async fn calc_rejects_non_positive_price() {
        let cli = Cli::try_parse_from(["wheel-report", "calc", "--price", "0"]).unwrap();
        assert!(run(cli).await.is_err());
    }
}
