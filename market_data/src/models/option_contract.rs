//! Option contracts as delivered by a market data provider.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Put or call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractType {
    Put,
    Call,
}

#[derive(Debug, Error)]
#[error("Unknown contract type: {0}")]
pub struct ContractTypeError(pub String);

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractType::Put => f.write_str("put"),
            ContractType::Call => f.write_str("call"),
        }
    }
}

impl FromStr for ContractType {
    type Err = ContractTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "put" | "p" => Ok(ContractType::Put),
            "call" | "c" => Ok(ContractType::Call),
            _ => Err(ContractTypeError(s.to_string())),
        }
    }
}

/// A single listed option contract.
///
/// Contracts are never mutated after they are fetched. The optional market
/// fields are `None` whenever the upstream omitted them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    /// Provider contract identifier (e.g., "O:AAPL251024P00142500").
    pub ticker: String,
    /// Ticker of the underlying stock.
    pub underlying_ticker: String,
    pub contract_type: ContractType,
    pub strike_price: f64,
    pub expiration_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premium: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_interest: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implied_volatility: Option<f64>,
}

impl OptionContract {
    pub fn is_put(&self) -> bool {
        self.contract_type == ContractType::Put
    }

    pub fn is_call(&self) -> bool {
        self.contract_type == ContractType::Call
    }
}
