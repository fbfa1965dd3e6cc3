//! Account configuration types.
//!
//! Accounts live in a single `accounts.json` document (not JSONL) beside the
//! ledger files. The open flow consumes an account's name and balance;
//! the optional template pre-fills open-time parameters.

use super::position::{Direction, MarketType};
use serde::{Deserialize, Serialize};

/// A trading account: name, balance, display currency, and optional
/// open-time defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub balance: f64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<AccountTemplate>,
}

impl Account {
    /// Display currency, defaulting to USD when unset.
    pub fn currency_or_default(&self) -> &str {
        if self.currency.is_empty() {
            "USD"
        } else {
            &self.currency
        }
    }
}

/// Default open-time parameters attached to an account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_market_type: Option<MarketType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_direction: Option<Direction>,
}

/// On-disk shape of `accounts.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountConfig {
    pub accounts: Vec<Account>,
}
