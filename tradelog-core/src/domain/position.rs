//! Position — the central entity, plus identifier generation and PnL
//! arithmetic.
//!
//! Everything in this module is pure: no I/O, no clock access except in
//! `generate_position_id`. Field names follow the ledger wire contract
//! (camelCase, enums lowercase/snake_case), so a file written by any
//! conforming journal reads back identically.

use chrono::{DateTime, Duration, Local, Timelike};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

/// Market the instrument trades on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    Crypto,
    Forex,
    Gold,
    Silver,
    Futures,
}

/// Position lifecycle state. `Open → Closed` is the only transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Open,
    Closed,
}

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    StopLoss,
    TakeProfit,
    Manual,
}

/// Optional market-regime annotation recorded at open time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketContext {
    Bull,
    Bear,
    None,
}

/// Failure to parse one of the journal enums from user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value} (expected one of {expected})")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

impl FromStr for Direction {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "long" => Ok(Direction::Long),
            "short" => Ok(Direction::Short),
            _ => Err(ParseEnumError {
                kind: "direction",
                value: s.to_string(),
                expected: "long, short",
            }),
        }
    }
}

impl FromStr for MarketType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "crypto" => Ok(MarketType::Crypto),
            "forex" => Ok(MarketType::Forex),
            "gold" => Ok(MarketType::Gold),
            "silver" => Ok(MarketType::Silver),
            "futures" => Ok(MarketType::Futures),
            _ => Err(ParseEnumError {
                kind: "market type",
                value: s.to_string(),
                expected: "crypto, forex, gold, silver, futures",
            }),
        }
    }
}

impl FromStr for CloseReason {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stop_loss" => Ok(CloseReason::StopLoss),
            "take_profit" => Ok(CloseReason::TakeProfit),
            "manual" => Ok(CloseReason::Manual),
            _ => Err(ParseEnumError {
                kind: "close reason",
                value: s.to_string(),
                expected: "stop_loss, take_profit, manual",
            }),
        }
    }
}

impl FromStr for MarketContext {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bull" => Ok(MarketContext::Bull),
            "bear" => Ok(MarketContext::Bear),
            "none" => Ok(MarketContext::None),
            _ => Err(ParseEnumError {
                kind: "market context",
                value: s.to_string(),
                expected: "bull, bear, none",
            }),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "long"),
            Direction::Short => write!(f, "short"),
        }
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MarketType::Crypto => "crypto",
            MarketType::Forex => "forex",
            MarketType::Gold => "gold",
            MarketType::Silver => "silver",
            MarketType::Futures => "futures",
        };
        write!(f, "{s}")
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Open => write!(f, "open"),
            Status::Closed => write!(f, "closed"),
        }
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CloseReason::StopLoss => "stop_loss",
            CloseReason::TakeProfit => "take_profit",
            CloseReason::Manual => "manual",
        };
        write!(f, "{s}")
    }
}

/// One trade: opened exactly once, amended at most once (on close), never
/// deleted.
///
/// While `status == Open` every close-side field is `None`; the close
/// operation sets them all together. The latest ledger record for a
/// `position_id` is authoritative (last write wins on read).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub position_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub account_name: String,
    /// Account balance snapshot taken when the position was opened.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub account_balance: f64,
    pub symbol: String,
    pub market_type: MarketType,
    pub open_time: DateTime<Local>,
    pub direction: Direction,
    pub open_price: f64,
    pub quantity: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub margin: f64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_context: Option<MarketContext>,
    pub status: Status,

    // Close side: absent until the position is closed, then set together.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_time: Option<DateTime<Local>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_quantity: Option<f64>,
    #[serde(rename = "realizedPnL", default, skip_serializing_if = "Option::is_none")]
    pub realized_pnl: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pnl_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holding_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_reason: Option<CloseReason>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub close_note: String,
}

fn is_zero(v: &f64) -> bool {
    *v == 0.0
}

impl Position {
    pub fn is_open(&self) -> bool {
        self.status == Status::Open
    }

    pub fn is_closed(&self) -> bool {
        self.status == Status::Closed
    }
}

/// Generate a sortable, human-legible position identifier:
/// `YYYYMMDD-HHMMSS-XXXX` (second-precision timestamp, 16-bit hex suffix).
///
/// The suffix comes from the OS entropy source. If that fails, the
/// sub-second nanoseconds stand in; collisions are acceptable only on that
/// fallback path.
pub fn generate_position_id() -> String {
    let now = Local::now();
    let stamp = now.format("%Y%m%d-%H%M%S");

    let mut bytes = [0u8; 2];
    match OsRng.try_fill_bytes(&mut bytes) {
        Ok(()) => format!("{stamp}-{:04X}", u16::from_be_bytes(bytes)),
        Err(_) => format!("{stamp}-{:04X}", now.nanosecond() % 65536),
    }
}

/// Realized PnL for a closed quantity.
///
/// Long: `(close - open) * qty`. Short: `(open - close) * qty`.
pub fn realized_pnl(direction: Direction, open_price: f64, close_price: f64, quantity: f64) -> f64 {
    match direction {
        Direction::Long => (close_price - open_price) * quantity,
        Direction::Short => (open_price - close_price) * quantity,
    }
}

/// PnL as a percentage of `base`. Returns 0.0 when `base` is zero; that is a
/// policy choice, not an error.
pub fn pnl_percentage(pnl: f64, base: f64) -> f64 {
    if base == 0.0 {
        return 0.0;
    }
    pnl / base * 100.0
}

/// Format a holding duration as `"{d}d {h}h {m}m"`, dropping leading zero
/// units. Seconds are truncated, not rounded. Negative durations render as
/// `"0m"`.
pub fn format_holding_duration(duration: Duration) -> String {
    if duration < Duration::zero() {
        return "0m".to_string();
    }
    let days = duration.num_days();
    let hours = duration.num_hours() % 24;
    let minutes = duration.num_minutes() % 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}
