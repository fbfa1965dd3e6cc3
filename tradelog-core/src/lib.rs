//! Tradelog Core — the position ledger.
//!
//! This crate contains the heart of the trading journal:
//! - Domain types (positions, accounts, market/direction/status enums)
//! - Position identifier generation and PnL arithmetic
//! - Stateless open/close validation
//! - Append-only JSONL ledger with last-write-wins reconciliation
//! - The `Journal` façade driving the open → closed lifecycle
//!
//! Presentation (prompting, tables, colors) lives in `tradelog-cli`; it only
//! ever calls the public operations exposed here.

pub mod accounts;
pub mod domain;
pub mod journal;
pub mod ledger;
pub mod validate;

pub use accounts::{AccountBook, AccountError};
pub use domain::{
    format_holding_duration, generate_position_id, pnl_percentage, realized_pnl, Account,
    AccountTemplate, CloseReason, Direction, MarketContext, MarketType, ParseEnumError, Position,
    Status,
};
pub use journal::{CloseParams, Journal, JournalError, ListFilter, OpenParams, StatusFilter};
pub use ledger::{JsonlLedger, LedgerError};
pub use validate::{validate_close, validate_open, ValidationError};
