//! Journal — the operations façade driving the open → closed lifecycle.
//!
//! A `Journal` owns the ledger and is constructed once at process entry,
//! then passed explicitly to every call site. Opening validates then appends;
//! closing finds, validates, computes the realized PnL figures, and
//! re-appends the full record so fold-time reconciliation applies the
//! amendment.

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::domain::{
    format_holding_duration, generate_position_id, pnl_percentage, realized_pnl, CloseReason,
    Direction, MarketContext, MarketType, Position, Status,
};
use crate::ledger::{JsonlLedger, LedgerError};
use crate::validate::{validate_close, validate_open, ValidationError};

/// Everything a journal operation can fail with.
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Parameters for opening a position. `open_time` defaults to now.
#[derive(Debug, Clone)]
pub struct OpenParams {
    pub account_name: String,
    pub account_balance: f64,
    pub symbol: String,
    pub market_type: MarketType,
    pub direction: Direction,
    pub open_price: f64,
    pub quantity: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub margin: f64,
    pub reason: String,
    pub market_context: Option<MarketContext>,
    pub open_time: Option<DateTime<Local>>,
}

/// Parameters for closing a position. `close_time` defaults to now.
#[derive(Debug, Clone)]
pub struct CloseParams {
    pub close_price: f64,
    pub close_quantity: f64,
    pub close_reason: CloseReason,
    pub close_note: String,
    pub close_time: Option<DateTime<Local>>,
}

/// Status constraint for listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    Open,
    Closed,
    #[default]
    All,
}

impl StatusFilter {
    fn matches(self, status: Status) -> bool {
        match self {
            StatusFilter::Open => status == Status::Open,
            StatusFilter::Closed => status == Status::Closed,
            StatusFilter::All => true,
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = crate::domain::ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(StatusFilter::Open),
            "closed" => Ok(StatusFilter::Closed),
            "all" => Ok(StatusFilter::All),
            _ => Err(crate::domain::ParseEnumError {
                kind: "status filter",
                value: s.to_string(),
                expected: "open, closed, all",
            }),
        }
    }
}

/// Filters for listing positions. Filters compose with AND semantics; an
/// absent value means no constraint. Date bounds are inclusive and apply to
/// open time.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub status: StatusFilter,
    pub symbol: Option<String>,
    pub market_type: Option<MarketType>,
    pub account: Option<String>,
    pub from: Option<DateTime<Local>>,
    pub to: Option<DateTime<Local>>,
}

impl ListFilter {
    fn matches(&self, pos: &Position) -> bool {
        if !self.status.matches(pos.status) {
            return false;
        }
        if let Some(symbol) = &self.symbol {
            if &pos.symbol != symbol {
                return false;
            }
        }
        if let Some(market_type) = self.market_type {
            if pos.market_type != market_type {
                return false;
            }
        }
        if let Some(account) = &self.account {
            if &pos.account_name != account {
                return false;
            }
        }
        if let Some(from) = self.from {
            if pos.open_time < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if pos.open_time > to {
                return false;
            }
        }
        true
    }
}

/// The ledger façade: open, close, list, and the open-position read path.
#[derive(Debug, Clone)]
pub struct Journal {
    ledger: JsonlLedger,
}

impl Journal {
    /// Journal over a ledger rooted at `data_dir`.
    pub fn new(data_dir: impl Into<std::path::PathBuf>) -> Self {
        Self {
            ledger: JsonlLedger::new(data_dir),
        }
    }

    pub fn with_ledger(ledger: JsonlLedger) -> Self {
        Self { ledger }
    }

    /// Read access for the analytics layer.
    pub fn ledger(&self) -> &JsonlLedger {
        &self.ledger
    }

    /// Open a new position: stamp open time, generate an id, validate, and
    /// append. Returns the persisted position.
    pub fn open_position(&self, params: OpenParams) -> Result<Position, JournalError> {
        let open_time = params.open_time.unwrap_or_else(Local::now);

        let pos = Position {
            position_id: generate_position_id(),
            account_name: params.account_name,
            account_balance: params.account_balance,
            symbol: params.symbol,
            market_type: params.market_type,
            open_time,
            direction: params.direction,
            open_price: params.open_price,
            quantity: params.quantity,
            stop_loss: params.stop_loss,
            take_profit: params.take_profit,
            margin: params.margin,
            reason: params.reason,
            market_context: params.market_context,
            status: Status::Open,
            close_time: None,
            close_price: None,
            close_quantity: None,
            realized_pnl: None,
            pnl_percentage: None,
            holding_duration: None,
            close_reason: None,
            close_note: String::new(),
        };

        validate_open(&pos)?;
        self.ledger.append(&pos)?;

        Ok(pos)
    }

    /// Close a position: find it, validate the request, compute the PnL
    /// figures, set every close-side field together, and re-persist.
    pub fn close_position(
        &self,
        position_id: &str,
        params: CloseParams,
    ) -> Result<Position, JournalError> {
        let mut pos = self.ledger.find_by_id(position_id)?;

        validate_close(&pos, params.close_quantity)?;

        let close_time = params.close_time.unwrap_or_else(Local::now);
        let pnl = realized_pnl(
            pos.direction,
            pos.open_price,
            params.close_price,
            params.close_quantity,
        );
        let pnl_pct = pnl_percentage(pnl, pos.margin);
        let holding = format_holding_duration(close_time - pos.open_time);

        pos.status = Status::Closed;
        pos.close_time = Some(close_time);
        pos.close_price = Some(params.close_price);
        pos.close_quantity = Some(params.close_quantity);
        pos.realized_pnl = Some(pnl);
        pos.pnl_percentage = Some(pnl_pct);
        pos.holding_duration = Some(holding);
        pos.close_reason = Some(params.close_reason);
        pos.close_note = params.close_note;

        self.ledger.update(&pos)?;

        Ok(pos)
    }

    /// List positions matching the filter, sorted by open time.
    pub fn list_positions(&self, filter: &ListFilter) -> Result<Vec<Position>, JournalError> {
        let all = self.ledger.read_all()?;
        Ok(all.into_iter().filter(|p| filter.matches(p)).collect())
    }

    /// All currently open positions.
    pub fn open_positions(&self) -> Result<Vec<Position>, JournalError> {
        Ok(self.ledger.read_open()?)
    }
}
