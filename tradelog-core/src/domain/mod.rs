//! Domain types for the trading journal.

pub mod account;
pub mod position;

pub use account::{Account, AccountConfig, AccountTemplate};
pub use position::{
    format_holding_duration, generate_position_id, pnl_percentage, realized_pnl, CloseReason,
    Direction, MarketContext, MarketType, ParseEnumError, Position, Status,
};
