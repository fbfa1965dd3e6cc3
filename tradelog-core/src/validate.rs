//! Stateless validation for open and close transitions.
//!
//! Checks run eagerly to the first failure: required fields, then positive
//! values, then stop/take-profit presence, then range ordering. Validation
//! never mutates; the caller commits only after it passes.

use crate::domain::{Direction, Position};
use thiserror::Error;

/// A rejected open or close request. Each variant carries the field name and
/// offending value so the caller can correct input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("required field is missing: {field}")]
    MissingField { field: &'static str },

    #[error("invalid price value: {field} must be positive, got {value}")]
    InvalidPrice { field: &'static str, value: f64 },

    #[error("invalid quantity value: must be positive, got {value}")]
    InvalidQuantity { value: f64 },

    #[error("stop loss must be set to a positive price")]
    StopLossRequired,

    #[error("take profit must be set to a positive price")]
    TakeProfitRequired,

    #[error(
        "stop loss price out of valid range: for a {direction} position, \
         stop loss {stop_loss} is on the wrong side of open price {open_price}"
    )]
    StopLossRange {
        direction: Direction,
        stop_loss: f64,
        open_price: f64,
    },

    #[error(
        "take profit price out of valid range: for a {direction} position, \
         take profit {take_profit} is on the wrong side of open price {open_price}"
    )]
    TakeProfitRange {
        direction: Direction,
        take_profit: f64,
        open_price: f64,
    },

    #[error("position already closed: {id}")]
    AlreadyClosed { id: String },

    #[error("close quantity {requested} exceeds position quantity {available}")]
    CloseQuantityExceeds { requested: f64, available: f64 },
}

/// Validate a freshly built open position before it is appended.
///
/// Ordering invariant for stops: long requires
/// `stop_loss < open_price < take_profit`; short requires
/// `take_profit < open_price < stop_loss`.
pub fn validate_open(pos: &Position) -> Result<(), ValidationError> {
    if pos.symbol.is_empty() {
        return Err(ValidationError::MissingField { field: "symbol" });
    }

    if pos.open_price <= 0.0 {
        return Err(ValidationError::InvalidPrice {
            field: "openPrice",
            value: pos.open_price,
        });
    }
    if pos.quantity <= 0.0 {
        return Err(ValidationError::InvalidQuantity {
            value: pos.quantity,
        });
    }
    if pos.margin <= 0.0 {
        return Err(ValidationError::InvalidPrice {
            field: "margin",
            value: pos.margin,
        });
    }

    if pos.stop_loss <= 0.0 {
        return Err(ValidationError::StopLossRequired);
    }
    if pos.take_profit <= 0.0 {
        return Err(ValidationError::TakeProfitRequired);
    }

    match pos.direction {
        Direction::Long => {
            if pos.stop_loss >= pos.open_price {
                return Err(ValidationError::StopLossRange {
                    direction: pos.direction,
                    stop_loss: pos.stop_loss,
                    open_price: pos.open_price,
                });
            }
            if pos.take_profit <= pos.open_price {
                return Err(ValidationError::TakeProfitRange {
                    direction: pos.direction,
                    take_profit: pos.take_profit,
                    open_price: pos.open_price,
                });
            }
        }
        Direction::Short => {
            if pos.stop_loss <= pos.open_price {
                return Err(ValidationError::StopLossRange {
                    direction: pos.direction,
                    stop_loss: pos.stop_loss,
                    open_price: pos.open_price,
                });
            }
            if pos.take_profit >= pos.open_price {
                return Err(ValidationError::TakeProfitRange {
                    direction: pos.direction,
                    take_profit: pos.take_profit,
                    open_price: pos.open_price,
                });
            }
        }
    }

    Ok(())
}

/// Validate a close request against the position's current state.
pub fn validate_close(pos: &Position, close_quantity: f64) -> Result<(), ValidationError> {
    if pos.is_closed() {
        return Err(ValidationError::AlreadyClosed {
            id: pos.position_id.clone(),
        });
    }

    if close_quantity <= 0.0 {
        return Err(ValidationError::InvalidQuantity {
            value: close_quantity,
        });
    }
    if close_quantity > pos.quantity {
        return Err(ValidationError::CloseQuantityExceeds {
            requested: close_quantity,
            available: pos.quantity,
        });
    }

    Ok(())
}
