//! Tradelog Report — read-only analytics over the reconciled ledger.
//!
//! Two independent reports, each recomputed from scratch on every call:
//! - Risk: exposure, per-position risk/reward, and margin concentration
//!   over currently open positions
//! - Performance: win/loss statistics and breakdowns over closed positions
//!
//! Every aggregate is a pure function over a position slice; the thin
//! `analyze_*` entry points wire them to the journal's read paths.

pub mod performance;
pub mod risk;

pub use performance::{
    analyze_performance, MarketTypeStats, PerformanceReport, SymbolStats,
};
pub use risk::{analyze_risk, PositionRisk, RiskReport};
