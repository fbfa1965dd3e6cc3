//! Performance report over closed positions.
//!
//! All aggregates are recomputed per call from the reconciled position set.
//! Break-even trades count in neither the win nor the loss column. Every
//! rate and average is guarded by a positive trade count.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};
use tradelog_core::{CloseReason, Journal, JournalError, MarketType, Position};

/// Per-symbol aggregate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolStats {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub win_rate: f64,
    pub total_pnl: f64,
    pub average_pnl: f64,
}

/// Per-market-type aggregate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketTypeStats {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub win_rate: f64,
    pub total_pnl: f64,
    pub average_pnl: f64,
}

/// Aggregate performance over closed positions in an optional open-time
/// date range.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Winning trades as a percentage of all closed trades.
    pub win_rate: f64,
    pub total_pnl: f64,
    pub average_pnl: f64,
    pub best_trade: Option<Position>,
    pub worst_trade: Option<Position>,
    pub by_symbol: HashMap<String, SymbolStats>,
    pub by_market: HashMap<MarketType, MarketTypeStats>,
    pub by_close_reason: HashMap<CloseReason, usize>,
    /// Integer-second average of holding time across closed trades.
    pub average_holding_secs: i64,
}

impl PerformanceReport {
    /// Compute the report from the full position set. Open positions and
    /// positions outside the inclusive `[from, to]` open-time range are
    /// ignored. Pure.
    pub fn compute(
        positions: &[Position],
        from: Option<DateTime<Local>>,
        to: Option<DateTime<Local>>,
    ) -> Self {
        let mut report = PerformanceReport::default();
        let mut total_holding_secs = 0i64;

        for pos in positions {
            if !pos.is_closed() {
                continue;
            }
            if let Some(from) = from {
                if pos.open_time < from {
                    continue;
                }
            }
            if let Some(to) = to {
                if pos.open_time > to {
                    continue;
                }
            }

            // Close-side fields are set together on close; a reconciled
            // closed record without them never passes validation, so 0 is a
            // safe fallback for a hand-edited log.
            let pnl = pos.realized_pnl.unwrap_or(0.0);

            report.total_trades += 1;
            report.total_pnl += pnl;
            if pnl > 0.0 {
                report.winning_trades += 1;
            } else if pnl < 0.0 {
                report.losing_trades += 1;
            }

            let best = report
                .best_trade
                .as_ref()
                .and_then(|p| p.realized_pnl)
                .map_or(true, |b| pnl > b);
            if best {
                report.best_trade = Some(pos.clone());
            }
            let worst = report
                .worst_trade
                .as_ref()
                .and_then(|p| p.realized_pnl)
                .map_or(true, |w| pnl < w);
            if worst {
                report.worst_trade = Some(pos.clone());
            }

            let stats = report.by_symbol.entry(pos.symbol.clone()).or_default();
            stats.total_trades += 1;
            if pnl > 0.0 {
                stats.winning_trades += 1;
            }
            stats.total_pnl += pnl;

            let stats = report.by_market.entry(pos.market_type).or_default();
            stats.total_trades += 1;
            if pnl > 0.0 {
                stats.winning_trades += 1;
            }
            stats.total_pnl += pnl;

            if let Some(reason) = pos.close_reason {
                *report.by_close_reason.entry(reason).or_insert(0) += 1;
            }

            if let Some(close_time) = pos.close_time {
                total_holding_secs += (close_time - pos.open_time).num_seconds();
            }
        }

        if report.total_trades > 0 {
            let n = report.total_trades as f64;
            report.win_rate = report.winning_trades as f64 / n * 100.0;
            report.average_pnl = report.total_pnl / n;
            report.average_holding_secs = total_holding_secs / report.total_trades as i64;

            for stats in report.by_symbol.values_mut() {
                stats.win_rate = stats.winning_trades as f64 / stats.total_trades as f64 * 100.0;
                stats.average_pnl = stats.total_pnl / stats.total_trades as f64;
            }
            for stats in report.by_market.values_mut() {
                stats.win_rate = stats.winning_trades as f64 / stats.total_trades as f64 * 100.0;
                stats.average_pnl = stats.total_pnl / stats.total_trades as f64;
            }
        }

        report
    }

    /// Average holding time reconstituted as a duration.
    pub fn average_holding(&self) -> Duration {
        Duration::seconds(self.average_holding_secs)
    }
}

/// Read the full ledger and compute the performance report for the optional
/// inclusive open-time range.
pub fn analyze_performance(
    journal: &Journal,
    from: Option<DateTime<Local>>,
    to: Option<DateTime<Local>>,
) -> Result<PerformanceReport, JournalError> {
    let all = journal.ledger().read_all()?;
    Ok(PerformanceReport::compute(&all, from, to))
}
