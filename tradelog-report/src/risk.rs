//! Risk report over currently open positions.
//!
//! Max possible loss per position is the stop distance on the losing side
//! times quantity; risk/reward compares it to the take-profit distance.
//! Concentration sums margin per symbol and per market type.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tradelog_core::{Direction, Journal, JournalError, MarketType, Position};

/// Margin share above which a single symbol or market type draws a warning.
const CONCENTRATION_WARN_PERCENT: f64 = 40.0;

/// Risk/reward ratio below which a position draws a warning.
const RISK_REWARD_WARN_THRESHOLD: f64 = 2.0;

/// Risk figures for one open position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionRisk {
    pub position_id: String,
    pub symbol: String,
    pub direction: Direction,
    pub margin: f64,
    /// Loss if the stop is hit: stop distance on the losing side × quantity.
    pub possible_loss: f64,
    /// Potential profit at take-profit divided by possible loss; 0 when the
    /// possible loss is not positive.
    pub risk_reward_ratio: f64,
}

/// Aggregate risk over the open position set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskReport {
    pub total_margin: f64,
    pub max_possible_loss: f64,
    /// Max possible loss as a percentage of total margin.
    pub risk_exposure_percent: f64,
    pub position_count: usize,
    pub position_risks: Vec<PositionRisk>,
    pub concentration_by_symbol: HashMap<String, f64>,
    pub concentration_by_market: HashMap<MarketType, f64>,
    pub warnings: Vec<String>,
}

impl RiskReport {
    /// Compute the full report from an open-position slice. Pure.
    pub fn compute(open_positions: &[Position]) -> Self {
        let mut report = RiskReport {
            total_margin: 0.0,
            max_possible_loss: 0.0,
            risk_exposure_percent: 0.0,
            position_count: 0,
            position_risks: Vec::new(),
            concentration_by_symbol: HashMap::new(),
            concentration_by_market: HashMap::new(),
            warnings: Vec::new(),
        };

        for pos in open_positions {
            report.total_margin += pos.margin;
            report.position_count += 1;

            let possible_loss = match pos.direction {
                Direction::Long => (pos.open_price - pos.stop_loss) * pos.quantity,
                Direction::Short => (pos.stop_loss - pos.open_price) * pos.quantity,
            };
            report.max_possible_loss += possible_loss;

            let risk_reward_ratio = if possible_loss > 0.0 {
                let potential_profit = match pos.direction {
                    Direction::Long => (pos.take_profit - pos.open_price) * pos.quantity,
                    Direction::Short => (pos.open_price - pos.take_profit) * pos.quantity,
                };
                potential_profit / possible_loss
            } else {
                0.0
            };

            report.position_risks.push(PositionRisk {
                position_id: pos.position_id.clone(),
                symbol: pos.symbol.clone(),
                direction: pos.direction,
                margin: pos.margin,
                possible_loss,
                risk_reward_ratio,
            });

            *report
                .concentration_by_symbol
                .entry(pos.symbol.clone())
                .or_insert(0.0) += pos.margin;
            *report
                .concentration_by_market
                .entry(pos.market_type)
                .or_insert(0.0) += pos.margin;
        }

        if report.total_margin > 0.0 {
            report.risk_exposure_percent =
                report.max_possible_loss / report.total_margin * 100.0;
            report.generate_warnings();
        }

        report
    }

    fn generate_warnings(&mut self) {
        // Deterministic warning order: symbols, then market types, then
        // position risk/reward, each in a stable order.
        let mut symbols: Vec<(&String, &f64)> = self.concentration_by_symbol.iter().collect();
        symbols.sort_by(|a, b| a.0.cmp(b.0));
        for (symbol, margin) in symbols {
            let share = margin / self.total_margin * 100.0;
            if share > CONCENTRATION_WARN_PERCENT {
                self.warnings.push(format!(
                    "symbol {symbol} concentration too high: {share:.2}% of total margin"
                ));
            }
        }

        let mut markets: Vec<(&MarketType, &f64)> = self.concentration_by_market.iter().collect();
        markets.sort_by_key(|(mt, _)| mt.to_string());
        for (market, margin) in markets {
            let share = margin / self.total_margin * 100.0;
            if share > CONCENTRATION_WARN_PERCENT {
                self.warnings.push(format!(
                    "market type {market} concentration too high: {share:.2}% of total margin"
                ));
            }
        }

        for risk in &self.position_risks {
            if risk.risk_reward_ratio < RISK_REWARD_WARN_THRESHOLD {
                self.warnings.push(format!(
                    "position {} risk/reward ratio is low: {:.2}",
                    risk.position_id, risk.risk_reward_ratio
                ));
            }
        }
    }
}

/// Read the open position set and compute the risk report.
pub fn analyze_risk(journal: &Journal) -> Result<RiskReport, JournalError> {
    let open = journal.open_positions()?;
    Ok(RiskReport::compute(&open))
}
