//! Trade ledger and profit-and-loss accounting
//!
//! Position changes only through recorded fills; the mark-to-market value is
//! a pure function of the fill history and the latest market price, so it can
//! be recomputed at any time without double-counting. The same accountant is
//! shared by composition across every agent class.

use crate::agent::Fill;
use market_core::Price;

/// Per-agent position, fill history and cached mark-to-market value
#[derive(Debug, Clone, Default)]
pub struct TradeLedger {
    position: i64,
    fills: Vec<Fill>,
    pnl: f64,
}

impl TradeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an executed trade. This is the only mutation path for the
    /// position; the matching engine owns the append.
    pub fn record_fill(&mut self, fill: Fill) {
        self.position += fill.signed_qty;
        self.fills.push(fill);
    }

    /// Recompute `pnl = realized + unrealized`:
    /// realized is the signed notional over all fills, unrealized marks the
    /// open position at the latest price haircut by slippage.
    pub fn mark_to_market(&mut self, last_price: Price, slippage: f64) -> f64 {
        let realized: f64 = self
            .fills
            .iter()
            .map(|fill| fill.price.to_f64() * fill.signed_qty as f64)
            .sum();
        let unrealized = self.position as f64 * last_price.to_f64() * (1.0 - slippage);
        self.pnl = realized + unrealized;
        self.pnl
    }

    /// Current inventory (positive = long, negative = short)
    pub fn position(&self) -> i64 {
        self.position
    }

    /// Last computed mark-to-market value
    pub fn pnl(&self) -> f64 {
        self.pnl
    }

    /// Full fill history, in execution order
    pub fn fills(&self) -> &[Fill] {
        &self.fills
    }
}
