//! Market state snapshot
//!
//! The immutable per-step view every agent receives: the market price history
//! (most-recent-last), the slippage haircut applied to unrealized value, and
//! the aggregate mean buy/sell quote prices across all agents. Agents only
//! read this; the orchestrator rebuilds or extends it between steps.

use crate::error::{AgentError, Result};
use market_core::{Price, stats};

#[derive(Debug, Clone, Default)]
pub struct MarketState {
    /// Historical market prices, most recent last
    pub prices: Vec<Price>,
    /// Slippage ratio applied when marking open positions to market
    pub slippage: f64,
    /// Mean buy quote price across all agents this step
    pub mean_buy_price: f64,
    /// Mean sell quote price across all agents this step
    pub mean_sell_price: f64,
}

impl MarketState {
    pub fn new(prices: Vec<Price>, slippage: f64) -> Self {
        Self {
            prices,
            slippage,
            mean_buy_price: 0.0,
            mean_sell_price: 0.0,
        }
    }

    /// Attach the aggregate quote means for this step
    pub fn with_quote_means(mut self, mean_buy_price: f64, mean_sell_price: f64) -> Self {
        self.mean_buy_price = mean_buy_price;
        self.mean_sell_price = mean_sell_price;
        self
    }

    /// Append the next step's market price
    pub fn push_price(&mut self, price: Price) {
        self.prices.push(price);
    }

    /// Latest market price
    pub fn last_price(&self) -> Result<Price> {
        self.prices
            .last()
            .copied()
            .ok_or(AgentError::EmptyPriceHistory)
    }

    /// Last `window` prices as f64, shortened to whatever is available
    fn tail(&self, window: usize) -> Vec<f64> {
        let start = self.prices.len().saturating_sub(window);
        self.prices[start..].iter().map(|p| p.to_f64()).collect()
    }

    /// Mean over the last `window` prices.
    ///
    /// Averages over the available history when fewer observations exist;
    /// only an empty history is an error, so NaN never reaches a price
    /// formula.
    pub fn moving_average(&self, window: usize) -> Result<f64> {
        stats::mean(&self.tail(window)).ok_or(AgentError::EmptyPriceHistory)
    }

    /// Population standard deviation over the last `window` prices, with the
    /// same lenient-window policy as `moving_average`.
    pub fn volatility(&self, window: usize) -> Result<f64> {
        stats::std_dev(&self.tail(window)).ok_or(AgentError::EmptyPriceHistory)
    }

    /// Short-window over long-window moving-average ratio; > 1 signals
    /// upward momentum.
    pub fn trend_ratio(&self, short_window: usize, long_window: usize) -> Result<f64> {
        let short_ma = self.moving_average(short_window)?;
        let long_ma = self.moving_average(long_window)?;
        if long_ma == 0.0 {
            return Err(AgentError::DegenerateHistory {
                window: long_window,
            });
        }
        Ok(short_ma / long_ma)
    }
}
