//! Trend follower
//!
//! Compares a short and a long moving average of market price and works its
//! inventory toward a constant target position in the trend's direction.
//! Exactly one side can be active per step; the inactive side stays absent.

use crate::agent::{Agent, AgentId, Fill};
use crate::error::Result;
use crate::latency::LatencyModel;
use crate::ledger::TradeLedger;
use crate::market_state::MarketState;
use crate::order::{Order, QuotePair};
use market_core::{Price, Side};
use rand::prelude::*;
use rand_distr::StandardNormal;

/// Configuration for the trend follower
#[derive(Debug, Clone)]
pub struct TrendFollowerConfig {
    /// Base latency before the stochastic component
    pub delta: f64,
    /// Price concession when chasing the trend
    pub price_margin: f64,
    /// Target absolute position in either direction
    pub const_position_size: i64,
    /// Short moving-average window
    pub short_window: usize,
    /// Long moving-average window
    pub long_window: usize,
    /// Std deviation of the relative price noise
    pub noise_sigma: f64,
    /// Random seed (for reproducibility)
    pub seed: Option<u64>,
}

impl Default for TrendFollowerConfig {
    fn default() -> Self {
        Self {
            delta: 0.1,
            price_margin: 0.05,
            const_position_size: 5,
            short_window: 50,
            long_window: 200,
            noise_sigma: 0.01,
            seed: None,
        }
    }
}

/// Trend-following agent
pub struct TrendFollower {
    id: AgentId,
    config: TrendFollowerConfig,
    latency_model: LatencyModel,
    ledger: TradeLedger,
    quotes: QuotePair,
    latency: f64,
    rng: StdRng,
}

impl TrendFollower {
    pub fn new(id: impl Into<String>, config: TrendFollowerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            id: AgentId::new(id),
            latency_model: LatencyModel::Additive {
                delta: config.delta,
            },
            latency: config.delta,
            config,
            ledger: TradeLedger::new(),
            quotes: QuotePair::default(),
            rng,
        }
    }
}

impl Agent for TrendFollower {
    fn id(&self) -> &AgentId {
        &self.id
    }

    fn agent_type(&self) -> &'static str {
        "TrendFollower"
    }

    fn calculate_buy_price(&mut self, state: &MarketState) -> Result<Option<Price>> {
        let last = state.last_price()?.to_f64();
        let noise: f64 = self.rng.sample(StandardNormal);
        let price = last * (1.0 + self.config.price_margin + self.config.noise_sigma * noise);
        Ok(Some(Price::from_f64(price).clamp_non_negative()))
    }

    fn calculate_sell_price(&mut self, state: &MarketState) -> Result<Option<Price>> {
        let last = state.last_price()?.to_f64();
        let noise: f64 = self.rng.sample(StandardNormal);
        let price = last * (1.0 + self.config.noise_sigma * noise);
        Ok(Some(Price::from_f64(price).clamp_non_negative()))
    }

    /// Remaining room up to the long target
    fn calculate_buy_volume(&mut self, _state: &MarketState) -> i64 {
        (self.config.const_position_size - self.ledger.position()).max(0)
    }

    /// Remaining room down to the short target
    fn calculate_sell_volume(&mut self, _state: &MarketState) -> i64 {
        (self.config.const_position_size + self.ledger.position()).max(0)
    }

    fn calculate_profit_and_loss(&mut self, state: &MarketState) -> Result<f64> {
        let last = state.last_price()?;
        Ok(self.ledger.mark_to_market(last, state.slippage))
    }

    fn update(&mut self, state: &MarketState) -> Result<()> {
        self.latency = self.latency_model.sample(&mut self.rng);

        let trend = state.trend_ratio(self.config.short_window, self.config.long_window)?;
        let position = self.ledger.position();

        self.quotes.buy_price = None;
        self.quotes.sell_price = None;

        if trend >= 1.0 && position < self.config.const_position_size {
            self.quotes.buy_volume = self.calculate_buy_volume(state);
            self.quotes.buy_price = self.calculate_buy_price(state)?;
        } else if trend < 1.0 && position > -self.config.const_position_size {
            self.quotes.sell_volume = self.calculate_sell_volume(state);
            self.quotes.sell_price = self.calculate_sell_price(state)?;
        }
        // At or beyond the target in the trend's direction: no quote

        Ok(())
    }

    fn on_fill(&mut self, fill: &Fill) {
        self.ledger.record_fill(*fill);
    }

    fn buy_order(&self) -> Order {
        Order::from_quotes(&self.id, Side::Buy, &self.quotes, self.latency)
    }

    fn sell_order(&self) -> Order {
        Order::from_quotes(&self.id, Side::Sell, &self.quotes, self.latency)
    }

    fn clear_quotes(&mut self) {
        self.quotes.clear_prices();
    }

    fn position(&self) -> i64 {
        self.ledger.position()
    }

    fn pnl(&self) -> f64 {
        self.ledger.pnl()
    }

    fn latency(&self) -> f64 {
        self.latency
    }
}
