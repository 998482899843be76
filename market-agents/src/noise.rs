//! Noise trader
//!
//! Quotes both sides every step around a privately noised reference price.
//! Provides baseline volume and counterparties; no directional view.

use crate::agent::{Agent, AgentId, Fill};
use crate::error::Result;
use crate::latency::LatencyModel;
use crate::ledger::TradeLedger;
use crate::market_state::MarketState;
use crate::order::{Order, QuotePair};
use market_core::{Price, Side};
use rand::prelude::*;
use rand_distr::StandardNormal;

/// Configuration for the noise trader
#[derive(Debug, Clone)]
pub struct NoiseTraderConfig {
    /// Base latency before the stochastic component
    pub delta: f64,
    /// One-sided relative quote noise, drawn per side per step
    pub noise_range: (f64, f64),
    /// Std deviation of the additive reference-price noise
    pub reference_sigma: f64,
    /// Volumes are drawn uniformly from `[0, max_volume)` per side
    pub max_volume: i64,
    /// Random seed (for reproducibility)
    pub seed: Option<u64>,
}

impl Default for NoiseTraderConfig {
    fn default() -> Self {
        Self {
            delta: 0.1,
            noise_range: (0.01, 0.03),
            reference_sigma: 2.0,
            max_volume: 3,
            seed: None,
        }
    }
}

/// Noise trader agent
pub struct NoiseTrader {
    id: AgentId,
    config: NoiseTraderConfig,
    latency_model: LatencyModel,
    ledger: TradeLedger,
    quotes: QuotePair,
    latency: f64,
    /// This step's noised anchor, kept private to the agent
    reference_price: Option<f64>,
    rng: StdRng,
}

impl NoiseTrader {
    pub fn new(id: impl Into<String>, config: NoiseTraderConfig) -> Self {
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
            reference_price: None,
            rng,
        }
    }
}

impl Agent for NoiseTrader {
    fn id(&self) -> &AgentId {
        &self.id
    }

    fn agent_type(&self) -> &'static str {
        "NoiseTrader"
    }

    fn calculate_buy_price(&mut self, _state: &MarketState) -> Result<Option<Price>> {
        let Some(reference) = self.reference_price else {
            return Ok(None);
        };
        let (low, high) = self.config.noise_range;
        let discount = self.rng.gen_range(low..high);
        let price = Price::from_f64(reference * (1.0 - discount));
        Ok(Some(price.clamp_non_negative()))
    }

    fn calculate_sell_price(&mut self, _state: &MarketState) -> Result<Option<Price>> {
        let Some(reference) = self.reference_price else {
            return Ok(None);
        };
        let (low, high) = self.config.noise_range;
        let markup = self.rng.gen_range(low..high);
        let price = Price::from_f64(reference * (1.0 + markup));
        Ok(Some(price.clamp_non_negative()))
    }

    fn calculate_buy_volume(&mut self, _state: &MarketState) -> i64 {
        self.rng.gen_range(0..self.config.max_volume)
    }

    fn calculate_sell_volume(&mut self, _state: &MarketState) -> i64 {
        self.rng.gen_range(0..self.config.max_volume)
    }

    fn calculate_profit_and_loss(&mut self, state: &MarketState) -> Result<f64> {
        let last = state.last_price()?;
        Ok(self.ledger.mark_to_market(last, state.slippage))
    }

    fn update(&mut self, state: &MarketState) -> Result<()> {
        self.latency = self.latency_model.sample(&mut self.rng);

        let last = state.last_price()?.to_f64();
        let noise: f64 = self.rng.sample(StandardNormal);
        self.reference_price = Some(last + self.config.reference_sigma * noise);

        self.quotes.buy_price = self.calculate_buy_price(state)?;
        self.quotes.sell_price = self.calculate_sell_price(state)?;
        self.quotes.buy_volume = self.calculate_buy_volume(state);
        self.quotes.sell_volume = self.calculate_sell_volume(state);
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
