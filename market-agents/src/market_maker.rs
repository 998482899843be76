//! Inventory-based market maker
//!
//! Quotes both sides around a private mid price re-derived every step:
//! the mid leans away from the market price proportionally to inventory
//! (long book -> lower mid, encouraging sells), and the half-spread scales
//! with recent price volatility.

use crate::agent::{Agent, AgentId, Fill};
use crate::error::Result;
use crate::latency::LatencyModel;
use crate::ledger::TradeLedger;
use crate::market_state::MarketState;
use crate::order::{Order, QuotePair};
use market_core::{Price, Side};
use rand::prelude::*;
use rand_distr::StandardNormal;

/// Configuration for the market maker
#[derive(Debug, Clone)]
pub struct MarketMakerConfig {
    /// Base latency; the sampled latency is always below this
    pub delta: f64,
    /// Mid-price sensitivity to position size
    pub gamma: f64,
    /// Spread sensitivity to local volatility
    pub gamma2: f64,
    /// Volatility lookback in observations
    pub n_observations: usize,
    /// Fixed volume quoted per side every step
    pub quote_volume: i64,
    /// Std deviation of the additive quote noise
    pub noise_sigma: f64,
    /// Random seed (for reproducibility)
    pub seed: Option<u64>,
}

impl Default for MarketMakerConfig {
    fn default() -> Self {
        Self {
            delta: 0.1,
            gamma: 0.01,
            gamma2: 1.0,
            n_observations: 10,
            quote_volume: 3,
            noise_sigma: 0.01,
            seed: None,
        }
    }
}

/// Market-making agent
pub struct MarketMaker {
    id: AgentId,
    config: MarketMakerConfig,
    latency_model: LatencyModel,
    ledger: TradeLedger,
    quotes: QuotePair,
    latency: f64,
    /// This step's inventory-skewed mid, re-derived each update
    mid_price: Option<f64>,
    /// This step's volatility-scaled bid-ask spread
    spread: Option<f64>,
    rng: StdRng,
}

impl MarketMaker {
    pub fn new(id: impl Into<String>, config: MarketMakerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            id: AgentId::new(id),
            latency_model: LatencyModel::Inverse {
                delta: config.delta,
            },
            latency: config.delta,
            config,
            ledger: TradeLedger::new(),
            quotes: QuotePair::default(),
            mid_price: None,
            spread: None,
            rng,
        }
    }

    fn calculate_mid_price(&self, state: &MarketState) -> Result<f64> {
        let last = state.last_price()?.to_f64();
        let leaning = self.config.gamma * self.ledger.position() as f64;
        Ok(last * (1.0 - leaning))
    }

    fn calculate_spread(&self, state: &MarketState) -> Result<f64> {
        let volatility = state.volatility(self.config.n_observations)?;
        Ok(volatility * self.config.gamma2)
    }
}

impl Agent for MarketMaker {
    fn id(&self) -> &AgentId {
        &self.id
    }

    fn agent_type(&self) -> &'static str {
        "MarketMaker"
    }

    fn calculate_buy_price(&mut self, _state: &MarketState) -> Result<Option<Price>> {
        let (Some(mid), Some(spread)) = (self.mid_price, self.spread) else {
            return Ok(None);
        };
        let noise: f64 = self.rng.sample(StandardNormal);
        let price = mid - spread / 2.0 + self.config.noise_sigma * noise;
        Ok(Some(Price::from_f64(price).clamp_non_negative()))
    }

    fn calculate_sell_price(&mut self, _state: &MarketState) -> Result<Option<Price>> {
        let (Some(mid), Some(spread)) = (self.mid_price, self.spread) else {
            return Ok(None);
        };
        let noise: f64 = self.rng.sample(StandardNormal);
        let price = mid + spread / 2.0 + self.config.noise_sigma * noise;
        Ok(Some(Price::from_f64(price).clamp_non_negative()))
    }

    fn calculate_buy_volume(&mut self, _state: &MarketState) -> i64 {
        self.config.quote_volume
    }

    fn calculate_sell_volume(&mut self, _state: &MarketState) -> i64 {
        self.config.quote_volume
    }

    fn calculate_profit_and_loss(&mut self, state: &MarketState) -> Result<f64> {
        let last = state.last_price()?;
        Ok(self.ledger.mark_to_market(last, state.slippage))
    }

    fn update(&mut self, state: &MarketState) -> Result<()> {
        self.latency = self.latency_model.sample(&mut self.rng);

        self.mid_price = Some(self.calculate_mid_price(state)?);
        self.spread = Some(self.calculate_spread(state)?);

        self.quotes.buy_volume = self.calculate_buy_volume(state);
        self.quotes.sell_volume = self.calculate_sell_volume(state);
        self.quotes.buy_price = self.calculate_buy_price(state)?;
        self.quotes.sell_price = self.calculate_sell_price(state)?;
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
