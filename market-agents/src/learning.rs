//! Learning trader
//!
//! Quotes like a noise trader inside a tight band (its exploration policy)
//! while collecting one labeled observation per step: market features, the
//! action that was in place, and the profit-and-loss change it realized.
//! Training is an explicit batch operation over the accumulated table, never
//! part of the per-step quote path.

use crate::agent::{Agent, AgentId, Fill};
use crate::error::Result;
use crate::latency::LatencyModel;
use crate::ledger::TradeLedger;
use crate::market_state::MarketState;
use crate::order::{Order, QuotePair};
use log::warn;
use market_core::{Price, Side};
use market_learning::{
    ExperienceRecord, ExperienceStore, N_FEATURES, Trainer, TrainerConfig, TrainingReport,
};
use ndarray::Array2;
use rand::prelude::*;

/// How `take_action` selects the step's quotes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotePolicy {
    /// Uniform price/volume sampling inside the band (data collection)
    Explore,
    /// Score a discretized action grid with the trained model, take the
    /// argmax. Falls back to exploration while no fitted model exists.
    Greedy,
}

/// Configuration for the learning trader
#[derive(Debug, Clone)]
pub struct LearningTraderConfig {
    /// Latency stays at this constant; the model is never resampled
    pub delta: f64,
    /// Short moving-average window for the feature vector
    pub short_window: usize,
    /// Long moving-average window for the feature vector
    pub long_window: usize,
    /// Volumes are drawn uniformly from `[0, max_volume]` per side
    pub max_volume: i64,
    /// Half-width of the exploration price band around the last price
    pub price_band: f64,
    /// Action selection mode
    pub policy: QuotePolicy,
    /// Training pipeline hyperparameters
    pub trainer: TrainerConfig,
    /// Random seed (for reproducibility)
    pub seed: Option<u64>,
}

impl Default for LearningTraderConfig {
    fn default() -> Self {
        Self {
            delta: 0.1,
            short_window: 50,
            long_window: 200,
            max_volume: 10,
            price_band: 0.01,
            policy: QuotePolicy::Explore,
            trainer: TrainerConfig::default(),
            seed: None,
        }
    }
}

/// Learning agent
pub struct LearningTrader {
    id: AgentId,
    config: LearningTraderConfig,
    latency_model: LatencyModel,
    ledger: TradeLedger,
    quotes: QuotePair,
    latency: f64,
    store: ExperienceStore,
    trainer: Trainer,
    rng: StdRng,
}

impl LearningTrader {
    pub fn new(id: impl Into<String>, config: LearningTraderConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            id: AgentId::new(id),
            latency_model: LatencyModel::Fixed {
                delta: config.delta,
            },
            latency: config.delta,
            trainer: Trainer::new(config.trainer.clone()),
            config,
            ledger: TradeLedger::new(),
            quotes: QuotePair::default(),
            store: ExperienceStore::new(),
            rng,
        }
    }

    /// Accumulated experience table
    pub fn experience(&self) -> &ExperienceStore {
        &self.store
    }

    /// Switch action selection mode
    pub fn set_policy(&mut self, policy: QuotePolicy) {
        self.config.policy = policy;
    }

    /// Fit the sequence model on everything collected so far.
    ///
    /// Fails with a data-insufficiency error before `n_timepoints`
    /// observations exist.
    pub fn train(&mut self) -> Result<TrainingReport> {
        Ok(self.trainer.fit(&self.store)?)
    }

    /// Derive the 4-element feature vector:
    /// short MA, long MA, their ratio, and the rounded aggregate quote spread.
    fn create_features(&self, state: &MarketState) -> Result<[f64; 4]> {
        let ma_short = state.moving_average(self.config.short_window)?;
        let ma_long = state.moving_average(self.config.long_window)?;
        let trend = state.trend_ratio(self.config.short_window, self.config.long_window)?;
        let quote_spread =
            ((state.mean_buy_price - state.mean_sell_price) * 10.0).round() / 10.0;
        Ok([ma_short, ma_long, trend, quote_spread])
    }

    /// Record this step's observation before the quotes are overwritten.
    ///
    /// The reward is the profit-and-loss change since the previous step, so
    /// the row pairs the features with the action that was in place when the
    /// reward accrued. Must run exactly once per step, ahead of
    /// `take_action`.
    fn store_observation(&mut self, state: &MarketState) -> Result<()> {
        let previous_pnl = self.ledger.pnl();
        let last = state.last_price()?;
        let pnl = self.ledger.mark_to_market(last, state.slippage);
        let reward = pnl - previous_pnl;

        let [ma_short, ma_long, trend, quote_spread] = self.create_features(state)?;

        self.store.push(ExperienceRecord {
            ma_short,
            ma_long,
            trend,
            quote_spread,
            market_price: last.to_f64(),
            position: self.ledger.position() as f64,
            buy_volume: self.quotes.buy_volume as f64,
            sell_volume: self.quotes.sell_volume as f64,
            // No quote out yet encodes as zero price with zero volume
            buy_price: self.quotes.buy_price.map(|p| p.to_f64()).unwrap_or(0.0),
            sell_price: self.quotes.sell_price.map(|p| p.to_f64()).unwrap_or(0.0),
            reward,
        });
        Ok(())
    }

    /// Choose this step's quotes according to the configured policy.
    fn take_action(&mut self, state: &MarketState) -> Result<()> {
        match self.config.policy {
            QuotePolicy::Explore => self.explore(state),
            QuotePolicy::Greedy => self.greedy(state),
        }
    }

    fn explore(&mut self, state: &MarketState) -> Result<()> {
        self.quotes.buy_volume = self.calculate_buy_volume(state);
        self.quotes.sell_volume = self.calculate_sell_volume(state);
        self.quotes.buy_price = self.calculate_buy_price(state)?;
        self.quotes.sell_price = self.calculate_sell_price(state)?;
        Ok(())
    }

    fn sample_band_price(&mut self, last: f64) -> Price {
        let lower = last * (1.0 - self.config.price_band);
        let upper = last * (1.0 + self.config.price_band);
        let price = if upper > lower {
            self.rng.gen_range(lower..upper)
        } else {
            last
        };
        Price::from_f64(price).clamp_non_negative()
    }

    fn greedy(&mut self, state: &MarketState) -> Result<()> {
        let n_timepoints = self.trainer.config().n_timepoints;
        if !self.trainer.is_fitted() || self.store.len() < n_timepoints {
            warn!(
                "agent {}: greedy policy requested without a fitted model, exploring instead",
                self.id
            );
            return self.explore(state);
        }

        let last = state.last_price()?.to_f64();

        // Raw feature window ending at the latest observation
        let (mut window, template) = {
            let records = self.store.records();
            let recent = &records[records.len() - n_timepoints..];
            let mut window = Array2::zeros((n_timepoints, N_FEATURES));
            for (i, record) in recent.iter().enumerate() {
                for (j, value) in record.features().iter().enumerate() {
                    window[[i, j]] = *value;
                }
            }
            (window, recent[n_timepoints - 1])
        };

        // Candidate grid: symmetric price offsets inside the band, a few
        // volume rungs, scored by substituting the action into the window's
        // final row.
        let offsets = [-self.config.price_band, 0.0, self.config.price_band];
        let volumes = [0, self.config.max_volume / 2, self.config.max_volume];
        let mut best: Option<(f64, f64, f64, i64)> = None;

        for &buy_offset in &offsets {
            for &sell_offset in &offsets {
                for &volume in &volumes {
                    let buy = (last * (1.0 + buy_offset)).max(0.0);
                    let sell = (last * (1.0 + sell_offset)).max(0.0);

                    let mut candidate = template;
                    candidate.buy_volume = volume as f64;
                    candidate.sell_volume = volume as f64;
                    candidate.buy_price = buy;
                    candidate.sell_price = sell;
                    for (j, value) in candidate.features().iter().enumerate() {
                        window[[n_timepoints - 1, j]] = *value;
                    }

                    let score = self.trainer.predict_window(&window)?;
                    if best.is_none_or(|(s, ..)| score > s) {
                        best = Some((score, buy, sell, volume));
                    }
                }
            }
        }

        if let Some((_, buy, sell, volume)) = best {
            self.quotes.buy_volume = volume;
            self.quotes.sell_volume = volume;
            self.quotes.buy_price = Some(Price::from_f64(buy).clamp_non_negative());
            self.quotes.sell_price = Some(Price::from_f64(sell).clamp_non_negative());
        }
        Ok(())
    }
}

impl Agent for LearningTrader {
    fn id(&self) -> &AgentId {
        &self.id
    }

    fn agent_type(&self) -> &'static str {
        "LearningTrader"
    }

    fn calculate_buy_price(&mut self, state: &MarketState) -> Result<Option<Price>> {
        let last = state.last_price()?.to_f64();
        Ok(Some(self.sample_band_price(last)))
    }

    fn calculate_sell_price(&mut self, state: &MarketState) -> Result<Option<Price>> {
        let last = state.last_price()?.to_f64();
        Ok(Some(self.sample_band_price(last)))
    }

    fn calculate_buy_volume(&mut self, _state: &MarketState) -> i64 {
        self.rng.gen_range(0..=self.config.max_volume)
    }

    fn calculate_sell_volume(&mut self, _state: &MarketState) -> i64 {
        self.rng.gen_range(0..=self.config.max_volume)
    }

    fn calculate_profit_and_loss(&mut self, state: &MarketState) -> Result<f64> {
        let last = state.last_price()?;
        Ok(self.ledger.mark_to_market(last, state.slippage))
    }

    fn update(&mut self, state: &MarketState) -> Result<()> {
        self.store_observation(state)?;
        self.take_action(state)?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use market_learning::LearningError;

    fn test_state(last: i64) -> MarketState {
        MarketState::new(
            vec![Price::from_int(100), Price::from_int(last)],
            0.0,
        )
        .with_quote_means(101.0, 100.6)
    }

    fn trader(seed: u64) -> LearningTrader {
        LearningTrader::new(
            "rl-1",
            LearningTraderConfig {
                seed: Some(seed),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_row_count_matches_update_count() {
        let mut trader = trader(42);
        let state = test_state(100);

        for i in 1..=25 {
            trader.update(&state).unwrap();
            assert_eq!(trader.experience().len(), i);
        }
    }

    #[test]
    fn test_reward_is_pnl_delta() {
        let mut trader = trader(42);
        trader.on_fill(&Fill {
            price: Price::from_int(100),
            signed_qty: 1,
        });

        // First step: pnl goes from 0 to 100 (realized) + 100 (marked)
        trader.update(&test_state(100)).unwrap();
        // Second step: the mark moves by 10
        trader.update(&test_state(110)).unwrap();

        let records = trader.experience().records();
        assert_relative_eq!(records[0].reward, 200.0, epsilon = 1e-9);
        assert_relative_eq!(records[1].reward, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_first_row_records_no_action() {
        let mut trader = trader(42);
        trader.update(&test_state(100)).unwrap();

        let first = trader.experience().records()[0];
        assert_eq!(first.buy_price, 0.0);
        assert_eq!(first.sell_price, 0.0);
        assert_eq!(first.buy_volume, 0.0);
        assert_eq!(first.sell_volume, 0.0);
    }

    #[test]
    fn test_second_row_records_prior_action() {
        let mut trader = trader(42);
        trader.update(&test_state(100)).unwrap();
        let quoted_buy = trader.buy_order().price.unwrap().to_f64();

        trader.update(&test_state(100)).unwrap();
        let second = trader.experience().records()[1];
        assert_relative_eq!(second.buy_price, quoted_buy, epsilon = 1e-9);
    }

    #[test]
    fn test_quote_spread_feature_is_rounded() {
        let mut trader = trader(42);
        trader.update(&test_state(100)).unwrap();

        // 101.0 - 100.6 = 0.4, rounded to one decimal
        let record = trader.experience().records()[0];
        assert_relative_eq!(record.quote_spread, 0.4, epsilon = 1e-9);
    }

    #[test]
    fn test_exploration_band_and_volumes() {
        let mut trader = trader(7);
        let state = test_state(100);

        for _ in 0..1000 {
            trader.update(&state).unwrap();
            let buy = trader.buy_order();
            let sell = trader.sell_order();
            assert!((0..=10).contains(&buy.volume));
            assert!((0..=10).contains(&sell.volume));
            let buy_price = buy.price.unwrap().to_f64();
            let sell_price = sell.price.unwrap().to_f64();
            assert!(buy_price >= 99.0 && buy_price <= 101.0);
            assert!(sell_price >= 99.0 && sell_price <= 101.0);
        }
    }

    #[test]
    fn test_train_requires_enough_rows() {
        let mut trader = trader(42);
        let state = test_state(100);
        for _ in 0..10 {
            trader.update(&state).unwrap();
        }

        let err = trader.train().unwrap_err();
        assert!(matches!(
            err,
            crate::error::AgentError::Learning(LearningError::InsufficientData {
                needed: 16,
                available: 10
            })
        ));
    }

    #[test]
    fn test_train_after_enough_rows() {
        let mut trader = trader(42);
        for i in 0..40 {
            trader.update(&test_state(100 + (i % 7))).unwrap();
        }

        let report = trader.train().unwrap();
        assert_eq!(report.rows, 40);
        assert_eq!(report.windows, 25);
        assert!(report.final_loss.is_finite());
    }

    #[test]
    fn test_greedy_without_model_falls_back_to_explore() {
        let mut trader = LearningTrader::new(
            "rl-2",
            LearningTraderConfig {
                policy: QuotePolicy::Greedy,
                seed: Some(42),
                ..Default::default()
            },
        );

        trader.update(&test_state(100)).unwrap();
        assert!(trader.buy_order().price.is_some());
        assert!(trader.sell_order().price.is_some());
    }

    #[test]
    fn test_greedy_with_model_quotes_from_grid() {
        let mut trader = trader(42);
        for i in 0..40 {
            trader.update(&test_state(100 + (i % 7))).unwrap();
        }
        trader.train().unwrap();
        trader.set_policy(QuotePolicy::Greedy);

        trader.update(&test_state(100)).unwrap();
        let buy = trader.buy_order();
        let sell = trader.sell_order();
        assert!(buy.price.is_some());
        assert!(sell.price.is_some());
        // Grid prices stay inside the band
        let buy_price = buy.price.unwrap().to_f64();
        assert!(buy_price >= 99.0 && buy_price <= 101.0);
        // Grid volumes are one of the rungs
        assert!([0, 5, 10].contains(&buy.volume));
        assert_eq!(buy.volume, sell.volume);
    }

    #[test]
    fn test_latency_stays_fixed() {
        let mut trader = trader(42);
        let state = test_state(100);
        for _ in 0..100 {
            trader.update(&state).unwrap();
            assert_eq!(trader.latency(), 0.1);
        }
    }
}
