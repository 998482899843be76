//! Agent contract
//!
//! The shared interface every behavioral model implements, plus the per-step
//! driver that isolates one agent's failure from the rest of the loop.

use crate::error::Result;
use crate::market_state::MarketState;
use crate::order::Order;
use log::warn;
use market_core::Price;
use serde::{Deserialize, Serialize};

/// Unique identifier for an agent
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An executed trade appended to an agent's ledger by the matching engine
///
/// `signed_qty` is positive when the agent bought, negative when it sold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub price: Price,
    pub signed_qty: i64,
}

/// Core trait for all trading agents
///
/// `update` advances the agent by exactly one step: it resamples latency,
/// recomputes quotes and replaces the order pair. Calling it twice for the
/// same snapshot would double-draw randomness and corrupt multi-step chunk
/// counters, so the orchestrator must invoke it once per step.
pub trait Agent: Send {
    /// Agent's unique identifier
    fn id(&self) -> &AgentId;

    /// Agent class name (for logging/metrics)
    fn agent_type(&self) -> &'static str;

    /// Price this agent would buy at, `None` when it declines the side.
    /// Negative computed prices clamp to zero.
    fn calculate_buy_price(&mut self, state: &MarketState) -> Result<Option<Price>>;

    /// Price this agent would sell at, `None` when it declines the side.
    fn calculate_sell_price(&mut self, state: &MarketState) -> Result<Option<Price>>;

    /// Nonnegative buy volume; may depend on the current position.
    fn calculate_buy_volume(&mut self, state: &MarketState) -> i64;

    /// Nonnegative sell volume; may depend on the current position.
    fn calculate_sell_volume(&mut self, state: &MarketState) -> i64;

    /// Recompute realized + unrealized value from the fill history and the
    /// latest market price.
    fn calculate_profit_and_loss(&mut self, state: &MarketState) -> Result<f64>;

    /// Advance one step: resample latency, refresh quotes, replace orders.
    fn update(&mut self, state: &MarketState) -> Result<()>;

    /// Trade feedback from the matching engine.
    fn on_fill(&mut self, fill: &Fill);

    /// Current buy-side order (rebuilt from the live quote state)
    fn buy_order(&self) -> Order;

    /// Current sell-side order (rebuilt from the live quote state)
    fn sell_order(&self) -> Order;

    /// Withdraw both sides for this step
    fn clear_quotes(&mut self);

    /// Current inventory
    fn position(&self) -> i64;

    /// Last computed profit and loss
    fn pnl(&self) -> f64;

    /// Latency sampled for the current step
    fn latency(&self) -> f64;
}

/// Step every agent against the same snapshot.
///
/// A failing agent is logged and withdraws its quotes for the step; the loop
/// always continues over the remaining agents.
pub fn update_all(agents: &mut [Box<dyn Agent>], state: &MarketState) {
    for agent in agents.iter_mut() {
        if let Err(err) = agent.update(state) {
            warn!(
                "agent {} ({}) failed to update, withdrawing quotes: {}",
                agent.id(),
                agent.agent_type(),
                err
            );
            agent.clear_quotes();
        }
    }
}
