//! Heterogeneous trading agents
//!
//! Each simulation step the orchestrator hands every agent the same immutable
//! [`MarketState`] snapshot via [`Agent::update`]; agents mutate only their
//! own latency, quotes and order state, and the matching engine reads the
//! resulting per-side [`Order`] pair. Five behavioral models implement the
//! shared [`Agent`] contract; the learning variant additionally accumulates
//! an experience table and can fit a sequence model to discounted rewards.

pub mod agent;
pub mod error;
pub mod investor;
pub mod latency;
pub mod learning;
pub mod ledger;
pub mod market_maker;
pub mod market_state;
pub mod noise;
pub mod order;
pub mod trend;

pub use agent::{Agent, AgentId, Fill, update_all};
pub use error::{AgentError, Result};
pub use investor::{Investor, InvestorConfig};
pub use latency::LatencyModel;
pub use learning::{LearningTrader, LearningTraderConfig, QuotePolicy};
pub use ledger::TradeLedger;
pub use market_maker::{MarketMaker, MarketMakerConfig};
pub use market_state::MarketState;
pub use noise::{NoiseTrader, NoiseTraderConfig};
pub use order::{Order, QuotePair};
pub use trend::{TrendFollower, TrendFollowerConfig};
