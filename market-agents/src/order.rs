//! Per-step order records
//!
//! Each agent emits one buy and one sell order per step; the pair fully
//! replaces the previous step's pair. A declined side carries an explicit
//! `None` price - never a zero sentinel - and the matching engine must treat
//! such an order as non-actionable even though a volume is still attached.

use crate::agent::AgentId;
use market_core::{Price, Side};
use serde::{Deserialize, Serialize};

/// An agent's current quote state for both sides
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuotePair {
    pub buy_price: Option<Price>,
    pub sell_price: Option<Price>,
    pub buy_volume: i64,
    pub sell_volume: i64,
}

impl QuotePair {
    /// Withdraw both sides. Volumes are left in place; the absent prices
    /// already make the orders non-actionable.
    pub fn clear_prices(&mut self) {
        self.buy_price = None;
        self.sell_price = None;
    }
}

/// One side of an agent's quote intention for the current step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub agent_id: AgentId,
    pub side: Side,
    /// `None` when the agent declines to quote this side this step
    pub price: Option<Price>,
    pub volume: i64,
    /// Queue-priority signal for the matching engine
    pub latency: f64,
}

impl Order {
    /// Build the order for `side` from an agent's current quote state.
    pub fn from_quotes(agent_id: &AgentId, side: Side, quotes: &QuotePair, latency: f64) -> Self {
        let (price, volume) = match side {
            Side::Buy => (quotes.buy_price, quotes.buy_volume),
            Side::Sell => (quotes.sell_price, quotes.sell_volume),
        };
        Self {
            agent_id: agent_id.clone(),
            side,
            price,
            volume,
            latency,
        }
    }

    /// Whether the matching engine should consider this order at all.
    pub fn is_actionable(&self) -> bool {
        self.price.is_some() && self.volume > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_price_is_not_actionable() {
        let quotes = QuotePair {
            buy_price: None,
            sell_price: Some(Price::from_int(100)),
            buy_volume: 20,
            sell_volume: 20,
        };
        let id = AgentId::new("inv-1");

        let buy = Order::from_quotes(&id, Side::Buy, &quotes, 0.3);
        let sell = Order::from_quotes(&id, Side::Sell, &quotes, 0.3);

        // Volume alone never makes an order actionable
        assert_eq!(buy.volume, 20);
        assert!(!buy.is_actionable());
        assert!(sell.is_actionable());
    }

    #[test]
    fn test_zero_price_is_distinct_from_absent() {
        let quotes = QuotePair {
            buy_price: Some(Price::ZERO),
            sell_price: None,
            buy_volume: 1,
            sell_volume: 1,
        };
        let id = AgentId::new("n-1");

        let buy = Order::from_quotes(&id, Side::Buy, &quotes, 0.1);
        assert!(buy.is_actionable());
        assert_eq!(buy.price, Some(Price::ZERO));
    }

    #[test]
    fn test_zero_volume_is_not_actionable() {
        let quotes = QuotePair {
            buy_price: Some(Price::from_int(10)),
            sell_price: None,
            buy_volume: 0,
            sell_volume: 0,
        };
        let order = Order::from_quotes(&AgentId::new("t-1"), Side::Buy, &quotes, 0.1);
        assert!(!order.is_actionable());
    }

    #[test]
    fn test_clear_prices_withdraws_both_sides() {
        let mut quotes = QuotePair {
            buy_price: Some(Price::from_int(99)),
            sell_price: Some(Price::from_int(101)),
            buy_volume: 3,
            sell_volume: 3,
        };
        quotes.clear_prices();
        assert_eq!(quotes.buy_price, None);
        assert_eq!(quotes.sell_price, None);
        assert_eq!(quotes.buy_volume, 3);
    }
}
