//! Append-only experience table
//!
//! One row per simulation step: the four derived market features, the raw
//! market context, the action the agent had in place, and the reward realized
//! by that step. The table only ever grows within a run; callers that need to
//! bound memory export a checkpoint and rebuild.

use crate::error::Result;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Total number of columns in the experience table
pub const N_COLUMNS: usize = 11;

/// Number of feature columns (everything except the reward label)
pub const N_FEATURES: usize = 10;

/// A single labeled observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExperienceRecord {
    /// Short-window moving average of market price
    pub ma_short: f64,
    /// Long-window moving average of market price
    pub ma_long: f64,
    /// Trend ratio (short MA / long MA)
    pub trend: f64,
    /// Mean buy quote minus mean sell quote across agents, rounded to 0.1
    pub quote_spread: f64,
    /// Last market price
    pub market_price: f64,
    /// Inventory held when the observation was taken
    pub position: f64,
    /// Buy volume quoted on the prior step
    pub buy_volume: f64,
    /// Sell volume quoted on the prior step
    pub sell_volume: f64,
    /// Buy price quoted on the prior step (0 when no quote was out)
    pub buy_price: f64,
    /// Sell price quoted on the prior step (0 when no quote was out)
    pub sell_price: f64,
    /// Step-over-step profit-and-loss change
    pub reward: f64,
}

impl ExperienceRecord {
    /// Feature vector: every column except the reward label
    pub fn features(&self) -> [f64; N_FEATURES] {
        [
            self.ma_short,
            self.ma_long,
            self.trend,
            self.quote_spread,
            self.market_price,
            self.position,
            self.buy_volume,
            self.sell_volume,
            self.buy_price,
            self.sell_price,
        ]
    }
}

/// Append-only store of experience records
#[derive(Debug, Clone, Default)]
pub struct ExperienceStore {
    records: Vec<ExperienceRecord>,
}

impl ExperienceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one observation. Records are never mutated or removed.
    pub fn push(&mut self, record: ExperienceRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ExperienceRecord] {
        &self.records
    }

    /// Reward column in insertion order
    pub fn rewards(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.reward).collect()
    }

    /// Feature table as a dense `len x N_FEATURES` matrix
    pub fn feature_matrix(&self) -> Array2<f64> {
        let mut matrix = Array2::zeros((self.records.len(), N_FEATURES));
        for (i, record) in self.records.iter().enumerate() {
            for (j, value) in record.features().iter().enumerate() {
                matrix[[i, j]] = *value;
            }
        }
        matrix
    }

    /// Write the full table as JSON for offline inspection or retraining
    pub fn export_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, &self.records)?;
        Ok(())
    }
}
