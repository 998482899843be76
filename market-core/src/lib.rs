//! Shared kernel for the market simulation
//!
//! Value objects (fixed-point prices, order sides) and the float statistics
//! helpers used by moving-average and volatility computations.

pub mod stats;
pub mod value_objects;

pub use value_objects::{PRICE_DECIMALS, PRICE_SCALE, Price, Side};
