//! Fixed-point price representation
//!
//! Uses i64 with 8 implied decimal places (scale = 100_000_000), which keeps
//! simulation arithmetic exact while quote formulas run through f64 noise.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Scale factor: 8 decimal places
pub const PRICE_DECIMALS: u8 = 8;
pub const PRICE_SCALE: i64 = 100_000_000;

/// Fixed-point price with 8 decimal places
///
/// Internally stored as i64 where the value represents:
/// actual_price = raw_value / 100_000_000
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Price(i64);

impl Price {
    pub const ZERO: Price = Price(0);

    /// Create from raw scaled value
    #[inline(always)]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Create from integer (whole number)
    #[inline(always)]
    pub const fn from_int(value: i64) -> Self {
        Self(value * PRICE_SCALE)
    }

    /// Get the raw scaled value
    #[inline(always)]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Check if zero
    #[inline(always)]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Convert to f64 for noise and statistics formulas
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / PRICE_SCALE as f64
    }

    /// Create from f64, truncating beyond 8 decimal places
    #[inline]
    pub fn from_f64(value: f64) -> Self {
        Self((value * PRICE_SCALE as f64) as i64)
    }

    /// Clamp negative prices to zero
    ///
    /// Quote formulas may push a computed price below zero; a price is never
    /// negative, so the result floors at `Price::ZERO`.
    #[inline]
    pub fn clamp_non_negative(self) -> Self {
        Self(self.0.max(0))
    }
}

impl Add for Price {
    type Output = Price;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Price(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Price;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Price(self.0 - rhs.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.8}", self.to_f64())
    }
}
