//! Float statistics over price slices
//!
//! Moving averages and volatility recompute over a snapshot's own history
//! each step, so plain slice functions are enough here.

/// Arithmetic mean of a slice. `None` when the slice is empty.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation of a slice. `None` when the slice is empty.
///
/// Population (not sample) variance matches the volatility definition used by
/// the market-making spread formula.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let variance =
        values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}
