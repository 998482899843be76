//! Latency models
//!
//! Each agent class carries a simulated delay, resampled per step and
//! attached to its orders. The value is only an execution-ordering priority
//! signal for the external matching engine; nothing in this crate sleeps.

use rand::Rng;

/// Lower bound of the uniform draws, kept strictly above zero
pub const LATENCY_EPS: f64 = 1e-6;

/// Per-agent-class latency formula
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LatencyModel {
    /// `delta + U(eps, 1)` - the baseline participant
    Additive { delta: f64 },
    /// `delta + U(1 + eps, 2)` - a slower participant working large orders
    Lagged { delta: f64 },
    /// `delta / (1 + U(eps, 1))` - a fast participant, always below base
    Inverse { delta: f64 },
    /// Constant `delta`, never resampled
    Fixed { delta: f64 },
}

impl LatencyModel {
    /// Draw this step's latency. `Fixed` consumes no randomness.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        match *self {
            LatencyModel::Additive { delta } => delta + rng.gen_range(LATENCY_EPS..1.0),
            LatencyModel::Lagged { delta } => delta + rng.gen_range(1.0 + LATENCY_EPS..2.0),
            LatencyModel::Inverse { delta } => delta / (1.0 + rng.gen_range(LATENCY_EPS..1.0)),
            LatencyModel::Fixed { delta } => delta,
        }
    }

    /// Base delay before the stochastic component
    pub fn delta(&self) -> f64 {
        match *self {
            LatencyModel::Additive { delta }
            | LatencyModel::Lagged { delta }
            | LatencyModel::Inverse { delta }
            | LatencyModel::Fixed { delta } => delta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_additive_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let model = LatencyModel::Additive { delta: 0.5 };
        for _ in 0..1000 {
            let latency = model.sample(&mut rng);
            assert!(latency > 0.5 && latency < 1.5);
        }
    }

    #[test]
    fn test_lagged_is_slower_than_additive() {
        let mut rng = StdRng::seed_from_u64(7);
        let model = LatencyModel::Lagged { delta: 0.5 };
        for _ in 0..1000 {
            let latency = model.sample(&mut rng);
            assert!(latency > 1.5 && latency < 2.5);
        }
    }

    #[test]
    fn test_inverse_is_faster_than_base() {
        let mut rng = StdRng::seed_from_u64(7);
        let model = LatencyModel::Inverse { delta: 0.5 };
        for _ in 0..1000 {
            let latency = model.sample(&mut rng);
            assert!(latency < 0.5 && latency > 0.25);
        }
    }

    #[test]
    fn test_fixed_never_varies() {
        let mut rng = StdRng::seed_from_u64(7);
        let model = LatencyModel::Fixed { delta: 0.25 };
        for _ in 0..10 {
            assert_eq!(model.sample(&mut rng), 0.25);
        }
    }
}
