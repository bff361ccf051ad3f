// EMA Baseline - Exponentially smoothed per-trade volume
// Reference level for volume-surge detection; seeded by the first observation

use crate::core::config::DEFAULT_EMA_ALPHA;
use serde::{Deserialize, Serialize};

/// Exponential moving average. Not window-scoped: evictions never roll it back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ema {
    value: f64,
    alpha: f64,
    initialized: bool,
}

impl Ema {
    /// `alpha` in (0, 1]; larger tracks new data faster. Typical range 0.01..0.2.
    pub fn new(alpha: f64) -> Self {
        let alpha = if alpha <= 0.0 || alpha.is_nan() { DEFAULT_EMA_ALPHA } else { alpha.min(1.0) };
        Self { value: 0.0, alpha, initialized: false }
    }

    /// Fold in one observation and return the updated average
    pub fn update(&mut self, x: f64) -> f64 {
        if !self.initialized {
            self.value = x;
            self.initialized = true;
        } else {
            self.value = self.alpha * x + (1.0 - self.alpha) * self.value;
        }
        self.value
    }

    pub fn get(&self) -> Option<f64> {
        self.initialized.then_some(self.value)
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_observation_seeds() {
        let mut ema = Ema::new(0.1);
        assert_eq!(ema.get(), None);
        assert_eq!(ema.update(10.0), 10.0);
        assert_eq!(ema.get(), Some(10.0));
    }

    #[test]
    fn test_smoothing() {
        let mut ema = Ema::new(0.5);
        ema.update(10.0);
        assert!((ema.update(20.0) - 15.0).abs() < 1e-12);
        assert!((ema.update(15.0) - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_alpha_clamping() {
        assert_eq!(Ema::new(0.0).alpha(), DEFAULT_EMA_ALPHA);
        assert_eq!(Ema::new(-3.0).alpha(), DEFAULT_EMA_ALPHA);
        assert_eq!(Ema::new(2.0).alpha(), 1.0);

        let mut tracking = Ema::new(1.0);
        tracking.update(3.0);
        assert_eq!(tracking.update(7.0), 7.0);
    }
}
