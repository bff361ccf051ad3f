// Momentum - Price return scaled by volume surge
// momentum = return * ln(1 + volume_factor)

use serde::{Deserialize, Serialize};

use crate::core::types::MomentumLevel;
use crate::window::{SlidingWindow, WindowStats};

/// Classified momentum with its inputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MomentumSignal {
    pub level: MomentumLevel,
    pub value: f64,         // raw momentum
    pub ret: f64,           // window price return
    pub volume_factor: f64,
}

impl MomentumSignal {
    fn new(ret: f64, volume_factor: f64, weak: f64, strong: f64) -> Self {
        let value = ret * volume_factor.ln_1p();
        Self {
            level: MomentumLevel::classify(value, weak, strong),
            value,
            ret,
            volume_factor,
        }
    }
}

impl WindowStats {
    /// Momentum from the captured return and volume factor, no second lock
    pub fn momentum(&self) -> Option<f64> {
        let ret = self.structural_return()?;
        let vf = self.volume_factor?;
        Some(ret * vf.ln_1p())
    }
}

impl SlidingWindow {
    /// Needs two trades, a positive oldest price and an initialized positive EMA baseline
    pub fn momentum(&self) -> Option<f64> {
        let (ret, vf) = self.momentum_inputs()?;
        Some(ret * vf.ln_1p())
    }

    /// Bucket momentum (EMA-relative volume factor) into five levels
    pub fn classify_momentum(&self, weak: f64, strong: f64) -> Option<MomentumSignal> {
        let (ret, vf) = self.momentum_inputs()?;
        Some(MomentumSignal::new(ret, vf, weak, strong))
    }

    /// Like [`classify_momentum`](Self::classify_momentum) but with
    /// `volume_factor = window volume / baseline_volume` for a caller-supplied baseline
    pub fn classify_momentum_against(
        &self,
        baseline_volume: f64,
        weak: f64,
        strong: f64,
    ) -> Option<MomentumSignal> {
        if baseline_volume <= 0.0 {
            return None;
        }

        let state = self.state.read();
        if state.size < 2 {
            return None;
        }
        let ret = state.structural_return(self.price_scale())?;
        let total = self.volume_from_ticks(state.total_volume);
        drop(state);

        let vf = (total / baseline_volume).max(0.0);
        Some(MomentumSignal::new(ret, vf, weak, strong))
    }

    // Return and volume factor read in one critical section
    fn momentum_inputs(&self) -> Option<(f64, f64)> {
        let state = self.state.read();
        if state.size < 2 {
            return None;
        }
        let vf = state.volume_factor()?;
        let ret = state.structural_return(self.price_scale())?;
        Some((ret, vf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Side;

    fn rising_window() -> SlidingWindow {
        // alpha = 1: baseline equals the last positive volume
        let window = SlidingWindow::new(60_000, 16, 1.0);
        window.add_trade(Side::Buy, 100.0, 1.0, 0);
        window.add_trade(Side::Buy, 101.0, 1.0, 1_000);
        window
    }

    #[test]
    fn test_momentum_value() {
        let window = rising_window();
        // ret = 0.01, vf = 1
        let expected = 0.01 * 2.0_f64.ln();
        assert!((window.momentum().unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_momentum_needs_two_points() {
        let window = SlidingWindow::new(60_000, 16, 0.5);
        window.add_trade(Side::Buy, 100.0, 1.0, 0);
        assert_eq!(window.momentum(), None);
        assert_eq!(window.classify_momentum(0.001, 0.005), None);
    }

    #[test]
    fn test_momentum_needs_ema_baseline() {
        let window = SlidingWindow::new(60_000, 16, 0.5);
        window.add_trade(Side::Buy, 100.0, 0.0, 0);
        window.add_trade(Side::Buy, 101.0, 0.0, 1);
        assert_eq!(window.momentum(), None);
    }

    #[test]
    fn test_momentum_needs_positive_oldest_price() {
        let window = SlidingWindow::new(60_000, 16, 0.5);
        window.add_trade(Side::Buy, 0.0, 1.0, 0);
        window.add_trade(Side::Buy, 101.0, 1.0, 1);
        assert_eq!(window.momentum(), None);
    }

    #[test]
    fn test_captured_stats_momentum() {
        let window = rising_window();
        let (stats, _prices) = window.capture();
        assert_eq!(stats.momentum(), window.momentum());

        let thin = SlidingWindow::new(60_000, 16, 1.0);
        thin.add_trade(Side::Buy, 100.0, 1.0, 0);
        let (stats, _prices) = thin.capture();
        assert_eq!(stats.momentum(), None);
    }

    #[test]
    fn test_classify_levels() {
        let window = rising_window();
        let value = 0.01 * 2.0_f64.ln(); // ~0.00693

        let strong = window.classify_momentum(0.001, 0.005).unwrap();
        assert_eq!(strong.level, MomentumLevel::StrongUp);
        assert!((strong.value - value).abs() < 1e-12);
        assert!((strong.volume_factor - 1.0).abs() < 1e-12);

        let up = window.classify_momentum(0.001, 0.01).unwrap();
        assert_eq!(up.level, MomentumLevel::Up);

        let neutral = window.classify_momentum(0.01, 0.02).unwrap();
        assert_eq!(neutral.level, MomentumLevel::Neutral);
    }

    #[test]
    fn test_classify_falling() {
        let window = SlidingWindow::new(60_000, 16, 1.0);
        window.add_trade(Side::Sell, 100.0, 1.0, 0);
        window.add_trade(Side::Sell, 95.0, 1.0, 1);
        let signal = window.classify_momentum(0.001, 0.005).unwrap();
        assert_eq!(signal.level, MomentumLevel::StrongDown);
        assert!(signal.ret < 0.0);
    }

    #[test]
    fn test_classify_against_baseline() {
        let window = rising_window();
        assert_eq!(window.classify_momentum_against(0.0, 0.001, 0.005), None);

        // total volume 2 against baseline 2 => vf = 1
        let signal = window.classify_momentum_against(2.0, 0.001, 0.005).unwrap();
        assert!((signal.volume_factor - 1.0).abs() < 1e-12);
        assert_eq!(signal.level, MomentumLevel::StrongUp);
    }
}
