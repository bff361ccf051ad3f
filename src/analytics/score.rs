// Directional Score - Window trend blended with external momentum, weighted by order-flow confidence
// Caller misuse is an error; everything else in analytics reports insufficiency as None

use thiserror::Error;

use crate::window::SlidingWindow;

const MIN_SCALE: f64 = 1e-6;
const TREND_EPSILON: f64 = 1e-8;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    #[error("Invalid normalization scale: dir_scale={dir_scale}, momentum_scale={momentum_scale}")]
    InvalidScale { dir_scale: f64, momentum_scale: f64 },
    #[error("Insufficient points for score: have {have}, need 2")]
    InsufficientPoints { have: usize },
}

impl SlidingWindow {
    /// Score in [-1, 1].
    ///
    /// `dir_scale` maps the window return to ±1 (0.05 => a 5% move saturates),
    /// `momentum_scale` does the same for `current_momentum`. The trend sign is kept;
    /// `order_flow_confidence` in [-1, 1] scales it down when flow disagrees.
    pub fn score_with_momentum(
        &self,
        current_momentum: f64,
        dir_scale: f64,
        momentum_scale: f64,
        order_flow_confidence: f64,
    ) -> Result<f64, ScoreError> {
        if !(dir_scale > MIN_SCALE && momentum_scale > MIN_SCALE) {
            return Err(ScoreError::InvalidScale { dir_scale, momentum_scale });
        }

        let state = self.state.read();
        if state.size < 2 {
            return Err(ScoreError::InsufficientPoints { have: state.size });
        }
        // Zero oldest price: no direction
        let ret = state.structural_return(self.price_scale()).unwrap_or(0.0);
        drop(state);

        let dir = (ret / dir_scale).clamp(-1.0, 1.0);
        let mom = (current_momentum / momentum_scale).clamp(-1.0, 1.0);
        let trend = 0.5 * dir + 0.5 * mom;
        if trend.abs() < TREND_EPSILON {
            return Ok(0.0);
        }

        let sign = trend.signum();
        let confidence = order_flow_confidence.clamp(-1.0, 1.0);
        let weight = ((1.0 + sign * confidence) / 2.0).clamp(0.0, 1.0);

        Ok(sign * trend.abs() * weight)
    }

    /// Score using the configured scales and this window's own momentum (0 when unavailable)
    pub fn score(&self, order_flow_confidence: f64) -> Result<f64, ScoreError> {
        let momentum = self.momentum().unwrap_or(0.0);
        self.score_with_momentum(
            momentum,
            self.signals.dir_scale,
            self.signals.momentum_scale,
            order_flow_confidence,
        )
    }
}
