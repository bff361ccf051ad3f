// Absorption / Distribution - Skew of traded volume against a sideways price
// Heavy volume with VWAP above the median and little net movement reads as absorption

use serde::{Deserialize, Serialize};

use crate::core::types::AdKind;
use crate::window::SlidingWindow;

use super::price::median_in_place;

const MIN_MEDIAN_MAGNITUDE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbsorptionSignal {
    pub kind: AdKind,
    pub strong: bool, // |score| crossed the strong threshold
    pub score: f64,   // > 0 absorption, < 0 distribution
    pub ret: f64,
    pub volume_factor: f64,
    pub vwap: f64,
    pub median: f64,
    pub vwap_minus_median: f64,
}

impl SlidingWindow {
    /// Gates: `|return| <= max_abs_ret` and `volume_factor >= min_vf`.
    /// `weak` makes a non-neutral classification, `strong` flags high confidence.
    pub fn absorption_distribution(
        &self,
        min_vf: f64,
        max_abs_ret: f64,
        weak: f64,
        strong: f64,
    ) -> Option<AbsorptionSignal> {
        let (stats, mut prices) = self.capture();
        if stats.points < 2 {
            return None;
        }

        let vf = stats.volume_factor?;
        let ret = stats.structural_return()?;
        let vwap = stats.vwap()?;

        // Large directional moves are trend, not absorption
        if ret.abs() > max_abs_ret || vf < min_vf {
            return None;
        }

        let median = median_in_place(&mut prices)?;
        drop(prices);
        if median.abs() <= MIN_MEDIAN_MAGNITUDE {
            return None;
        }

        let diff = vwap - median;
        let sideways = 1.0 - (ret.abs() / max_abs_ret).min(1.0);
        let score = (diff / median.abs()) * vf.ln_1p() * sideways;

        let magnitude = score.abs();
        let kind = if magnitude >= weak && score > 0.0 {
            AdKind::Absorption
        } else if magnitude >= weak && score < 0.0 {
            AdKind::Distribution
        } else {
            AdKind::Neutral
        };

        Some(AbsorptionSignal {
            kind,
            strong: kind != AdKind::Neutral && magnitude >= strong,
            score,
            ret,
            volume_factor: vf,
            vwap,
            median,
            vwap_minus_median: diff,
        })
    }
}
