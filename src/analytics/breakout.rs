// Breakout Strength - Newest price against the range of everything before it

use serde::{Deserialize, Serialize};

use crate::window::SlidingWindow;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakoutStrength {
    pub high: f64,
    pub low: f64,
    pub price: f64,
    pub range: f64,
    pub pos01: f64,         // position within [low, high], clamped to [0, 1]
    pub strength: f64,      // positive above high, negative below low, 0 inside
    pub strength_norm: f64, // strength / range
}

/// `prices` oldest first; the last element is the candidate breakout
pub(crate) fn breakout_strength(prices: &[f64]) -> Option<BreakoutStrength> {
    let (&price, prior) = prices.split_last()?;
    let (&first, rest) = prior.split_first()?;

    let (high, low) = rest.iter().fold((first, first), |(hi, lo), &px| (hi.max(px), lo.min(px)));
    let range = high - low;
    if range <= 0.0 {
        return None;
    }

    let pos01 = ((price - low) / range).clamp(0.0, 1.0);
    let strength = if price > high {
        price - high
    } else if price < low {
        price - low
    } else {
        0.0
    };

    Some(BreakoutStrength {
        high,
        low,
        price,
        range,
        pos01,
        strength,
        strength_norm: strength / range,
    })
}

impl SlidingWindow {
    pub fn breakout_strength(&self) -> Option<BreakoutStrength> {
        let (_, prices) = self.capture();
        breakout_strength(&prices)
    }
}
