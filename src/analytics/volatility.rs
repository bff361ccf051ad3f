// Realized Volatility - Root of summed squared log returns across the window
// Not annualized; non-positive prices are skipped

use crate::window::SlidingWindow;

/// √Σ ln(pᵢ / pᵢ₋₁)² over consecutive positive prices.
/// A non-positive price contributes no term and leaves the previous price in place.
pub(crate) fn realized_volatility(prices: &[f64]) -> Option<f64> {
    let (&first, rest) = prices.split_first()?;
    if rest.is_empty() || first <= 0.0 {
        return None;
    }

    let mut prev = first;
    let mut sum_sq = 0.0;
    for &px in rest {
        if px <= 0.0 {
            continue;
        }
        let r = (px / prev).ln();
        sum_sq += r * r;
        prev = px;
    }
    Some(sum_sq.sqrt())
}

impl SlidingWindow {
    pub fn realized_volatility(&self) -> Option<f64> {
        let (_, prices) = self.capture();
        realized_volatility(&prices)
    }
}
