// Price Analytics - VWAP and median price over the window
// Both need at least two trades; median sorts a pooled copy outside the lock

use crate::window::SlidingWindow;

/// Sort in place and take the middle value (mean of the two middle values when even)
pub(crate) fn median_in_place(prices: &mut [f64]) -> Option<f64> {
    let n = prices.len();
    if n == 0 {
        return None;
    }
    prices.sort_unstable_by(f64::total_cmp);
    if n % 2 == 1 {
        Some(prices[n / 2])
    } else {
        Some((prices[n / 2 - 1] + prices[n / 2]) / 2.0)
    }
}

impl SlidingWindow {
    /// Volume-weighted average price from exact tick sums
    pub fn vwap(&self) -> Option<f64> {
        let (stats, _prices) = self.capture();
        if stats.points < 2 {
            return None;
        }
        stats.vwap()
    }

    pub fn median_price(&self) -> Option<f64> {
        let (stats, mut prices) = self.capture();
        if stats.points < 2 {
            return None;
        }
        median_in_place(&mut prices)
    }
}
