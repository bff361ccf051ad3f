// Window Reads - Locked scalar reads and the point-in-time capture used by analytics
// Capture copies prices into a pooled buffer under the read lock; callers compute after release

use crate::core::fixed_point::{Qty, QtyScale};

use super::buffer_pool::PooledBuffer;
use super::ring::{SlidingWindow, WindowState};

// ============================================================================
// Captured Window Stats
// ============================================================================

/// Consistent copy of the aggregates taken in the same critical section as the price buffer
#[derive(Debug, Clone, Copy)]
pub struct WindowStats {
    pub points: usize,
    pub oldest_price: f64,
    pub newest_price: f64,
    pub high: f64,
    pub low: f64,
    pub total_volume: f64,
    pub buy_volume: f64,
    pub sell_volume: f64,
    pub trade_count: i64,
    pub volume_factor: Option<f64>,

    // Exact tick sums for VWAP
    sum_pv_ticks: i128,
    sum_v_ticks: i128,
    price_scale: QtyScale,
}

impl WindowStats {
    /// Σ(price·volume) / Σvolume; `None` if no positive volume
    pub fn vwap(&self) -> Option<f64> {
        if self.sum_v_ticks <= 0 {
            return None;
        }
        let ticks = self.sum_pv_ticks as f64 / self.sum_v_ticks as f64;
        Some(ticks / self.price_scale.as_f64())
    }

    /// (newest − oldest) / oldest; `None` with fewer than 2 points or a zero oldest price
    pub fn structural_return(&self) -> Option<f64> {
        if self.points < 2 || self.oldest_price == 0.0 {
            return None;
        }
        Some((self.newest_price - self.oldest_price) / self.oldest_price)
    }

    pub fn delta_volume(&self) -> f64 {
        self.buy_volume - self.sell_volume
    }

    pub fn imbalance(&self) -> f64 {
        imbalance(self.buy_volume, self.sell_volume)
    }
}

pub(crate) fn imbalance(buy: f64, sell: f64) -> f64 {
    let den = buy + sell;
    if den <= 0.0 {
        return 0.0;
    }
    (buy - sell) / den
}

impl WindowState {
    /// Average volume per counted trade over the EMA baseline, both in ticks
    pub(crate) fn volume_factor(&self) -> Option<f64> {
        let baseline = self.ema.get().filter(|b| *b > 0.0)?;
        if self.size == 0 || self.trade_count <= 0 || self.total_volume <= 0 {
            return None;
        }

        let avg = self.total_volume as f64 / self.trade_count as f64;
        let vf = avg / baseline;
        (vf > 0.0 && vf.is_finite()).then_some(vf)
    }

    pub(crate) fn structural_return(&self, price_scale: QtyScale) -> Option<f64> {
        let oldest = self.oldest()?;
        let newest = self.newest()?;
        if oldest.price.is_zero() {
            return None;
        }
        let old = oldest.price.to_f64(price_scale);
        Some((newest.price.to_f64(price_scale) - old) / old)
    }
}

// ============================================================================
// Locked Reads
// ============================================================================

impl SlidingWindow {
    pub fn len(&self) -> usize {
        self.state.read().size
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().size == 0
    }

    /// True once the window holds at least `min_points` trades
    pub fn ready(&self, min_points: usize) -> bool {
        self.state.read().size >= min_points
    }

    /// Raw signed volume of counted trades
    pub fn sum_volume(&self) -> f64 {
        let ticks = self.state.read().total_volume;
        self.volume_from_ticks(ticks)
    }

    pub fn buy_volume(&self) -> f64 {
        let ticks = self.state.read().buy_volume;
        self.volume_from_ticks(ticks)
    }

    pub fn sell_volume(&self) -> f64 {
        let ticks = self.state.read().sell_volume;
        self.volume_from_ticks(ticks)
    }

    /// Buy volume minus sell volume
    pub fn delta_volume(&self) -> f64 {
        let (buy, sell) = self.split_volumes();
        buy - sell
    }

    /// (buy − sell) / (buy + sell) in [-1, 1]; 0 with no sided volume
    pub fn imbalance(&self) -> f64 {
        let (buy, sell) = self.split_volumes();
        imbalance(buy, sell)
    }

    fn split_volumes(&self) -> (f64, f64) {
        let state = self.state.read();
        (self.volume_from_ticks(state.buy_volume), self.volume_from_ticks(state.sell_volume))
    }

    /// Cached after each insertion
    pub fn avg_volume_per_point(&self) -> f64 {
        let ticks = self.state.read().avg_volume_per_point;
        self.volume_from_ticks(ticks)
    }

    /// Cached after each insertion; 0 when the window spans no time
    pub fn volume_per_second(&self) -> f64 {
        self.state.read().volume_per_second / self.volume_scale().as_f64()
    }

    /// Current average volume per trade relative to the EMA baseline
    pub fn volume_factor(&self) -> Option<f64> {
        self.state.read().volume_factor()
    }

    /// EMA of per-trade volume over the whole history (not window-scoped)
    pub fn ema_baseline(&self) -> Option<f64> {
        let ticks = self.state.read().ema.get()?;
        Some(ticks / self.volume_scale().as_f64())
    }

    /// (oldest price, newest price, total volume); `None` with fewer than 2 points
    pub fn endpoints(&self) -> Option<(f64, f64, f64)> {
        let state = self.state.read();
        if state.size < 2 {
            return None;
        }
        let oldest = state.oldest()?.price.to_f64(self.price_scale());
        let newest = state.newest()?.price.to_f64(self.price_scale());
        Some((oldest, newest, self.volume_from_ticks(state.total_volume)))
    }

    /// Full scan for (high, low), independent of the cached extrema
    pub fn high_low(&self) -> Option<(f64, f64)> {
        let state = self.state.read();
        let mut prices = state.iter().map(|pt| pt.price);
        let first = prices.next()?;
        let (hi, lo) = prices.fold((first, first), |(hi, lo), px| (hi.max(px), lo.min(px)));
        Some((hi.to_f64(self.price_scale()), lo.to_f64(self.price_scale())))
    }

    /// (newest − oldest) / oldest over the window
    pub fn structural_return(&self) -> Option<f64> {
        let state = self.state.read();
        if state.size < 2 {
            return None;
        }
        state.structural_return(self.price_scale())
    }

    /// Copy prices (oldest first) into a pooled buffer and capture the aggregates.
    /// The read lock is released before this returns.
    pub fn capture(&self) -> (WindowStats, PooledBuffer<'_>) {
        let price_scale = self.price_scale();
        let volume_scale = self.volume_scale();

        let state = self.state.read();
        let n = state.size;
        let mut prices = self.pool.acquire(n);
        for (slot, pt) in prices.iter_mut().zip(state.iter()) {
            *slot = pt.price.to_f64(price_scale);
        }

        let price_of = |q: Option<Qty>| q.map_or(0.0, |p| p.to_f64(price_scale));
        let stats = WindowStats {
            points: n,
            oldest_price: price_of(state.oldest().map(|pt| pt.price)),
            newest_price: price_of(state.newest().map(|pt| pt.price)),
            high: state.highest_price.to_f64(price_scale),
            low: state.lowest_price.to_f64(price_scale),
            total_volume: volume_scale.wide_to_f64(state.total_volume),
            buy_volume: volume_scale.wide_to_f64(state.buy_volume),
            sell_volume: volume_scale.wide_to_f64(state.sell_volume),
            trade_count: state.trade_count,
            volume_factor: state.volume_factor(),
            sum_pv_ticks: state.sum_pv,
            sum_v_ticks: state.sum_v,
            price_scale,
        };
        drop(state);

        (stats, prices)
    }
}
