// Sliding Window - Fixed-capacity ring of trades with capacity and time eviction
// Running aggregates are folded in/out per trade instead of rescanning the window

use parking_lot::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::{debug, trace, warn};

use crate::core::config::{SignalConfig, WindowConfig};
use crate::core::fixed_point::{Qty, QtyScale};
use crate::core::types::{Side, TradePoint};

use super::buffer_pool::BufferPool;
use super::ema::Ema;

// ============================================================================
// Locked State
// ============================================================================

/// Everything behind the window lock. Only the insertion path mutates it.
#[derive(Debug)]
pub(crate) struct WindowState {
    pub(crate) buf: Vec<TradePoint>, // fixed length == capacity, never resized
    pub(crate) start: usize,
    pub(crate) size: usize,

    // Volume aggregates (ticks), widened so a full window of max-size trades cannot overflow
    pub(crate) total_volume: i128, // raw signed sum
    pub(crate) sum_v: i128,        // Σ max(volume, 0)
    pub(crate) sum_pv: i128,       // Σ price * max(volume, 0)
    pub(crate) buy_volume: i128,
    pub(crate) sell_volume: i128,
    pub(crate) trade_count: i64,

    // Price aggregates (ticks)
    pub(crate) latest_price: Qty,
    pub(crate) highest_price: Qty,
    pub(crate) lowest_price: Qty,
    pub(crate) extrema_dirty: bool,

    // Derived caches, refreshed once per insertion
    pub(crate) avg_volume_per_point: i128,
    pub(crate) volume_per_second: f64, // ticks per second

    pub(crate) ema: Ema,
}

impl WindowState {
    fn new(capacity: usize, ema_alpha: f64) -> Self {
        Self {
            buf: vec![TradePoint::default(); capacity],
            start: 0,
            size: 0,
            total_volume: 0,
            sum_v: 0,
            sum_pv: 0,
            buy_volume: 0,
            sell_volume: 0,
            trade_count: 0,
            latest_price: Qty::ZERO,
            highest_price: Qty::ZERO,
            lowest_price: Qty::ZERO,
            extrema_dirty: false,
            avg_volume_per_point: 0,
            volume_per_second: 0.0,
            ema: Ema::new(ema_alpha),
        }
    }

    fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// i-th oldest retained point; `i < size`
    pub(crate) fn at(&self, i: usize) -> &TradePoint {
        &self.buf[(self.start + i) % self.buf.len()]
    }

    pub(crate) fn oldest(&self) -> Option<&TradePoint> {
        (self.size > 0).then(|| self.at(0))
    }

    pub(crate) fn newest(&self) -> Option<&TradePoint> {
        (self.size > 0).then(|| self.at(self.size - 1))
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TradePoint> + '_ {
        (0..self.size).map(move |i| self.at(i))
    }

    /// Zero every window-scoped aggregate. The EMA is whole-history and survives.
    fn reset_aggregates(&mut self) {
        self.total_volume = 0;
        self.sum_v = 0;
        self.sum_pv = 0;
        self.buy_volume = 0;
        self.sell_volume = 0;
        self.trade_count = 0;
        self.latest_price = Qty::ZERO;
        self.highest_price = Qty::ZERO;
        self.lowest_price = Qty::ZERO;
        self.extrema_dirty = false;
    }

    fn fold_in(&mut self, pt: &TradePoint, count_unknown_side: bool) {
        let px = pt.price;
        self.latest_price = px;
        if px > self.highest_price {
            self.highest_price = px;
        }
        if px < self.lowest_price {
            self.lowest_price = px;
        }

        if pt.side == Side::Unknown && !count_unknown_side {
            return;
        }

        self.total_volume += pt.volume.ticks() as i128;
        if pt.volume.is_positive() {
            self.ema.update(pt.volume.ticks() as f64);
        }
        self.trade_count += 1;

        let v = pt.volume.non_negative();
        self.sum_v += v.ticks() as i128;
        self.sum_pv += px.widening_mul(v);

        match pt.side {
            Side::Buy => self.buy_volume += v.ticks() as i128,
            Side::Sell => self.sell_volume += v.ticks() as i128,
            Side::Unknown => {}
        }
    }

    fn fold_out(&mut self, pt: &TradePoint, count_unknown_side: bool) {
        // The true new extremum is unknown until the next rescan
        if pt.price == self.highest_price || pt.price == self.lowest_price {
            self.extrema_dirty = true;
        }

        if pt.side == Side::Unknown && !count_unknown_side {
            return;
        }

        self.total_volume -= pt.volume.ticks() as i128;
        self.trade_count -= 1;

        let v = pt.volume.non_negative();
        self.sum_v -= v.ticks() as i128;
        self.sum_pv -= pt.price.widening_mul(v);

        match pt.side {
            Side::Buy => self.buy_volume -= v.ticks() as i128,
            Side::Sell => self.sell_volume -= v.ticks() as i128,
            Side::Unknown => {}
        }
    }

    fn push(&mut self, pt: TradePoint, count_unknown_side: bool) {
        let capacity = self.capacity();

        if self.size == 0 {
            self.reset_aggregates();
            self.buf[0] = pt;
            self.start = 0;
            self.size = 1;
            self.highest_price = pt.price;
            self.lowest_price = pt.price;
            self.fold_in(&pt, count_unknown_side);
        } else if self.size < capacity {
            let idx = (self.start + self.size) % capacity;
            self.buf[idx] = pt;
            self.size += 1;
            self.fold_in(&pt, count_unknown_side);
        } else {
            // Full: overwrite the head slot
            let idx = self.start;
            let evicted = self.buf[idx];
            self.fold_out(&evicted, count_unknown_side);
            self.buf[idx] = pt;
            self.start = (self.start + 1) % capacity;
            self.fold_in(&pt, count_unknown_side);
        }
    }

    /// Drop every head point with `timestamp <= threshold`; returns the count evicted
    fn trim_expired(&mut self, threshold: i64, count_unknown_side: bool) -> usize {
        let mut evicted = 0;
        while self.size > 0 {
            let head = self.buf[self.start];
            if head.timestamp > threshold {
                break;
            }
            self.fold_out(&head, count_unknown_side);
            self.start = (self.start + 1) % self.capacity();
            self.size -= 1;
            evicted += 1;
        }

        if self.size == 0 {
            // Callers must use the readiness predicate, not zero prices, to detect "no data"
            self.reset_aggregates();
        } else if let Some(newest) = self.newest() {
            self.latest_price = newest.price;
        }
        evicted
    }

    fn recompute_extrema_if_dirty(&mut self) {
        if !self.extrema_dirty {
            return;
        }

        let extrema = {
            let mut prices = self.iter().map(|pt| pt.price);
            prices
                .next()
                .map(|first| prices.fold((first, first), |(hi, lo), px| (hi.max(px), lo.min(px))))
        };
        let (hi, lo) = extrema.unwrap_or((Qty::ZERO, Qty::ZERO));
        self.highest_price = hi;
        self.lowest_price = lo;
        self.extrema_dirty = false;
        trace!(high = %self.highest_price, low = %self.lowest_price, "Extrema rescanned");
    }

    fn refresh_volume_caches(&mut self) {
        if self.size == 0 || self.trade_count <= 0 {
            self.avg_volume_per_point = 0;
            self.volume_per_second = 0.0;
            return;
        }

        self.avg_volume_per_point = self.total_volume / self.trade_count as i128;

        self.volume_per_second = match (self.oldest(), self.newest()) {
            (Some(oldest), Some(newest)) if self.size >= 2 => {
                let secs = newest.timestamp.saturating_sub(oldest.timestamp) as f64 / 1000.0;
                if secs > 0.0 {
                    self.total_volume as f64 / secs
                } else {
                    0.0
                }
            }
            _ => 0.0,
        };
    }
}

// ============================================================================
// Sliding Window
// ============================================================================

/// Bounded, time-expiring window of trades with incrementally maintained aggregates.
///
/// All state lives behind one reader/writer lock. Latest/highest/lowest price and
/// trade count are additionally mirrored into atomics, written inside the same
/// critical section as each insertion and readable without the lock. Those
/// lock-free reads may reflect an insertion that a concurrent locked read has not
/// yet observed (or vice versa); callers that need cross-field consistency should
/// use [`SlidingWindow::snapshot`] or the other locked reads.
pub struct SlidingWindow {
    duration_ms: i64,
    price_scale: QtyScale,
    volume_scale: QtyScale,
    count_unknown_side: bool,

    pub(crate) state: RwLock<WindowState>,

    // Lock-free mirrors (ticks / count)
    latest_price: AtomicI64,
    highest_price: AtomicI64,
    lowest_price: AtomicI64,
    trade_count: AtomicI64,

    pub(crate) pool: BufferPool,
    pub(crate) signals: SignalConfig,
}

impl SlidingWindow {
    /// Window with default scales (4 price decimals, 8 volume decimals)
    pub fn new(duration_ms: i64, capacity: usize, ema_alpha: f64) -> Self {
        let config = WindowConfig { duration_ms, capacity, ema_alpha, ..Default::default() };
        Self::with_config(config, SignalConfig::default())
    }

    pub fn with_config(config: WindowConfig, signals: SignalConfig) -> Self {
        let capacity = if config.capacity == 0 {
            warn!("Window capacity 0 requested, using 1");
            1
        } else {
            config.capacity
        };
        let ema_alpha = config.effective_ema_alpha();
        if ema_alpha != config.ema_alpha {
            warn!(requested = config.ema_alpha, effective = ema_alpha, "EMA alpha clamped");
        }

        debug!(
            duration_ms = config.duration_ms,
            capacity = capacity,
            ema_alpha = ema_alpha,
            price_decimals = config.price_decimals,
            volume_decimals = config.volume_decimals,
            "Initializing SlidingWindow"
        );

        Self {
            duration_ms: config.duration_ms,
            price_scale: config.price_scale(),
            volume_scale: config.volume_scale(),
            count_unknown_side: config.count_unknown_side,
            state: RwLock::new(WindowState::new(capacity, ema_alpha)),
            latest_price: AtomicI64::new(0),
            highest_price: AtomicI64::new(0),
            lowest_price: AtomicI64::new(0),
            trade_count: AtomicI64::new(0),
            pool: BufferPool::new(config.pool_max_retained_capacity),
            signals,
        }
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Insert one trade
    pub fn add(&self, point: TradePoint) {
        self.add_batch(std::slice::from_ref(&point));
    }

    /// Insert trades given in non-decreasing timestamp order. Expiry is judged
    /// against the last trade of the batch.
    pub fn add_batch(&self, points: &[TradePoint]) {
        let Some(last) = points.last() else {
            return;
        };
        let threshold = last.timestamp.saturating_sub(self.duration_ms);

        let mut state = self.state.write();

        let mut skipped = 0usize;
        for pt in points {
            // Already expired relative to this batch: folding it in could only
            // push a live point out through capacity eviction
            if pt.timestamp <= threshold {
                skipped += 1;
                continue;
            }
            state.push(*pt, self.count_unknown_side);
        }

        let expired = state.trim_expired(threshold, self.count_unknown_side);
        state.recompute_extrema_if_dirty();
        state.refresh_volume_caches();
        self.publish_scalars(&state);

        trace!(
            batch = points.len(),
            skipped = skipped,
            expired = expired,
            size = state.size,
            "Batch folded into window"
        );
    }

    /// Build a trade from decimal inputs at the window's scales and insert it
    pub fn add_trade(&self, side: Side, price: f64, size: f64, timestamp_ms: i64) {
        self.add(TradePoint::from_decimal(
            side,
            price,
            size,
            timestamp_ms,
            self.price_scale,
            self.volume_scale,
        ));
    }

    fn publish_scalars(&self, state: &WindowState) {
        self.latest_price.store(state.latest_price.ticks(), Ordering::Release);
        self.highest_price.store(state.highest_price.ticks(), Ordering::Release);
        self.lowest_price.store(state.lowest_price.ticks(), Ordering::Release);
        self.trade_count.store(state.trade_count, Ordering::Release);
    }

    // ------------------------------------------------------------------------
    // Lock-free reads
    // ------------------------------------------------------------------------

    pub fn latest_price(&self) -> f64 {
        self.price_from_ticks(self.latest_price.load(Ordering::Acquire))
    }

    pub fn highest_price(&self) -> f64 {
        self.price_from_ticks(self.highest_price.load(Ordering::Acquire))
    }

    pub fn lowest_price(&self) -> f64 {
        self.price_from_ticks(self.lowest_price.load(Ordering::Acquire))
    }

    pub fn trade_count(&self) -> i64 {
        self.trade_count.load(Ordering::Acquire)
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn duration_ms(&self) -> i64 {
        self.duration_ms
    }

    pub fn capacity(&self) -> usize {
        self.state.read().capacity()
    }

    pub fn price_scale(&self) -> QtyScale {
        self.price_scale
    }

    pub fn volume_scale(&self) -> QtyScale {
        self.volume_scale
    }

    pub fn signal_config(&self) -> &SignalConfig {
        &self.signals
    }

    pub(crate) fn price_from_ticks(&self, ticks: i64) -> f64 {
        Qty::from_ticks(ticks).to_f64(self.price_scale)
    }

    pub(crate) fn volume_from_ticks(&self, ticks: i128) -> f64 {
        self.volume_scale.wide_to_f64(ticks)
    }
}
