// Window Snapshot - One serializable record of the window's headline statistics
// Safe to call on a cadence: thin windows degrade to zeros instead of failing

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::trace;

use crate::window::SlidingWindow;

use super::volatility::realized_volatility;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub highest_price: f64,
    pub lowest_price: f64,
    pub volume_weighted_average_price: f64,
    pub latest_price: f64,
    pub total_volume: f64,
    pub buy_volume: f64,
    pub sell_volume: f64,
    pub delta_volume: f64,
    pub imbalance: f64,
    pub volatility: f64,
    pub momentum: f64,
    pub n_trades: i64,
    pub window_ms: i64,
    pub ts: i64, // read time, ms since epoch
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

pub(crate) fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

impl SlidingWindow {
    /// Compose lock-free scalars with one locked capture. Never fails.
    pub fn snapshot(&self) -> Snapshot {
        let highest_price = self.highest_price();
        let lowest_price = self.lowest_price();
        let latest_price = self.latest_price();
        let n_trades = self.trade_count();

        let (stats, prices) = self.capture();
        let thin = stats.points < 2;

        let vwap = if thin { None } else { stats.vwap() };
        let volatility = realized_volatility(&prices);
        drop(prices);

        let momentum = if thin { None } else { stats.momentum() };

        if thin {
            trace!(points = stats.points, "Snapshot of thin window");
        }

        Snapshot {
            highest_price,
            lowest_price,
            volume_weighted_average_price: vwap.unwrap_or(0.0),
            latest_price,
            total_volume: stats.total_volume,
            buy_volume: stats.buy_volume,
            sell_volume: stats.sell_volume,
            delta_volume: stats.delta_volume(),
            imbalance: stats.imbalance(),
            volatility: volatility.unwrap_or(0.0),
            momentum: momentum.unwrap_or(0.0),
            n_trades,
            window_ms: self.duration_ms(),
            ts: now_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Side;

    #[test]
    fn test_empty_snapshot_is_zeroed() {
        let window = SlidingWindow::new(30_000, 8, 0.1);
        let snap = window.snapshot();
        assert_eq!(snap.n_trades, 0);
        assert_eq!(snap.volume_weighted_average_price, 0.0);
        assert_eq!(snap.volatility, 0.0);
        assert_eq!(snap.momentum, 0.0);
        assert_eq!(snap.window_ms, 30_000);
        assert!(snap.ts > 0);
    }

    #[test]
    fn test_single_point_snapshot() {
        let window = SlidingWindow::new(30_000, 8, 0.1);
        window.add_trade(Side::Buy, 100.0, 2.0, 0);
        let snap = window.snapshot();
        assert_eq!(snap.latest_price, 100.0);
        assert_eq!(snap.highest_price, 100.0);
        assert_eq!(snap.volume_weighted_average_price, 0.0);
        assert!((snap.buy_volume - 2.0).abs() < 1e-9);
        assert_eq!(snap.imbalance, 1.0);
    }

    #[test]
    fn test_snapshot_values() {
        let window = SlidingWindow::new(30_000, 8, 0.1);
        window.add_trade(Side::Buy, 100.0, 3.0, 0);
        window.add_trade(Side::Sell, 102.0, 1.0, 1_000);

        let snap = window.snapshot();
        assert_eq!(snap.n_trades, 2);
        assert!((snap.volume_weighted_average_price - 100.5).abs() < 1e-9);
        assert!((snap.delta_volume - 2.0).abs() < 1e-9);
        assert!((snap.imbalance - 0.5).abs() < 1e-9);
        assert!((snap.total_volume - 4.0).abs() < 1e-9);
        assert!(snap.volatility > 0.0);
        assert!(snap.momentum > 0.0);
    }

    #[test]
    fn test_snapshot_momentum_matches_locked_read() {
        // alpha = 1: baseline is the last volume, so vf = avg 2 / 3
        let window = SlidingWindow::new(30_000, 8, 1.0);
        window.add_trade(Side::Buy, 100.0, 1.0, 0);
        window.add_trade(Side::Buy, 101.0, 3.0, 1_000);

        let expected = 0.01 * (1.0 + 2.0 / 3.0_f64).ln();
        let snap = window.snapshot();
        assert!((snap.momentum - expected).abs() < 1e-12);
        assert!((snap.momentum - window.momentum().unwrap()).abs() < 1e-15);
    }

    #[test]
    fn test_snapshot_momentum_zero_without_baseline() {
        let window = SlidingWindow::new(30_000, 8, 0.5);
        window.add_trade(Side::Buy, 100.0, 0.0, 0);
        window.add_trade(Side::Buy, 110.0, 0.0, 1_000);
        assert_eq!(window.momentum(), None);
        assert_eq!(window.snapshot().momentum, 0.0);
    }

    #[test]
    fn test_json_field_names() {
        let window = SlidingWindow::new(30_000, 8, 0.1);
        window.add_trade(Side::Buy, 100.0, 1.0, 0);
        let json = window.snapshot().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        for key in [
            "highest_price",
            "lowest_price",
            "volume_weighted_average_price",
            "latest_price",
            "total_volume",
            "buy_volume",
            "sell_volume",
            "delta_volume",
            "imbalance",
            "volatility",
            "momentum",
            "n_trades",
            "window_ms",
            "ts",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }
}
