// Equilibrium Zone - Fair-value band around a VWAP/median blend
// Band half-width is the larger of a range fraction and the window's own move

use serde::{Deserialize, Serialize};

use crate::window::SlidingWindow;

use super::price::median_in_place;

const MIN_BAND_WIDTH: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquilibriumZone {
    pub equ_price: f64,
    pub upper_band: f64,
    pub lower_band: f64,
    pub band_width: f64,
    pub price: f64,     // newest price
    pub distance: f64,  // price - equ_price
    pub norm_dist: f64, // distance / band_width
}

impl EquilibriumZone {
    /// Newest price sits inside [lower_band, upper_band]
    pub fn contains_price(&self) -> bool {
        self.price >= self.lower_band && self.price <= self.upper_band
    }
}

impl SlidingWindow {
    /// `alpha` weights VWAP against the median; `beta` is the range fraction for the band
    pub fn equilibrium_zone(&self, alpha: f64, beta: f64) -> Option<EquilibriumZone> {
        let (stats, mut prices) = self.capture();
        if stats.points < 2 {
            return None;
        }

        let vwap = stats.vwap()?;
        let ret = stats.structural_return()?;
        let range = stats.high - stats.low;
        if range <= 0.0 {
            return None;
        }

        let median = median_in_place(&mut prices)?;
        drop(prices);

        let equ = alpha * vwap + (1.0 - alpha) * median;
        let newest = stats.newest_price;
        let band_width = (beta * range).max(ret.abs() * newest);
        if band_width <= MIN_BAND_WIDTH {
            return None;
        }

        let distance = newest - equ;
        Some(EquilibriumZone {
            equ_price: equ,
            upper_band: equ + band_width,
            lower_band: equ - band_width,
            band_width,
            price: newest,
            distance,
            norm_dist: distance / band_width,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Side;

    #[test]
    fn test_zone_from_range_fraction() {
        let window = SlidingWindow::new(60_000, 16, 0.1);
        for (i, px) in [100.0, 110.0, 90.0, 100.0].iter().enumerate() {
            window.add_trade(Side::Buy, *px, 1.0, i as i64);
        }

        let zone = window.equilibrium_zone(0.5, 0.25).unwrap();
        // vwap = 100, median = 100, range = 20, ret = 0
        assert!((zone.equ_price - 100.0).abs() < 1e-9);
        assert!((zone.band_width - 5.0).abs() < 1e-9);
        assert!((zone.upper_band - 105.0).abs() < 1e-9);
        assert!((zone.lower_band - 95.0).abs() < 1e-9);
        assert!(zone.distance.abs() < 1e-9);
        assert!(zone.contains_price());
    }

    #[test]
    fn test_band_widens_to_return_scale() {
        let window = SlidingWindow::new(60_000, 16, 0.1);
        window.add_trade(Side::Buy, 100.0, 1.0, 0);
        window.add_trade(Side::Buy, 120.0, 1.0, 1);

        let zone = window.equilibrium_zone(1.0, 0.1).unwrap();
        // beta * range = 2, |ret| * newest = 0.2 * 120 = 24
        assert!((zone.band_width - 24.0).abs() < 1e-9);
        assert!((zone.equ_price - 110.0).abs() < 1e-9);
        assert!((zone.distance - 10.0).abs() < 1e-9);
        assert!((zone.norm_dist - 10.0 / 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_inputs() {
        let window = SlidingWindow::new(60_000, 16, 0.1);
        window.add_trade(Side::Buy, 100.0, 1.0, 0);
        assert_eq!(window.equilibrium_zone(0.7, 0.15), None);

        // Flat range
        window.add_trade(Side::Buy, 100.0, 1.0, 1);
        assert_eq!(window.equilibrium_zone(0.7, 0.15), None);

        // Zero oldest price
        let zero = SlidingWindow::new(60_000, 16, 0.1);
        zero.add_trade(Side::Buy, 0.0, 1.0, 0);
        zero.add_trade(Side::Buy, 10.0, 1.0, 1);
        assert_eq!(zero.equilibrium_zone(0.7, 0.15), None);
    }
}
