// Fixed-Point Quantities - Scaled-integer price/volume representation
// Running sums are accumulated in tick space; floats only appear at the read boundary

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use tracing::warn;

/// Bias added before rounding to counter binary representation error
/// (e.g. 0.29 * 100 = 28.999999999999996).
const ROUNDING_EPSILON: f64 = 1e-9;

const MIN_DECIMALS: u32 = 1;
const MAX_DECIMALS: u32 = 18;

// ============================================================================
// Scale
// ============================================================================

/// Power-of-ten scale: number of ticks per whole unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QtyScale(i64);

impl QtyScale {
    /// Build a scale of `10^decimals`, clamped to 1..=18 decimals
    pub fn from_decimals(decimals: u32) -> Self {
        let decimals = decimals.clamp(MIN_DECIMALS, MAX_DECIMALS);
        Self(10_i64.pow(decimals))
    }

    pub fn ticks_per_unit(&self) -> i64 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64
    }

    /// Decimal value of a widened running sum
    pub fn wide_to_f64(&self, ticks: i128) -> f64 {
        ticks as f64 / self.as_f64()
    }
}

impl Default for QtyScale {
    fn default() -> Self {
        Self::from_decimals(4)
    }
}

impl fmt::Display for QtyScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "1e{}", self.0.ilog10())
    }
}

// ============================================================================
// Quantity
// ============================================================================

/// Integer tick count; `value = ticks / scale`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Qty(i64);

impl Qty {
    pub const ZERO: Qty = Qty(0);

    pub fn from_ticks(ticks: i64) -> Self {
        Self(ticks)
    }

    /// Convert a decimal value to ticks, rounding to the nearest tick.
    /// Values outside the i64 tick range saturate (NaN maps to zero).
    pub fn from_f64(value: f64, scale: QtyScale) -> Self {
        let scaled = (value * scale.as_f64() + ROUNDING_EPSILON).round();
        if !scaled.is_finite() || scaled < i64::MIN as f64 || scaled >= i64::MAX as f64 {
            warn!(value = value, scale = %scale, "Quantity saturated at tick range");
        }
        Self(scaled as i64)
    }

    pub fn to_f64(self, scale: QtyScale) -> f64 {
        self.0 as f64 / scale.as_f64()
    }

    pub fn ticks(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Negative quantities collapse to zero
    pub fn non_negative(self) -> Self {
        Self(self.0.max(0))
    }

    /// Exact price x volume product in tick space
    pub fn widening_mul(self, other: Qty) -> i128 {
        self.0 as i128 * other.0 as i128
    }
}

impl Add for Qty {
    type Output = Qty;
    fn add(self, rhs: Qty) -> Qty {
        Qty(self.0 + rhs.0)
    }
}

impl Sub for Qty {
    type Output = Qty;
    fn sub(self, rhs: Qty) -> Qty {
        Qty(self.0 - rhs.0)
    }
}

impl AddAssign for Qty {
    fn add_assign(&mut self, rhs: Qty) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Qty {
    fn sub_assign(&mut self, rhs: Qty) {
        self.0 -= rhs.0;
    }
}

impl Neg for Qty {
    type Output = Qty;
    fn neg(self) -> Qty {
        Qty(-self.0)
    }
}

impl fmt::Display for Qty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}t", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_from_decimals() {
        assert_eq!(QtyScale::from_decimals(4).ticks_per_unit(), 10_000);
        assert_eq!(QtyScale::from_decimals(8).ticks_per_unit(), 100_000_000);
        // Clamped into 1..=18
        assert_eq!(QtyScale::from_decimals(0).ticks_per_unit(), 10);
        assert_eq!(QtyScale::from_decimals(30).ticks_per_unit(), 1_000_000_000_000_000_000);
    }

    #[test]
    fn test_round_trip_within_one_tick() {
        let scale = QtyScale::from_decimals(4);
        for &x in &[0.0, 1.0, -1.0, 0.29, 100.1234, -95000.5678, 1e9 + 0.0001] {
            let back = Qty::from_f64(x, scale).to_f64(scale);
            assert!((back - x).abs() <= 1.0 / scale.as_f64(), "x={} back={}", x, back);
        }
    }

    #[test]
    fn test_epsilon_bias() {
        let scale = QtyScale::from_decimals(2);
        assert_eq!(Qty::from_f64(0.29, scale).ticks(), 29);
        assert_eq!(Qty::from_f64(1.005, scale).ticks(), 101);
    }

    #[test]
    fn test_max_precision_volume() {
        let scale = QtyScale::from_decimals(8);
        let q = Qty::from_f64(0.00000001, scale);
        assert_eq!(q.ticks(), 1);
        assert!((q.to_f64(scale) - 0.00000001).abs() < 1e-12);
    }

    #[test]
    fn test_arithmetic() {
        let mut q = Qty::from_ticks(10);
        q += Qty::from_ticks(5);
        q -= Qty::from_ticks(3);
        assert_eq!(q, Qty::from_ticks(12));
        assert_eq!((-q).abs(), q);
        assert_eq!(Qty::from_ticks(-4).non_negative(), Qty::ZERO);
        assert!(Qty::ZERO.is_zero());
    }

    #[test]
    fn test_out_of_range_saturates() {
        let scale = QtyScale::from_decimals(8);
        // 1e11 * 1e8 = 1e19 ticks, past i64::MAX
        assert_eq!(Qty::from_f64(1e11, scale).ticks(), i64::MAX);
        assert_eq!(Qty::from_f64(-1e11, scale).ticks(), i64::MIN);
        assert_eq!(Qty::from_f64(f64::NAN, scale).ticks(), 0);
        assert_eq!(Qty::from_f64(1e9, scale).ticks(), 100_000_000_000_000_000);
    }

    #[test]
    fn test_wide_sum_to_f64() {
        let scale = QtyScale::from_decimals(2);
        assert!((scale.wide_to_f64(12_345) - 123.45).abs() < 1e-9);
        let wide = i64::MAX as i128 * 3;
        assert!((scale.wide_to_f64(wide) - 3.0 * i64::MAX as f64 / 100.0).abs() < 1e6);
    }

    #[test]
    fn test_widening_mul_does_not_overflow() {
        let price = Qty::from_ticks(i64::MAX / 2);
        let vol = Qty::from_ticks(1_000_000_000);
        let pv = price.widening_mul(vol);
        assert_eq!(pv, (i64::MAX / 2) as i128 * 1_000_000_000);
    }
}
