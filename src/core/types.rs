// Core Type Definitions for the Trade Window
// Trade events, aggressor side and signal classifications

use crate::core::fixed_point::{Qty, QtyScale};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Enums
// ============================================================================

/// Aggressor side of a trade. `Unknown` counts toward totals but never
/// toward the buy/sell split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[default]
    Unknown,
    Buy,
    Sell,
}

impl Side {
    /// Side from an exchange "buyer is maker" flag
    pub fn from_buyer_maker(is_buyer_maker: bool) -> Self {
        if is_buyer_maker {
            Side::Sell
        } else {
            Side::Buy
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Unknown => write!(f, "UNKNOWN"),
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

impl std::str::FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            "UNKNOWN" | "" => Ok(Side::Unknown),
            _ => Err(format!("Invalid Side: '{}'. Expected 'BUY', 'SELL' or 'UNKNOWN'", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MomentumLevel {
    StrongDown = -2,
    Down = -1,
    Neutral = 0,
    Up = 1,
    StrongUp = 2,
}

impl MomentumLevel {
    /// Bucket a signed momentum value by magnitude
    pub fn classify(value: f64, weak: f64, strong: f64) -> Self {
        let magnitude = value.abs();
        if magnitude >= strong {
            if value > 0.0 { MomentumLevel::StrongUp } else { MomentumLevel::StrongDown }
        } else if magnitude >= weak {
            if value > 0.0 { MomentumLevel::Up } else { MomentumLevel::Down }
        } else {
            MomentumLevel::Neutral
        }
    }
}

impl fmt::Display for MomentumLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Absorption/distribution classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdKind {
    #[default]
    Neutral,
    Absorption,
    Distribution,
}

impl fmt::Display for AdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// TradePoint
// ============================================================================

/// One trade event as stored in the window. Immutable once inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradePoint {
    pub timestamp: i64, // milliseconds
    pub price: Qty,
    pub volume: Qty,
    pub side: Side,
}

impl TradePoint {
    pub fn new(timestamp: i64, price: Qty, volume: Qty, side: Side) -> Self {
        Self { timestamp, price, volume, side }
    }

    /// Build a point from decimal price/size at the given scales
    pub fn from_decimal(
        side: Side,
        price: f64,
        size: f64,
        timestamp: i64,
        price_scale: QtyScale,
        volume_scale: QtyScale,
    ) -> Self {
        Self {
            timestamp,
            price: Qty::from_f64(price, price_scale),
            volume: Qty::from_f64(size, volume_scale),
            side,
        }
    }
}

impl fmt::Display for TradePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TradePoint(ts={}, price={}, volume={}, side={})",
            self.timestamp, self.price, self.volume, self.side
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_parsing() {
        assert_eq!("buy".parse::<Side>().unwrap(), Side::Buy);
        assert_eq!("SELL".parse::<Side>().unwrap(), Side::Sell);
        assert_eq!("".parse::<Side>().unwrap(), Side::Unknown);
        assert!("HOLD".parse::<Side>().is_err());
    }

    #[test]
    fn test_side_from_buyer_maker() {
        assert_eq!(Side::from_buyer_maker(true), Side::Sell);
        assert_eq!(Side::from_buyer_maker(false), Side::Buy);
    }

    #[test]
    fn test_momentum_level_buckets() {
        assert_eq!(MomentumLevel::classify(0.05, 0.01, 0.04), MomentumLevel::StrongUp);
        assert_eq!(MomentumLevel::classify(0.02, 0.01, 0.04), MomentumLevel::Up);
        assert_eq!(MomentumLevel::classify(0.005, 0.01, 0.04), MomentumLevel::Neutral);
        assert_eq!(MomentumLevel::classify(-0.02, 0.01, 0.04), MomentumLevel::Down);
        assert_eq!(MomentumLevel::classify(-0.04, 0.01, 0.04), MomentumLevel::StrongDown);
    }

    #[test]
    fn test_trade_point_from_decimal() {
        let p = TradePoint::from_decimal(
            Side::Buy,
            95000.25,
            0.5,
            1000,
            QtyScale::from_decimals(4),
            QtyScale::from_decimals(8),
        );
        assert_eq!(p.price.ticks(), 950_002_500);
        assert_eq!(p.volume.ticks(), 50_000_000);
        assert_eq!(p.side, Side::Buy);
    }
}
