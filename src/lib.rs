// Trade Window - Bounded, time-expiring trade store with streaming market statistics
//
//   core      → types, fixed-point quantities, config, logging, snapshot events
//   window    → ring store, incremental aggregates, EMA baseline, scratch buffer pool
//   analytics → VWAP, median, momentum, volatility, equilibrium, breakout, absorption, snapshot

pub mod core;
pub mod window;
pub mod analytics;

pub use crate::core::{
    setup_logging, AdKind, ConfigError, ConfigManager, MomentumLevel, Qty, QtyScale, Side,
    SignalConfig, SnapshotBus, SnapshotEvent, SnapshotReporter, TradePoint, WindowConfig,
};
pub use crate::window::{SlidingWindow, WindowStats};
pub use crate::analytics::{
    AbsorptionSignal, BreakoutStrength, EquilibriumZone, MomentumSignal, ScoreError, SignalSet,
    Snapshot,
};
