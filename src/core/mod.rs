// Core Module - Foundational types, fixed-point quantities, config, logging, events

pub mod types;
pub mod fixed_point;
pub mod config;
pub mod logger;
pub mod events;

// Re-export commonly used items for convenience
pub use types::*;
pub use fixed_point::{Qty, QtyScale};
pub use config::{
    ConfigError, ConfigManager, ConfigSummary, SignalConfig, WindowConfig, DEFAULT_EMA_ALPHA,
};
pub use logger::setup_logging;
pub use events::{SnapshotBus, SnapshotBusStatsSnapshot, SnapshotEvent, SnapshotReporter};
