// Configuration Management for the Trade Window
// Window sizing, fixed-point scales and signal heuristic coefficients

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use parking_lot::RwLock;
use thiserror::Error;
use tracing::{info, warn};

use crate::core::fixed_point::QtyScale;

/// Alpha used when a non-positive smoothing factor is supplied
pub const DEFAULT_EMA_ALPHA: f64 = 0.01;

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

// ============================================================================
// Configuration Structures
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub duration_ms: i64,
    pub capacity: usize,
    pub ema_alpha: f64,

    // Fixed-point scales
    pub price_decimals: u32,
    pub volume_decimals: u32,

    // Whether Unknown-side trades count toward trade count and volume sums
    pub count_unknown_side: bool,

    // Scratch buffers above this capacity are dropped instead of pooled
    pub pool_max_retained_capacity: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            duration_ms: 60_000,
            capacity: 4096,
            ema_alpha: DEFAULT_EMA_ALPHA,
            price_decimals: 4,
            volume_decimals: 8,
            count_unknown_side: true,
            pool_max_retained_capacity: 1 << 16,
        }
    }
}

impl WindowConfig {
    pub fn price_scale(&self) -> QtyScale {
        QtyScale::from_decimals(self.price_decimals)
    }

    pub fn volume_scale(&self) -> QtyScale {
        QtyScale::from_decimals(self.volume_decimals)
    }

    /// Smoothing factor clamped to (0, 1]; non-positive falls back to the default
    pub fn effective_ema_alpha(&self) -> f64 {
        if self.ema_alpha <= 0.0 || self.ema_alpha.is_nan() {
            DEFAULT_EMA_ALPHA
        } else {
            self.ema_alpha.min(1.0)
        }
    }
}

/// Coefficients of the heuristic signals layered on the window aggregates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    // Equilibrium zone
    pub equilibrium_alpha: f64,            // VWAP weight vs median
    pub equilibrium_beta: f64,             // Range fraction for band half-width

    // Momentum classification
    pub momentum_weak: f64,
    pub momentum_strong: f64,

    // Absorption / distribution
    pub absorption_min_volume_factor: f64,
    pub absorption_max_abs_return: f64,
    pub absorption_score_weak: f64,
    pub absorption_score_strong: f64,

    // Directional score normalization
    pub dir_scale: f64,                    // 0.05 => 5% move maps to +/-1
    pub momentum_scale: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            equilibrium_alpha: 0.7,
            equilibrium_beta: 0.15,
            momentum_weak: 0.001,
            momentum_strong: 0.005,
            absorption_min_volume_factor: 1.2,
            absorption_max_abs_return: 0.003,
            absorption_score_weak: 0.0001,
            absorption_score_strong: 0.0005,
            dir_scale: 0.05,
            momentum_scale: 0.1,
        }
    }
}

// ============================================================================
// Configuration Summary
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub duration_ms: i64,
    pub capacity: usize,
    pub ema_alpha: f64,
    pub price_decimals: u32,
    pub volume_decimals: u32,
}

// ============================================================================
// Configuration Manager
// ============================================================================

pub struct ConfigManager {
    window: Arc<RwLock<WindowConfig>>,
    signals: Arc<RwLock<SignalConfig>>,
}

impl ConfigManager {
    pub fn new(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut manager = Self {
            window: Arc::new(RwLock::new(WindowConfig::default())),
            signals: Arc::new(RwLock::new(SignalConfig::default())),
        };

        if let Some(path) = config_path {
            manager.load_from_file(path)?;
        }

        manager.load_from_env();

        info!("Configuration initialized");
        Ok(manager)
    }

    /// Load configuration from JSON file
    pub fn load_from_file(&mut self, config_path: &str) -> Result<(), ConfigError> {
        let path = Path::new(config_path);
        if !path.exists() {
            warn!(path = config_path, "Config file not found");
            return Ok(());
        }

        let content = fs::read_to_string(path)?;
        let config_data: HashMap<String, serde_json::Value> = serde_json::from_str(&content)?;

        if let Some(window_data) = config_data.get("window") {
            let window = serde_json::from_value::<WindowConfig>(window_data.clone())?;
            *self.window.write() = window;
        }

        if let Some(signal_data) = config_data.get("signals") {
            let signals = serde_json::from_value::<SignalConfig>(signal_data.clone())?;
            *self.signals.write() = signals;
        }

        info!(path = config_path, "Configuration loaded");
        Ok(())
    }

    /// Apply TRADE_WINDOW_* environment overrides; unparsable values are ignored
    pub fn load_from_env(&mut self) {
        if let Some(duration_ms) = env_parse::<i64>("TRADE_WINDOW_DURATION_MS") {
            self.window.write().duration_ms = duration_ms;
        }
        if let Some(capacity) = env_parse::<usize>("TRADE_WINDOW_CAPACITY") {
            self.window.write().capacity = capacity;
        }
        if let Some(alpha) = env_parse::<f64>("TRADE_WINDOW_EMA_ALPHA") {
            self.window.write().ema_alpha = alpha;
        }
    }

    /// Save configuration to JSON file
    pub fn save_to_file(&self, config_path: &str) -> Result<(), ConfigError> {
        let mut config_map = HashMap::new();
        config_map.insert("window", serde_json::to_value(&*self.window.read())?);
        config_map.insert("signals", serde_json::to_value(&*self.signals.read())?);

        if let Some(parent) = Path::new(config_path).parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&config_map)?;
        fs::write(config_path, json)?;

        info!(path = config_path, "Configuration saved");
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<bool, ConfigError> {
        let mut errors = Vec::new();
        let window = self.window.read();
        let signals = self.signals.read();

        if window.duration_ms <= 0 {
            errors.push("duration_ms must be positive".to_string());
        }
        if window.capacity == 0 {
            errors.push("capacity must be at least 1".to_string());
        }
        if !(window.ema_alpha > 0.0 && window.ema_alpha <= 1.0) {
            errors.push("ema_alpha must be in (0, 1]".to_string());
        }
        if !(0.0..=1.0).contains(&signals.equilibrium_alpha) {
            errors.push("equilibrium_alpha must be between 0 and 1".to_string());
        }
        if signals.momentum_weak > signals.momentum_strong {
            errors.push("momentum_weak must not exceed momentum_strong".to_string());
        }
        if signals.absorption_score_weak > signals.absorption_score_strong {
            errors.push("absorption_score_weak must not exceed absorption_score_strong".to_string());
        }
        if signals.absorption_max_abs_return <= 0.0 {
            errors.push("absorption_max_abs_return must be positive".to_string());
        }
        if signals.dir_scale <= 1e-6 || signals.momentum_scale <= 1e-6 {
            errors.push("dir_scale and momentum_scale must be positive".to_string());
        }

        if !errors.is_empty() {
            for error in &errors {
                warn!(error = %error, "Config validation error");
            }
            return Ok(false);
        }

        info!("Configuration validated successfully");
        Ok(true)
    }

    pub fn get_summary(&self) -> ConfigSummary {
        let window = self.window.read();
        ConfigSummary {
            duration_ms: window.duration_ms,
            capacity: window.capacity,
            ema_alpha: window.ema_alpha,
            price_decimals: window.price_decimals,
            volume_decimals: window.volume_decimals,
        }
    }

    pub fn window(&self) -> WindowConfig {
        self.window.read().clone()
    }

    pub fn signals(&self) -> SignalConfig {
        self.signals.read().clone()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key = key, value = %raw, "Ignoring unparsable environment override");
            None
        }
    }
}
