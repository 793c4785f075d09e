// src/config/mod.rs
//
// Scanner configuration
//
// Every field has a default, so an empty JSON object is a valid config.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{AppError, AppResult};

pub const DEFAULT_PRODUCT_ENDPOINTS: [&str; 2] = [
    "https://zh.openfoodfacts.org",
    "https://world.openfoodfacts.org",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Haptic pulse after each successful decode
    pub vibrate: bool,
    /// Synthesized tone after each successful decode
    pub sound: bool,
    /// Look up product metadata for retail codes
    pub auto_query_product: bool,
    pub max_history: usize,
    /// Bytes
    pub max_image_size: u64,
    pub vibrate_duration_ms: u64,
    /// Camera decode rate for the browser backend
    pub fps: u32,
    /// Scan box edge as a fraction of the smaller viewfinder side
    pub scan_box_ratio: f32,
    /// Element the browser backend renders the camera preview into
    pub mount_target: Option<String>,
    pub tone: ToneConfig,
    pub product: ProductQueryConfig,
    pub bridge_retry: RetryPolicy,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            vibrate: true,
            sound: true,
            auto_query_product: true,
            max_history: 20,
            max_image_size: 10 * 1024 * 1024,
            vibrate_duration_ms: 200,
            fps: 10,
            scan_box_ratio: 0.7,
            mount_target: None,
            tone: ToneConfig::default(),
            product: ProductQueryConfig::default(),
            bridge_retry: RetryPolicy::default(),
        }
    }
}

impl ScannerConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> AppResult<Self> {
        let config: ScannerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_mount_target(mut self, target: impl Into<String>) -> Self {
        self.mount_target = Some(target.into());
        self
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.max_history == 0 {
            return Err(AppError::Config("max_history must be at least 1".to_string()));
        }
        if self.product.endpoints.is_empty() {
            return Err(AppError::Config(
                "at least one product endpoint is required".to_string(),
            ));
        }
        if !(self.scan_box_ratio > 0.0 && self.scan_box_ratio <= 1.0) {
            return Err(AppError::Config(format!(
                "scan_box_ratio must be in (0, 1], got {}",
                self.scan_box_ratio
            )));
        }
        if !(0.0..=1.0).contains(&self.tone.volume) {
            return Err(AppError::Config(format!(
                "tone volume must be in [0, 1], got {}",
                self.tone.volume
            )));
        }
        Ok(())
    }

    pub fn vibrate_duration(&self) -> Duration {
        Duration::from_millis(self.vibrate_duration_ms)
    }

    /// Square scan box edge for a viewfinder of the given size
    pub fn scan_box_size(&self, viewfinder_width: u32, viewfinder_height: u32) -> u32 {
        let min_dimension = viewfinder_width.min(viewfinder_height) as f32;
        (min_dimension * self.scan_box_ratio).floor() as u32
    }
}

/// Success tone parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneConfig {
    pub frequency_hz: f32,
    pub duration_ms: u64,
    pub volume: f32,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 1800.0,
            duration_ms: 100,
            volume: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductQueryConfig {
    /// Mirror base URLs, tried in order
    pub endpoints: Vec<String>,
    /// Per-attempt bound
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for ProductQueryConfig {
    fn default() -> Self {
        Self {
            endpoints: DEFAULT_PRODUCT_ENDPOINTS.iter().map(|s| s.to_string()).collect(),
            timeout_ms: 10_000,
            user_agent: format!("ScanHub/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ProductQueryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Bounded exponential backoff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay_ms: 100,
            max_delay_ms: 2_000,
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// A policy that tries exactly once
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (1-based), capped at `max_delay_ms`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let millis = self.initial_delay_ms as f64 * self.multiplier.max(1.0).powi(exponent);
        Duration::from_millis(millis.min(self.max_delay_ms as f64) as u64)
    }
}
