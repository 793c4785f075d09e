// src/integrations/native/plugin.rs
//
// Device-native scanner service (mobile app shell plugin)
//
// The engine depends only on the success/failure shapes of these commands,
// never on their transport.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::BarcodeFormat;

/// Camera permission as reported by the OS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PermissionState {
    Granted,
    Denied,
    Prompt,
    PromptWithRationale,
}

impl PermissionState {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionState::Granted)
    }
}

/// Symbology-constrained scan request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NativeScanRequest {
    pub formats: Vec<BarcodeFormat>,
    /// Render the camera behind a transparent web view
    pub windowed: bool,
}

impl NativeScanRequest {
    /// Symbologies the native scanner is asked to look for
    pub const FORMATS: [BarcodeFormat; 10] = [
        BarcodeFormat::QrCode,
        BarcodeFormat::Ean13,
        BarcodeFormat::Ean8,
        BarcodeFormat::Code128,
        BarcodeFormat::Code39,
        BarcodeFormat::Code93,
        BarcodeFormat::Codabar,
        BarcodeFormat::DataMatrix,
        BarcodeFormat::Pdf417,
        BarcodeFormat::Aztec,
    ];

    pub fn full_screen() -> Self {
        Self {
            formats: Self::FORMATS.to_vec(),
            windowed: false,
        }
    }
}

/// Raw plugin answer. `format` arrives as a string, an object with a
/// `name` field, or some other JSON shape depending on the platform.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NativeScanResponse {
    pub content: String,
    #[serde(default)]
    pub format: serde_json::Value,
}

impl NativeScanResponse {
    pub fn new(content: impl Into<String>, format: serde_json::Value) -> Self {
        Self {
            content: content.into(),
            format,
        }
    }

    /// Coerce the reported format to a string for normalization
    pub fn raw_format(&self) -> String {
        use serde_json::Value;

        match &self.format {
            Value::Null => "UNKNOWN".to_string(),
            Value::String(s) => s.clone(),
            Value::Object(map) => match map.get("name").and_then(Value::as_str) {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => self.format.to_string(),
            },
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum PluginError {
    /// The native bridge has not attached yet; worth retrying
    #[error("native bridge not ready")]
    NotReady,

    #[error("unsupported on this platform")]
    Unsupported,

    #[error("{0}")]
    Failed(String),
}

impl PluginError {
    /// Plugins report user/system aborts only through the message text
    pub fn is_cancellation(&self) -> bool {
        match self {
            PluginError::Failed(message) => message.to_lowercase().contains("cancel"),
            _ => false,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NativeScannerPlugin: Send + Sync {
    async fn check_permissions(&self) -> Result<PermissionState, PluginError>;

    async fn request_permissions(&self) -> Result<PermissionState, PluginError>;

    async fn scan(&self, request: NativeScanRequest) -> Result<NativeScanResponse, PluginError>;

    /// Abort an in-flight `scan`; the pending call then fails with a
    /// cancellation message
    async fn cancel(&self) -> Result<(), PluginError>;

    async fn vibrate(&self) -> Result<(), PluginError>;

    async fn open_app_settings(&self) -> Result<(), PluginError>;
}
