use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::domain::format::{describe, BarcodeFormat, FormatInfo};

/// One successful decode. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    /// Decoded payload
    pub content: String,

    /// Symbology name exactly as the backend reported it
    pub raw_format: String,

    /// Normalized symbology, never absent (defaults to UNKNOWN)
    pub format_type: BarcodeFormat,

    pub format_info: FormatInfo,

    /// Unix epoch milliseconds
    pub timestamp: i64,
}

impl ScanResult {
    pub fn new(content: String, raw_format: String, format_type: BarcodeFormat) -> Self {
        Self {
            content,
            raw_format,
            format_type,
            format_info: describe(format_type),
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

/// Classification carried by every engine-level failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanErrorCode {
    /// Camera/scan permission unavailable; recoverable through OS settings
    PermissionDenied,
    /// Backend acquisition or decode failure; recoverable by retrying
    ScanError,
    /// User- or system-initiated abort
    Cancelled,
    /// Still-image decode failure
    ImageScanError,
    Unknown,
}

impl ScanErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanErrorCode::PermissionDenied => "PERMISSION_DENIED",
            ScanErrorCode::ScanError => "SCAN_ERROR",
            ScanErrorCode::Cancelled => "CANCELLED",
            ScanErrorCode::ImageScanError => "IMAGE_SCAN_ERROR",
            ScanErrorCode::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ScanErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tagged engine error. Callers branch on `code`, never on `message`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct ScanError {
    pub code: ScanErrorCode,
    pub message: String,
}

impl ScanError {
    pub fn new(code: ScanErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ScanErrorCode::PermissionDenied, message)
    }

    pub fn scan_failed(message: impl Into<String>) -> Self {
        Self::new(ScanErrorCode::ScanError, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ScanErrorCode::Cancelled, message)
    }

    pub fn image(message: impl Into<String>) -> Self {
        Self::new(ScanErrorCode::ImageScanError, message)
    }

    pub fn is_cancelled(&self) -> bool {
        self.code == ScanErrorCode::Cancelled
    }
}

/// Live scan session lifecycle.
///
/// `Idle` is both the initial state and the state reentered after any
/// terminal state or an explicit stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    PermissionCheck,
    Scanning,
    /// Terminal, success
    Result,
    /// Terminal, error
    PermissionDenied,
    /// Terminal, error
    Cancelled,
    /// Terminal, error
    Error,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Result
                | SessionState::PermissionDenied
                | SessionState::Cancelled
                | SessionState::Error
        )
    }

    /// Terminal state reached by a failed session
    pub fn for_error(error: &ScanError) -> Self {
        match error.code {
            ScanErrorCode::PermissionDenied => SessionState::PermissionDenied,
            ScanErrorCode::Cancelled => SessionState::Cancelled,
            _ => SessionState::Error,
        }
    }
}

/// Which acquisition engine ran a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Device-native scanner service inside the mobile app shell
    Native,
    /// Camera frames decoded in the web view / desktop
    Browser,
    /// One-shot still-image decode
    Image,
}
