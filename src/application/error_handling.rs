// src/application/error_handling.rs
//
// Error Handling for the UI boundary
//
// ARCHITECTURE:
// - Maps ScanError / AppError → user-facing responses
// - Provides consistent error format for UI
// - Permission problems carry a settings deep-link affordance
// - Cancellation is not an error state for UI purposes (silent)
// - Logs errors for debugging

use serde::{Deserialize, Serialize};

use crate::domain::{ScanError, ScanErrorCode};
use crate::error::AppError;
use crate::services::scan_engine::NO_SYMBOL_MESSAGE;

/// Standard error response for UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error_type: ErrorType,
    pub message: String,
    pub details: Option<String>,
    /// Offer a shortcut to the OS app settings
    pub open_settings: bool,
    /// Nothing to show the user (e.g. they cancelled)
    pub silent: bool,
}

/// Error categories for UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Camera permission unavailable
    PermissionDenied,

    /// Live scan acquisition / decode failure (retryable)
    Scan,

    /// User or system abort
    Cancelled,

    /// Still-image decode failure
    ImageScan,

    /// Invalid input/validation error
    Validation,

    /// Domain invariant violation
    DomainError,

    /// External service error (HTTP)
    ExternalService,

    /// External service did not answer in time
    Timeout,

    /// File system error
    FileSystem,

    /// Invalid configuration
    Configuration,

    /// Other/unknown error
    Internal,
}

impl ErrorResponse {
    fn new(error_type: ErrorType, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            success: false,
            error_type,
            message: message.into(),
            details,
            open_settings: false,
            silent: false,
        }
    }

    /// Create error response from a tagged scan error
    pub fn from_scan_error(error: ScanError) -> Self {
        match error.code {
            ScanErrorCode::PermissionDenied => Self {
                open_settings: true,
                ..Self::new(
                    ErrorType::PermissionDenied,
                    "Camera permission is required. Enable it in Settings.",
                    Some(error.message),
                )
            },

            ScanErrorCode::Cancelled => Self {
                silent: true,
                ..Self::new(ErrorType::Cancelled, "Scan cancelled", None)
            },

            ScanErrorCode::ImageScanError => {
                let message = if error.message == NO_SYMBOL_MESSAGE {
                    "No QR code or barcode found in the image"
                } else {
                    "Could not read the image"
                };
                Self::new(ErrorType::ImageScan, message, Some(error.message))
            }

            ScanErrorCode::ScanError => {
                log::warn!("Scan error: {}", error.message);
                Self::new(ErrorType::Scan, "Scan failed, please try again", Some(error.message))
            }

            ScanErrorCode::Unknown => {
                log::error!("Unclassified scan error: {}", error.message);
                Self::new(ErrorType::Internal, "Scan failed", Some(error.message))
            }
        }
    }

    /// Create error response from AppError
    pub fn from_app_error(error: AppError) -> Self {
        match error {
            AppError::Domain(domain_error) => Self::new(
                ErrorType::DomainError,
                "Domain validation failed",
                Some(domain_error.to_string()),
            ),

            AppError::Http(message) => {
                log::warn!("External service error: {}", message);
                Self::new(ErrorType::ExternalService, "External service error", Some(message))
            }

            AppError::Timeout => Self::new(ErrorType::Timeout, "Request timed out", None),

            AppError::Serialization(serde_error) => {
                log::error!("Serialization error: {:?}", serde_error);
                Self::new(ErrorType::Internal, "Data serialization failed", None)
            }

            AppError::Io(io_error) => {
                log::error!("IO error: {:?}", io_error);
                Self::new(
                    ErrorType::FileSystem,
                    "File system operation failed",
                    Some(io_error.to_string()),
                )
            }

            AppError::Config(message) => {
                Self::new(ErrorType::Configuration, "Invalid configuration", Some(message))
            }

            AppError::Other(message) => {
                log::error!("Other error: {}", message);
                Self::new(ErrorType::Internal, message, None)
            }
        }
    }

    /// Create validation error
    pub fn validation(message: String) -> Self {
        Self::new(ErrorType::Validation, message, None)
    }
}

impl From<ScanError> for ErrorResponse {
    fn from(error: ScanError) -> Self {
        Self::from_scan_error(error)
    }
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self::from_app_error(error)
    }
}

/// Helper trait to convert Results to a serialized ErrorResponse
pub trait ToErrorResponse<T> {
    fn to_error_response(self) -> Result<T, String>;
}

impl<T, E> ToErrorResponse<T> for Result<T, E>
where
    E: Into<ErrorResponse>,
{
    fn to_error_response(self) -> Result<T, String> {
        self.map_err(|e| {
            let error_response: ErrorResponse = e.into();
            serde_json::to_string(&error_response)
                .unwrap_or_else(|_| "Internal error".to_string())
        })
    }
}
