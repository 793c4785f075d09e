// src/domain/mod.rs
//
// Domain Root - The Single Source of Truth for Domain API
//
// All other modules import from `crate::domain::*`

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod barcode_scan;
pub mod content;
pub mod format;
pub mod product;
pub mod scan;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Format classification
pub use format::{BarcodeCategory, BarcodeFormat, FormatInfo};

// Scan session
pub use scan::{validate_transition, BackendKind, ScanError, ScanErrorCode, ScanResult, SessionState};

// Product lookup
pub use product::{
    is_likely_product_barcode, is_valid_barcode, validate_barcode, NutritionInfo, ProductInfo,
    ProductQueryResult, ProductSource,
};

// Composite result + history
pub use barcode_scan::{BarcodeScanResult, ScanHistory, DEFAULT_HISTORY_CAPACITY};

// Content classification
pub use content::{is_url, is_web_url, parse_content_type, QrContentType};

// ============================================================================
// DOMAIN ERROR TYPES
// ============================================================================

use thiserror::Error;

/// Domain-level errors
/// These represent violations of business rules and invariants
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Invalid barcode: {0}")]
    InvalidBarcode(String),
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;
