// src/lib.rs
// ScanHub - Cross-platform barcode/QR scanning core
//
// Architecture:
// - Domain-centric: format classification, payload typing and product
//   validation are pure functions in `domain`
// - Event-driven: services announce scans and lookups through the EventBus
// - Explicit: one session at a time, every session ends in exactly one
//   terminal state
// - Collaborators (camera, native plugin, decoders, HTTP) are traits in
//   `integrations`; hosts provide the implementations
// - Application Layer: UI boundary (composition root + error responses)

// ============================================================================
// FOUNDATION
// ============================================================================

pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod integrations;
pub mod services;

// ============================================================================
// APPLICATION LAYER
// ============================================================================

pub mod application;

// ============================================================================
// PUBLIC API - Domain
// ============================================================================

pub use domain::{
    is_likely_product_barcode,
    is_url,
    is_valid_barcode,
    is_web_url,
    parse_content_type,
    validate_barcode,
    // Format classification
    BarcodeCategory,
    BarcodeFormat,
    // Composite result + history
    BarcodeScanResult,
    BackendKind,
    FormatInfo,
    // Product lookup
    NutritionInfo,
    ProductInfo,
    ProductQueryResult,
    ProductSource,
    // Content typing
    QrContentType,
    // Scan session
    ScanError,
    ScanErrorCode,
    ScanHistory,
    ScanResult,
    SessionState,
};

// ============================================================================
// PUBLIC API - Error Types & Config
// ============================================================================

pub use config::{ProductQueryConfig, RetryPolicy, ScannerConfig, ToneConfig};
pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Events
// ============================================================================

pub use events::{
    create_event_bus,
    BarcodeScanCompleted,
    DomainEvent,
    EventBus,
    EventLogEntry,
    HistoryCleared,
    ProductQueryCompleted,
    ScanFailed,
    ScanStarted,
    ScanStopped,
    ScanSucceeded,
};

// ============================================================================
// PUBLIC API - Services
// ============================================================================

pub use services::{
    quick_scan,
    FeedbackService,
    // Product lookup
    ProductResolver,
    ResolverState,
    // Scan engine
    ScanEngine,
    ScanEngineDeps,
    // Composition
    ScanOrchestrator,
    TrackedResult,
};

// ============================================================================
// PUBLIC API - Application Layer
// ============================================================================

pub use application::{AppState, Collaborators, ErrorResponse, ErrorType, ToErrorResponse};
