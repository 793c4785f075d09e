// src/events/types.rs
//
// All scanner events in the system.
// Each event represents an immutable fact that has already occurred.
//
// RULES:
// - Events are facts, not commands
// - Events carry only the data needed to react

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{BackendKind, BarcodeFormat, ProductSource, ScanErrorCode};

/// Trait that all domain events must implement
pub trait DomainEvent: std::fmt::Debug + Clone {
    /// Unique identifier for this event instance
    fn event_id(&self) -> Uuid;

    /// When this event occurred
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Human-readable event type name
    fn event_type(&self) -> &'static str;
}

macro_rules! impl_domain_event {
    ($ty:ident) => {
        impl DomainEvent for $ty {
            fn event_id(&self) -> Uuid { self.event_id }
            fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
            fn event_type(&self) -> &'static str { stringify!($ty) }
        }
    };
}

// ============================================================================
// SCAN SESSION EVENTS
// ============================================================================

/// Emitted when a live session claims the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanStarted {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub session_id: u64,
    pub backend: BackendKind,
}

impl ScanStarted {
    pub fn new(session_id: u64, backend: BackendKind) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            session_id,
            backend,
        }
    }
}

impl_domain_event!(ScanStarted);

/// Emitted for every successful decode, live or still-image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSucceeded {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub backend: BackendKind,
    pub content: String,
    pub format: BarcodeFormat,
}

impl ScanSucceeded {
    pub fn new(backend: BackendKind, content: String, format: BarcodeFormat) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            backend,
            content,
            format,
        }
    }
}

impl_domain_event!(ScanSucceeded);

/// Emitted when a session or image decode ends in a tagged error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanFailed {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub backend: BackendKind,
    pub code: ScanErrorCode,
    pub message: String,
}

impl ScanFailed {
    pub fn new(backend: BackendKind, code: ScanErrorCode, message: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            backend,
            code,
            message,
        }
    }
}

impl_domain_event!(ScanFailed);

/// Emitted when a live session is stopped explicitly
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanStopped {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub session_id: u64,
    pub backend: BackendKind,
}

impl ScanStopped {
    pub fn new(session_id: u64, backend: BackendKind) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            session_id,
            backend,
        }
    }
}

impl_domain_event!(ScanStopped);

// ============================================================================
// PRODUCT + COMPOSITE EVENTS
// ============================================================================

/// Emitted after every lookup that reached the network stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductQueryCompleted {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub barcode: String,
    pub found: bool,
    pub source: ProductSource,
    pub error: Option<String>,
}

impl ProductQueryCompleted {
    pub fn new(barcode: String, found: bool, source: ProductSource, error: Option<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            barcode,
            found,
            source,
            error,
        }
    }
}

impl_domain_event!(ProductQueryCompleted);

/// Emitted once per composite result, when it enters history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarcodeScanCompleted {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub content: String,
    pub is_product_barcode: bool,
    pub product_found: bool,
    pub history_len: usize,
}

impl BarcodeScanCompleted {
    pub fn new(content: String, is_product_barcode: bool, product_found: bool, history_len: usize) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            content,
            is_product_barcode,
            product_found,
            history_len,
        }
    }
}

impl_domain_event!(BarcodeScanCompleted);

/// Emitted when history is emptied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryCleared {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub removed: usize,
}

impl HistoryCleared {
    pub fn new(removed: usize) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            removed,
        }
    }
}

impl_domain_event!(HistoryCleared);
