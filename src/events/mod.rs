// src/events/mod.rs
//
// Internal Event System - Public API
//
// EventHandler is internal to the bus module and must not be exported

pub mod bus;
pub mod types;

pub use types::DomainEvent;

pub use types::{
    // Composite results
    BarcodeScanCompleted,
    HistoryCleared,
    // Product lookup
    ProductQueryCompleted,
    // Scan sessions
    ScanFailed,
    ScanStarted,
    ScanStopped,
    ScanSucceeded,
};

pub use bus::{EventBus, EventLogEntry};

/// Initialize a new event bus
pub fn create_event_bus() -> EventBus {
    EventBus::new()
}
