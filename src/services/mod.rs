// src/services/mod.rs
//
// Services Module - Orchestration Layer

pub mod browser_backend;
pub mod feedback_service;
pub mod native_backend;
pub mod product_resolver;
pub mod retry;
pub mod scan_backend;
pub mod scan_engine;
pub mod scan_orchestrator;

#[cfg(test)]
pub(crate) mod testing;

#[cfg(test)]
mod product_resolver_tests;



// Re-export all services and their types
pub use scan_backend::{ScanBackend, SessionContext};

pub use browser_backend::BrowserBackend;

pub use native_backend::NativeBackend;

pub use feedback_service::FeedbackService;

pub use retry::{retry_with_backoff, RetryError};

pub use scan_engine::{quick_scan, ScanEngine, ScanEngineDeps};

pub use product_resolver::{ProductResolver, ResolverState};

pub use scan_orchestrator::{ScanOrchestrator, TrackedResult};
