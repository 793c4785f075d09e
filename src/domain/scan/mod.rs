pub mod entity;
pub mod invariants;

pub use entity::{BackendKind, ScanError, ScanErrorCode, ScanResult, SessionState};
pub use invariants::validate_transition;
