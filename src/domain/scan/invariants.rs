use super::entity::SessionState;
use crate::domain::{DomainError, DomainResult};

/// Validates a session state transition.
///
/// Idle -> PermissionCheck -> (PermissionDenied | Scanning)
/// Scanning -> (Result | Cancelled | Error)
/// any terminal -> Idle
///
/// Cancellation and acquisition errors may also interrupt the permission
/// check, and any live state may be forced back to Idle by an explicit stop.
pub fn validate_transition(from: SessionState, to: SessionState) -> DomainResult<()> {
    use SessionState::*;

    let allowed = match (from, to) {
        (Idle, PermissionCheck) => true,
        (PermissionCheck, PermissionDenied | Scanning | Cancelled | Error) => true,
        (Scanning, Result | Cancelled | Error) => true,
        (PermissionCheck | Scanning, Idle) => true,
        (terminal, Idle) if terminal.is_terminal() => true,
        _ => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(DomainError::InvalidStateTransition(format!(
            "{:?} -> {:?}",
            from, to
        )))
    }
}
