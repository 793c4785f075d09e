// src/services/scan_backend.rs
//
// Acquisition backend contract
//
// The engine owns session bookkeeping (ids, state, cancellation); a backend
// only knows how to turn one session into one decode and how to release
// whatever it acquired for it.

use async_trait::async_trait;
use std::sync::{Arc, PoisonError};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::domain::format::classify;
use crate::domain::{validate_transition, BackendKind, ScanError, ScanResult, SessionState};

/// Per-session handle passed to a backend
#[derive(Clone)]
pub struct SessionContext {
    pub id: u64,
    pub cancel: CancellationToken,
    state: Arc<watch::Sender<SessionState>>,
}

impl SessionContext {
    pub(crate) fn new(
        id: u64,
        cancel: CancellationToken,
        state: Arc<watch::Sender<SessionState>>,
    ) -> Self {
        Self { id, cancel, state }
    }

    /// Permission granted / camera live
    pub fn enter_scanning(&self) {
        transition(&self.state, SessionState::Scanning);
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("id", &self.id)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

#[async_trait]
pub trait ScanBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Run a session until its first decode. The engine races this against
    /// `session.cancel`, so the future may be dropped at any await point.
    async fn acquire(&self, session: &SessionContext) -> Result<ScanResult, ScanError>;

    /// Release everything acquired for `session_id`. Idempotent; a stale id
    /// is a no-op.
    async fn release(&self, session_id: u64);

    /// Returns whether the toggle took effect
    async fn toggle_torch(&self) -> bool;

    fn torch_on(&self) -> bool;

    fn torch_available(&self) -> bool;
}

/// Two-pass symbology resolution shared by both live backends
pub(crate) fn live_result(content: String, raw_format: String) -> ScanResult {
    let format = classify(&raw_format, &content);
    ScanResult::new(content, raw_format, format)
}

/// Apply a state change if the lifecycle allows it
pub(crate) fn transition(state: &watch::Sender<SessionState>, to: SessionState) -> bool {
    state.send_if_modified(|current| {
        if *current == to {
            return false;
        }
        match validate_transition(*current, to) {
            Ok(()) => {
                log::debug!("Session state {:?} -> {:?}", current, to);
                *current = to;
                true
            }
            Err(e) => {
                log::warn!("Ignoring session state change: {}", e);
                false
            }
        }
    })
}

/// Lock helper for the std mutexes guarding backend bookkeeping
pub(crate) fn lock<T>(mutex: &std::sync::Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
