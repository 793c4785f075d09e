// src/services/browser_backend.rs
//
// Browser backend - camera frames decoded in the web view / desktop
//
// The media stream belongs to exactly one session. A successful decode
// releases it before the result is handed back; manual cancellation goes
// through `release`.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::domain::{BackendKind, ScanError, ScanResult};
use crate::integrations::{CameraConstraints, CameraDevice, CameraError, MediaStream};
use crate::services::scan_backend::{live_result, lock, ScanBackend, SessionContext};

pub const MISSING_MOUNT_TARGET_MESSAGE: &str = "scan container not found";
pub const STREAM_ENDED_MESSAGE: &str = "camera stream ended";

struct ActiveStream {
    session_id: u64,
    stream: Arc<dyn MediaStream>,
    torch_available: bool,
}

pub struct BrowserBackend {
    camera: Arc<dyn CameraDevice>,
    mount_target: Option<String>,
    constraints: CameraConstraints,
    active: Mutex<Option<ActiveStream>>,
    torch_on: AtomicBool,
}

impl BrowserBackend {
    pub fn new(
        camera: Arc<dyn CameraDevice>,
        mount_target: Option<String>,
        constraints: CameraConstraints,
    ) -> Self {
        Self {
            camera,
            mount_target,
            constraints,
            active: Mutex::new(None),
            torch_on: AtomicBool::new(false),
        }
    }

    fn active_stream(&self) -> Option<(Arc<dyn MediaStream>, bool)> {
        lock(&self.active)
            .as_ref()
            .map(|a| (Arc::clone(&a.stream), a.torch_available))
    }
}

fn map_camera_error(error: CameraError) -> ScanError {
    if error.is_permission_denied() {
        ScanError::permission_denied(error.to_string())
    } else {
        ScanError::scan_failed(error.to_string())
    }
}

#[async_trait]
impl ScanBackend for BrowserBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Browser
    }

    async fn acquire(&self, session: &SessionContext) -> Result<ScanResult, ScanError> {
        let target = self
            .mount_target
            .as_deref()
            .ok_or_else(|| ScanError::scan_failed(MISSING_MOUNT_TARGET_MESSAGE))?;

        let stream = self
            .camera
            .open(target, self.constraints.clone())
            .await
            .map_err(map_camera_error)?;

        // Torch support is probed once per session
        let torch_available = stream.capabilities().torch;
        log::debug!(
            "Camera open for session {} (torch available: {})",
            session.id,
            torch_available
        );

        *lock(&self.active) = Some(ActiveStream {
            session_id: session.id,
            stream: Arc::clone(&stream),
            torch_available,
        });
        self.torch_on.store(false, Ordering::SeqCst);
        session.enter_scanning();

        match stream.next_decode().await {
            Some(frame) => {
                let raw_format = frame.format_name.unwrap_or_else(|| "UNKNOWN".to_string());
                let result = live_result(frame.text, raw_format);

                self.release(session.id).await;
                Ok(result)
            }
            None => {
                self.release(session.id).await;
                Err(ScanError::scan_failed(STREAM_ENDED_MESSAGE))
            }
        }
    }

    async fn release(&self, session_id: u64) {
        let active = {
            let mut active = lock(&self.active);
            match active.as_ref() {
                Some(a) if a.session_id == session_id => active.take(),
                _ => None,
            }
        };

        let Some(active) = active else {
            return;
        };

        if self.torch_on.swap(false, Ordering::SeqCst) {
            if let Err(e) = active.stream.set_torch(false).await {
                log::debug!("Failed to turn torch off: {}", e);
            }
        }

        active.stream.stop().await;
        log::debug!("Camera released for session {}", session_id);
    }

    async fn toggle_torch(&self) -> bool {
        let Some((stream, torch_available)) = self.active_stream() else {
            log::debug!("Torch toggle ignored: no active camera session");
            return false;
        };

        if !torch_available {
            log::debug!("Torch toggle ignored: track has no torch");
            return false;
        }

        let next = !self.torch_on.load(Ordering::SeqCst);
        match stream.set_torch(next).await {
            Ok(()) => {
                self.torch_on.store(next, Ordering::SeqCst);
                true
            }
            Err(e) => {
                log::debug!("Torch toggle failed: {}", e);
                false
            }
        }
    }

    fn torch_on(&self) -> bool {
        self.torch_on.load(Ordering::SeqCst)
    }

    fn torch_available(&self) -> bool {
        lock(&self.active)
            .as_ref()
            .map(|a| a.torch_available)
            .unwrap_or(false)
    }
}
