// src/services/native_backend.rs
//
// Native backend - device scanner service inside the mobile app shell
//
// FLOW:
// 1. Check permission (retried while the plugin bridge is still attaching)
// 2. Request it if not granted; denial opens OS settings without waiting
// 3. Full-screen, symbology-constrained scan
// 4. Coerce the reported format and resolve it (normalize, then infer)

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::config::RetryPolicy;
use crate::domain::{BackendKind, ScanError, ScanResult};
use crate::integrations::{NativeScanRequest, NativeScannerPlugin, PermissionState, PluginError};
use crate::services::retry::{retry_with_backoff, RetryError};
use crate::services::scan_backend::{live_result, lock, ScanBackend, SessionContext};

pub const PERMISSION_DENIED_MESSAGE: &str = "camera permission denied";

pub struct NativeBackend {
    plugin: Arc<dyn NativeScannerPlugin>,
    bridge_retry: RetryPolicy,
    /// Session whose `scan` call is currently pending in the plugin
    in_flight: Mutex<Option<u64>>,
}

impl NativeBackend {
    pub fn new(plugin: Arc<dyn NativeScannerPlugin>, bridge_retry: RetryPolicy) -> Self {
        Self {
            plugin,
            bridge_retry,
            in_flight: Mutex::new(None),
        }
    }

    async fn ensure_permission(&self, session: &SessionContext) -> Result<(), ScanError> {
        let permission = retry_with_backoff(
            &self.bridge_retry,
            &session.cancel,
            |e: &PluginError| matches!(e, PluginError::NotReady),
            |_| self.plugin.check_permissions(),
        )
        .await
        .map_err(|e| match e {
            RetryError::Cancelled => ScanError::cancelled("scan cancelled"),
            RetryError::Failed(e) => map_plugin_error(e),
        })?;

        if permission.is_granted() {
            return Ok(());
        }

        let permission = self
            .plugin
            .request_permissions()
            .await
            .map_err(map_plugin_error)?;

        if permission.is_granted() {
            return Ok(());
        }

        log::warn!("Camera permission not granted: {:?}", permission);

        if permission == PermissionState::Denied {
            // Deep-link to settings; the error path must not wait on it
            let plugin = Arc::clone(&self.plugin);
            tokio::spawn(async move {
                if let Err(e) = plugin.open_app_settings().await {
                    log::debug!("Failed to open app settings: {}", e);
                }
            });
        }

        Err(ScanError::permission_denied(PERMISSION_DENIED_MESSAGE))
    }

    fn clear_in_flight(&self, session_id: u64) -> bool {
        let mut in_flight = lock(&self.in_flight);
        if *in_flight == Some(session_id) {
            *in_flight = None;
            true
        } else {
            false
        }
    }
}

/// Plugins only signal user aborts through the message text
fn map_plugin_error(error: PluginError) -> ScanError {
    if error.is_cancellation() {
        ScanError::cancelled(error.to_string())
    } else {
        ScanError::scan_failed(error.to_string())
    }
}

#[async_trait]
impl ScanBackend for NativeBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Native
    }

    async fn acquire(&self, session: &SessionContext) -> Result<ScanResult, ScanError> {
        self.ensure_permission(session).await?;

        *lock(&self.in_flight) = Some(session.id);
        session.enter_scanning();

        let response = self.plugin.scan(NativeScanRequest::full_screen()).await;
        self.clear_in_flight(session.id);

        let response = response.map_err(map_plugin_error)?;
        let raw_format = response.raw_format();

        log::debug!("Native decode, reported format {}", raw_format);

        Ok(live_result(response.content, raw_format))
    }

    async fn release(&self, session_id: u64) {
        if !self.clear_in_flight(session_id) {
            return;
        }

        if let Err(e) = self.plugin.cancel().await {
            log::debug!("Native cancel failed: {}", e);
        }
    }

    async fn toggle_torch(&self) -> bool {
        log::debug!("Torch toggle is not supported by the native backend");
        false
    }

    fn torch_on(&self) -> bool {
        false
    }

    fn torch_available(&self) -> bool {
        false
    }
}
