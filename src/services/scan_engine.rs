// src/services/scan_engine.rs
//
// Scan Engine - one live session at a time over two backends
//
// CRITICAL RULES:
// - Backend is chosen per start_scan call, never cached
// - A second start_scan while a session is live fails immediately
// - stop_scan is idempotent and releases the backend before returning
// - Still-image decode never touches the live-session state machine
// - Every failure leaves here as a tagged ScanError

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::config::ScannerConfig;
use crate::domain::format::infer_from_content;
use crate::domain::{BackendKind, ScanError, ScanResult, SessionState};
use crate::events::{EventBus, ScanFailed, ScanStarted, ScanStopped, ScanSucceeded};
use crate::integrations::{
    CameraConstraints, CameraDevice, DecodeSurface, EnvironmentProbe, ImageDecoder, ImageInput,
    ImageSource, NativeScannerPlugin,
};
use crate::services::browser_backend::BrowserBackend;
use crate::services::feedback_service::FeedbackService;
use crate::services::native_backend::NativeBackend;
use crate::services::scan_backend::{lock, transition, ScanBackend, SessionContext};

pub const DESTROYED_MESSAGE: &str = "scanner destroyed";
pub const IN_PROGRESS_MESSAGE: &str = "scan in progress";
pub const CANCELLED_MESSAGE: &str = "scan cancelled";
pub const NATIVE_UNAVAILABLE_MESSAGE: &str = "native scanner unavailable";
pub const INVALID_FILE_TYPE_MESSAGE: &str = "invalid file type";
pub const FILE_TOO_LARGE_MESSAGE: &str = "file too large";
pub const NO_SYMBOL_MESSAGE: &str = "no barcode found in image";
pub const IMAGE_DECODE_FAILED_MESSAGE: &str = "image decode failed";
pub const NO_IMAGE_SOURCE_MESSAGE: &str = "no image source available";
pub const IMAGE_PICK_FAILED_MESSAGE: &str = "failed to pick image";
pub const IMAGE_PICK_CANCELLED_MESSAGE: &str = "image selection cancelled";

/// Everything the engine talks to but does not own
pub struct ScanEngineDeps {
    pub probe: Arc<dyn EnvironmentProbe>,
    /// Absent on hosts without the app shell
    pub native_plugin: Option<Arc<dyn NativeScannerPlugin>>,
    pub camera: Arc<dyn CameraDevice>,
    pub image_decoder: Arc<dyn ImageDecoder>,
    /// Used by `scan_from_image(None)`
    pub image_source: Option<Arc<dyn ImageSource>>,
    pub feedback: Arc<FeedbackService>,
    pub event_bus: Arc<EventBus>,
}

struct ActiveSession {
    id: u64,
    kind: BackendKind,
    cancel: CancellationToken,
}

pub struct ScanEngine {
    probe: Arc<dyn EnvironmentProbe>,
    native: Option<Arc<dyn ScanBackend>>,
    browser: Arc<dyn ScanBackend>,
    image_decoder: Arc<dyn ImageDecoder>,
    image_source: Option<Arc<dyn ImageSource>>,
    feedback: Arc<FeedbackService>,
    event_bus: Arc<EventBus>,
    max_image_size: u64,
    state: Arc<watch::Sender<SessionState>>,
    current: Mutex<Option<ActiveSession>>,
    next_session_id: AtomicU64,
    destroyed: AtomicBool,
    last_result: Mutex<Option<ScanResult>>,
}

impl ScanEngine {
    pub fn new(config: &ScannerConfig, deps: ScanEngineDeps) -> Self {
        let native = deps.native_plugin.clone().map(|plugin| {
            Arc::new(NativeBackend::new(plugin, config.bridge_retry.clone())) as Arc<dyn ScanBackend>
        });

        let browser: Arc<dyn ScanBackend> = Arc::new(BrowserBackend::new(
            Arc::clone(&deps.camera),
            config.mount_target.clone(),
            CameraConstraints::rear(config.fps, config.scan_box_ratio),
        ));

        Self::with_backends(config, deps, native, browser)
    }

    /// Engine over ready-made backends. `native_plugin` and `camera` in
    /// `deps` are unused here.
    pub(crate) fn with_backends(
        config: &ScannerConfig,
        deps: ScanEngineDeps,
        native: Option<Arc<dyn ScanBackend>>,
        browser: Arc<dyn ScanBackend>,
    ) -> Self {
        let ScanEngineDeps {
            probe,
            image_decoder,
            image_source,
            feedback,
            event_bus,
            ..
        } = deps;

        let (state, _) = watch::channel(SessionState::Idle);

        Self {
            probe,
            native,
            browser,
            image_decoder,
            image_source,
            feedback,
            event_bus,
            max_image_size: config.max_image_size,
            state: Arc::new(state),
            current: Mutex::new(None),
            next_session_id: AtomicU64::new(1),
            destroyed: AtomicBool::new(false),
            last_result: Mutex::new(None),
        }
    }

    // ========================================================================
    // LIVE SESSION
    // ========================================================================

    /// Run one live scan to its first decode
    pub async fn start_scan(&self) -> Result<ScanResult, ScanError> {
        if self.is_destroyed() {
            return Err(ScanError::scan_failed(DESTROYED_MESSAGE));
        }

        let backend = self.select_backend()?;
        let kind = backend.kind();
        let (id, cancel) = self.claim_session(kind)?;

        let mut guard = SessionGuard {
            engine: self,
            id,
            backend: Arc::clone(&backend),
            armed: true,
        };

        // A retained terminal state is left before the next session begins
        transition(&self.state, SessionState::Idle);
        transition(&self.state, SessionState::PermissionCheck);

        log::info!("Scan session {} started ({:?} backend)", id, kind);
        self.event_bus.emit(ScanStarted::new(id, kind));

        let context = SessionContext::new(id, cancel.clone(), Arc::clone(&self.state));

        let mut outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ScanError::cancelled(CANCELLED_MESSAGE)),
            outcome = backend.acquire(&context) => outcome,
        };

        // Settle ownership before the release await: a stop arriving during
        // release finds no session, and a stop that won the race owns the
        // outcome.
        if self.finish_session(id) {
            let terminal = match &outcome {
                Ok(_) => {
                    transition(&self.state, SessionState::Scanning);
                    SessionState::Result
                }
                Err(e) => SessionState::for_error(e),
            };
            transition(&self.state, terminal);
        } else if outcome.is_ok() {
            outcome = Err(ScanError::cancelled(CANCELLED_MESSAGE));
        }

        backend.release(id).await;
        guard.armed = false;

        self.report(kind, outcome).await
    }

    /// Stop the live session, if any. Safe to call at any time.
    pub async fn stop_scan(&self) {
        let session = lock(&self.current).take();

        match session {
            Some(session) => {
                session.cancel.cancel();
                self.backend_for(session.kind).release(session.id).await;
                transition(&self.state, SessionState::Idle);

                log::info!("Scan session {} stopped", session.id);
                self.event_bus.emit(ScanStopped::new(session.id, session.kind));
            }
            None => {
                transition(&self.state, SessionState::Idle);
            }
        }
    }

    /// Browser sessions only. Returns whether the torch changed.
    pub async fn toggle_torch(&self) -> bool {
        match self.current_kind() {
            Some(BackendKind::Browser) => self.browser.toggle_torch().await,
            _ => {
                log::debug!("Torch toggle ignored: no live browser session");
                false
            }
        }
    }

    /// Permanently disable the engine, stopping any live session
    pub async fn destroy(&self) {
        self.mark_destroyed();
        self.stop_scan().await;
    }

    /// Set under the session lock so no claim can slip in behind it
    pub(crate) fn mark_destroyed(&self) {
        let _current = lock(&self.current);
        if !self.destroyed.swap(true, Ordering::SeqCst) {
            log::info!("Scan engine destroyed");
        }
    }

    // ========================================================================
    // STILL IMAGE
    // ========================================================================

    /// One-shot decode of a still image. With `None`, the image source is
    /// asked for one.
    pub async fn scan_from_image(&self, input: Option<ImageInput>) -> Result<ScanResult, ScanError> {
        let outcome = self.decode_image(input).await;
        self.report(BackendKind::Image, outcome).await
    }

    async fn decode_image(&self, input: Option<ImageInput>) -> Result<ScanResult, ScanError> {
        let input = match input {
            Some(input) => input,
            None => self.pick_image().await?,
        };

        if !input.is_image() {
            return Err(ScanError::image(INVALID_FILE_TYPE_MESSAGE));
        }
        if input.size() > self.max_image_size {
            return Err(ScanError::image(FILE_TOO_LARGE_MESSAGE));
        }

        let surface = self.image_decoder.create_surface().map_err(|e| {
            log::warn!("Failed to create decode surface: {}", e);
            ScanError::image(IMAGE_DECODE_FAILED_MESSAGE)
        })?;
        let surface = SurfaceGuard(surface);

        let decoded = surface.0.decode(&input).await;
        drop(surface);

        let content = match decoded {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => return Err(ScanError::image(NO_SYMBOL_MESSAGE)),
            Err(e) if e.is_not_found() => return Err(ScanError::image(NO_SYMBOL_MESSAGE)),
            Err(e) => {
                log::warn!("Image decode failed: {}", e);
                return Err(ScanError::image(format!("{}: {}", IMAGE_DECODE_FAILED_MESSAGE, e)));
            }
        };

        // Still images carry no symbology name
        let format = infer_from_content(&content);
        Ok(ScanResult::new(content, format.as_str().to_string(), format))
    }

    async fn pick_image(&self) -> Result<ImageInput, ScanError> {
        let source = self
            .image_source
            .as_ref()
            .ok_or_else(|| ScanError::image(NO_IMAGE_SOURCE_MESSAGE))?;

        match source.acquire().await {
            Ok(Some(input)) => Ok(input),
            Ok(None) => Err(ScanError::cancelled(IMAGE_PICK_CANCELLED_MESSAGE)),
            Err(e) => {
                log::warn!("Image pick failed: {}", e);
                Err(ScanError::image(IMAGE_PICK_FAILED_MESSAGE))
            }
        }
    }

    // ========================================================================
    // OBSERVERS
    // ========================================================================

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// A live session is claimed (permission check or scanning)
    pub fn is_scanning(&self) -> bool {
        lock(&self.current).is_some()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    pub fn torch_on(&self) -> bool {
        self.current_kind() == Some(BackendKind::Browser) && self.browser.torch_on()
    }

    pub fn torch_available(&self) -> bool {
        self.current_kind() == Some(BackendKind::Browser) && self.browser.torch_available()
    }

    pub fn last_result(&self) -> Option<ScanResult> {
        lock(&self.last_result).clone()
    }

    // ========================================================================
    // INTERNAL
    // ========================================================================

    fn select_backend(&self) -> Result<Arc<dyn ScanBackend>, ScanError> {
        if !self.probe.is_native_mobile() {
            return Ok(Arc::clone(&self.browser));
        }

        self.native
            .as_ref()
            .map(Arc::clone)
            .ok_or_else(|| ScanError::scan_failed(NATIVE_UNAVAILABLE_MESSAGE))
    }

    fn backend_for(&self, kind: BackendKind) -> Arc<dyn ScanBackend> {
        match (kind, &self.native) {
            (BackendKind::Native, Some(native)) => Arc::clone(native),
            _ => Arc::clone(&self.browser),
        }
    }

    fn current_kind(&self) -> Option<BackendKind> {
        lock(&self.current).as_ref().map(|s| s.kind)
    }

    fn claim_session(&self, kind: BackendKind) -> Result<(u64, CancellationToken), ScanError> {
        let mut current = lock(&self.current);
        if self.is_destroyed() {
            return Err(ScanError::scan_failed(DESTROYED_MESSAGE));
        }
        if current.is_some() {
            return Err(ScanError::scan_failed(IN_PROGRESS_MESSAGE));
        }

        let id = self.next_session_id.fetch_add(1, Ordering::SeqCst);
        let cancel = CancellationToken::new();
        *current = Some(ActiveSession {
            id,
            kind,
            cancel: cancel.clone(),
        });

        Ok((id, cancel))
    }

    /// Drop the session if it is still the current one. False when a stop
    /// already took it.
    fn finish_session(&self, id: u64) -> bool {
        let mut current = lock(&self.current);
        match current.as_ref() {
            Some(session) if session.id == id => {
                *current = None;
                true
            }
            _ => false,
        }
    }

    async fn report(
        &self,
        backend: BackendKind,
        outcome: Result<ScanResult, ScanError>,
    ) -> Result<ScanResult, ScanError> {
        match &outcome {
            Ok(result) => {
                log::info!(
                    "Decoded {} via {:?} backend",
                    result.format_type,
                    backend
                );
                *lock(&self.last_result) = Some(result.clone());
                self.feedback.on_success().await;
                self.event_bus.emit(ScanSucceeded::new(
                    backend,
                    result.content.clone(),
                    result.format_type,
                ));
            }
            Err(e) => {
                if e.is_cancelled() {
                    log::debug!("Scan cancelled ({:?} backend)", backend);
                } else {
                    log::warn!("Scan failed ({:?} backend): {}", backend, e);
                }
                self.event_bus
                    .emit(ScanFailed::new(backend, e.code, e.message.clone()));
            }
        }

        outcome
    }
}

impl std::fmt::Debug for ScanEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanEngine")
            .field("state", &self.state())
            .field("scanning", &self.is_scanning())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

/// Run one scan, then dispose of the engine
pub async fn quick_scan(engine: ScanEngine) -> Result<ScanResult, ScanError> {
    let outcome = engine.start_scan().await;
    engine.destroy().await;
    outcome
}

/// Resets a session whose `start_scan` future was dropped mid-flight
struct SessionGuard<'a> {
    engine: &'a ScanEngine,
    id: u64,
    backend: Arc<dyn ScanBackend>,
    armed: bool,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let taken = {
            let mut current = lock(&self.engine.current);
            match current.as_ref() {
                Some(session) if session.id == self.id => current.take(),
                _ => None,
            }
        };

        if let Some(session) = taken {
            log::debug!("Scan session {} abandoned by caller", session.id);
            session.cancel.cancel();
            transition(&self.engine.state, SessionState::Idle);
        }

        // Release is idempotent, so it also runs when the session was already
        // settled. Without a runtime the backend is left to its own Drop
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let backend = Arc::clone(&self.backend);
            let id = self.id;
            handle.spawn(async move { backend.release(id).await });
        }
    }
}

/// Disposes a decode surface on every exit path
struct SurfaceGuard(Box<dyn DecodeSurface>);

impl Drop for SurfaceGuard {
    fn drop(&mut self) {
        self.0.dispose();
    }
}
