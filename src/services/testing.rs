// src/services/testing.rs
//
// Hand-written fakes for collaborators that suspend for a long time
// (a native scan waiting on the user, a camera waiting for a frame).
// Request/response collaborators use the mockall mocks instead.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, Weak};
use std::time::Duration;
use tokio::sync::{mpsc, Notify};

use crate::config::{ProductQueryConfig, RetryPolicy, ScannerConfig};
use crate::domain::{BackendKind, ScanError, ScanResult};
use crate::error::{AppError, AppResult};
use crate::events::EventBus;
use crate::integrations::{
    CameraConstraints, CameraDevice, CameraError, DecodeError, DecodeSurface, EnvironmentProbe,
    FrameDecode, ImageDecoder, ImageInput, JsonFetcher, MediaStream, NativeScanRequest,
    NativeScanResponse, NativeScannerPlugin, NoopFeedback, PermissionState, PluginError,
    TrackCapabilities,
};
use crate::services::feedback_service::FeedbackService;
use crate::services::product_resolver::ProductResolver;
use crate::services::scan_backend::{live_result, ScanBackend, SessionContext};
use crate::services::scan_engine::{ScanEngine, ScanEngineDeps};

// ============================================================================
// ENVIRONMENT
// ============================================================================

/// Probe whose answer can change between calls
#[derive(Default)]
pub struct SwitchableProbe {
    native: AtomicBool,
}

impl SwitchableProbe {
    pub fn new(native: bool) -> Self {
        Self {
            native: AtomicBool::new(native),
        }
    }

    pub fn set_native(&self, native: bool) {
        self.native.store(native, Ordering::SeqCst);
    }
}

impl EnvironmentProbe for SwitchableProbe {
    fn is_native_mobile(&self) -> bool {
        self.native.load(Ordering::SeqCst)
    }
}

/// Destroys the engine from inside backend selection, after start_scan's
/// entry check and before its session claim
#[derive(Default)]
pub struct DestroyOnSelectProbe {
    engine: OnceLock<Weak<ScanEngine>>,
}

impl DestroyOnSelectProbe {
    pub fn attach(&self, engine: &Arc<ScanEngine>) {
        let _ = self.engine.set(Arc::downgrade(engine));
    }
}

impl EnvironmentProbe for DestroyOnSelectProbe {
    fn is_native_mobile(&self) -> bool {
        if let Some(engine) = self.engine.get().and_then(Weak::upgrade) {
            engine.mark_destroyed();
        }
        false
    }
}

// ============================================================================
// NATIVE PLUGIN
// ============================================================================

/// `scan` blocks until the test pushes a response or `cancel` is called
pub struct FakeNativePlugin {
    permission: Mutex<PermissionState>,
    responses_tx: mpsc::UnboundedSender<Result<NativeScanResponse, PluginError>>,
    responses_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<Result<NativeScanResponse, PluginError>>>,
    cancelled: Notify,
    pub scan_calls: AtomicUsize,
    pub cancel_calls: AtomicUsize,
    pub permission_checks: AtomicUsize,
}

impl FakeNativePlugin {
    pub fn new(permission: PermissionState) -> Self {
        let (responses_tx, responses_rx) = mpsc::unbounded_channel();
        Self {
            permission: Mutex::new(permission),
            responses_tx,
            responses_rx: tokio::sync::Mutex::new(responses_rx),
            cancelled: Notify::new(),
            scan_calls: AtomicUsize::new(0),
            cancel_calls: AtomicUsize::new(0),
            permission_checks: AtomicUsize::new(0),
        }
    }

    pub fn granted() -> Self {
        Self::new(PermissionState::Granted)
    }

    pub fn respond(&self, content: &str, format: Value) {
        let _ = self
            .responses_tx
            .send(Ok(NativeScanResponse::new(content, format)));
    }

    pub fn fail(&self, error: PluginError) {
        let _ = self.responses_tx.send(Err(error));
    }
}

#[async_trait]
impl NativeScannerPlugin for FakeNativePlugin {
    async fn check_permissions(&self) -> Result<PermissionState, PluginError> {
        self.permission_checks.fetch_add(1, Ordering::SeqCst);
        Ok(*self.permission.lock().unwrap())
    }

    async fn request_permissions(&self) -> Result<PermissionState, PluginError> {
        Ok(*self.permission.lock().unwrap())
    }

    async fn scan(&self, _request: NativeScanRequest) -> Result<NativeScanResponse, PluginError> {
        self.scan_calls.fetch_add(1, Ordering::SeqCst);
        let mut responses = self.responses_rx.lock().await;

        tokio::select! {
            response = responses.recv() => {
                response.unwrap_or_else(|| Err(PluginError::Failed("plugin closed".into())))
            }
            _ = self.cancelled.notified() => Err(PluginError::Failed("User cancelled the scan".into())),
        }
    }

    async fn cancel(&self) -> Result<(), PluginError> {
        self.cancel_calls.fetch_add(1, Ordering::SeqCst);
        self.cancelled.notify_waiters();
        Ok(())
    }

    async fn vibrate(&self) -> Result<(), PluginError> {
        Ok(())
    }

    async fn open_app_settings(&self) -> Result<(), PluginError> {
        Ok(())
    }
}

// ============================================================================
// CAMERA
// ============================================================================

/// Stream fed frame by frame from the test
pub struct FakeStream {
    frames_tx: mpsc::UnboundedSender<FrameDecode>,
    frames_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<FrameDecode>>,
    stop_signal: Notify,
    torch_capable: bool,
    pub stopped: AtomicBool,
    pub stop_calls: AtomicUsize,
    pub torch_states: Mutex<Vec<bool>>,
}

impl FakeStream {
    pub fn new(torch_capable: bool) -> Self {
        let (frames_tx, frames_rx) = mpsc::unbounded_channel();
        Self {
            frames_tx,
            frames_rx: tokio::sync::Mutex::new(frames_rx),
            stop_signal: Notify::new(),
            torch_capable,
            stopped: AtomicBool::new(false),
            stop_calls: AtomicUsize::new(0),
            torch_states: Mutex::new(Vec::new()),
        }
    }

    pub fn push_frame(&self, text: &str, format_name: Option<&str>) {
        let _ = self.frames_tx.send(FrameDecode {
            text: text.to_string(),
            format_name: format_name.map(str::to_string),
        });
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaStream for FakeStream {
    async fn next_decode(&self) -> Option<FrameDecode> {
        if self.is_stopped() {
            return None;
        }
        let mut frames = self.frames_rx.lock().await;

        tokio::select! {
            frame = frames.recv() => frame,
            _ = self.stop_signal.notified() => None,
        }
    }

    fn capabilities(&self) -> TrackCapabilities {
        TrackCapabilities {
            torch: self.torch_capable,
        }
    }

    async fn set_torch(&self, on: bool) -> Result<(), CameraError> {
        self.torch_states.lock().unwrap().push(on);
        Ok(())
    }

    async fn stop(&self) {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.stopped.store(true, Ordering::SeqCst);
        self.stop_signal.notify_waiters();
    }
}

/// Hands out one pre-built stream, or a scripted open error
pub struct FakeCamera {
    pub stream: Arc<FakeStream>,
    open_error: Mutex<Option<CameraError>>,
    pub opens: AtomicUsize,
    pub last_target: Mutex<Option<String>>,
    pub last_constraints: Mutex<Option<CameraConstraints>>,
}

impl FakeCamera {
    pub fn new(torch_capable: bool) -> Self {
        Self {
            stream: Arc::new(FakeStream::new(torch_capable)),
            open_error: Mutex::new(None),
            opens: AtomicUsize::new(0),
            last_target: Mutex::new(None),
            last_constraints: Mutex::new(None),
        }
    }

    pub fn failing(error: CameraError) -> Self {
        let camera = Self::new(false);
        *camera.open_error.lock().unwrap() = Some(error);
        camera
    }
}

#[async_trait]
impl CameraDevice for FakeCamera {
    async fn open(
        &self,
        mount_target: &str,
        constraints: CameraConstraints,
    ) -> Result<Arc<dyn MediaStream>, CameraError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        *self.last_target.lock().unwrap() = Some(mount_target.to_string());
        *self.last_constraints.lock().unwrap() = Some(constraints);

        if let Some(error) = self.open_error.lock().unwrap().clone() {
            return Err(error);
        }

        Ok(Arc::clone(&self.stream) as Arc<dyn MediaStream>)
    }
}

// ============================================================================
// IMAGE DECODING
// ============================================================================

/// Decoder with a fixed answer that counts surface lifecycles
pub struct FakeDecoder {
    outcome: Result<String, DecodeError>,
    pub created: Arc<AtomicUsize>,
    pub disposed: Arc<AtomicUsize>,
}

impl FakeDecoder {
    pub fn returning(outcome: Result<String, DecodeError>) -> Self {
        Self {
            outcome,
            created: Arc::new(AtomicUsize::new(0)),
            disposed: Arc::new(AtomicUsize::new(0)),
        }
    }
}

struct FakeSurface {
    outcome: Result<String, DecodeError>,
    disposed: Arc<AtomicUsize>,
}

#[async_trait]
impl DecodeSurface for FakeSurface {
    async fn decode(&self, _image: &ImageInput) -> Result<String, DecodeError> {
        self.outcome.clone()
    }

    fn dispose(&self) {
        self.disposed.fetch_add(1, Ordering::SeqCst);
    }
}

impl ImageDecoder for FakeDecoder {
    fn create_surface(&self) -> Result<Box<dyn DecodeSurface>, DecodeError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSurface {
            outcome: self.outcome.clone(),
            disposed: Arc::clone(&self.disposed),
        }))
    }
}

pub fn png(bytes: usize) -> ImageInput {
    ImageInput::new(vec![0u8; bytes], "image/png")
}

// ============================================================================
// HTTP
// ============================================================================

/// Scripted per-URL answers; records every URL requested
#[derive(Default)]
pub struct FakeFetcher {
    answers: Mutex<VecDeque<(String, FetchAnswer)>>,
    pub requested: Mutex<Vec<String>>,
}

pub enum FetchAnswer {
    Json(Value),
    Error(AppError),
    Hang,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the next request whose URL contains `url_part`
    pub fn answer(self, url_part: &str, answer: FetchAnswer) -> Self {
        self.answers
            .lock()
            .unwrap()
            .push_back((url_part.to_string(), answer));
        self
    }

    pub fn request_count(&self) -> usize {
        self.requested.lock().unwrap().len()
    }
}

#[async_trait]
impl JsonFetcher for FakeFetcher {
    async fn get_json(&self, url: &str) -> AppResult<Value> {
        self.requested.lock().unwrap().push(url.to_string());

        let answer = {
            let mut answers = self.answers.lock().unwrap();
            let position = answers.iter().position(|(part, _)| url.contains(part.as_str()));
            position.and_then(|i| answers.remove(i)).map(|(_, a)| a)
        };

        match answer {
            Some(FetchAnswer::Json(body)) => Ok(body),
            Some(FetchAnswer::Error(e)) => Err(e),
            Some(FetchAnswer::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(AppError::Other("hang elapsed".into()))
            }
            None => Err(AppError::Http("HTTP 404".into())),
        }
    }
}

// ============================================================================
// WIRING
// ============================================================================

pub fn test_config() -> ScannerConfig {
    ScannerConfig {
        mount_target: Some("scanner-view".to_string()),
        bridge_retry: RetryPolicy {
            max_attempts: 3,
            initial_delay_ms: 1,
            max_delay_ms: 1,
            multiplier: 1.0,
        },
        product: ProductQueryConfig {
            timeout_ms: 200,
            ..ProductQueryConfig::default()
        },
        ..ScannerConfig::default()
    }
}

/// Engine over fakes; feedback channels are no-ops
pub struct EngineHarness {
    pub engine: Arc<ScanEngine>,
    pub probe: Arc<SwitchableProbe>,
    pub plugin: Arc<FakeNativePlugin>,
    pub camera: Arc<FakeCamera>,
    pub decoder: Arc<FakeDecoder>,
    pub event_bus: Arc<EventBus>,
}

impl EngineHarness {
    pub fn browser(camera: FakeCamera) -> Self {
        Self::build(test_config(), false, camera, FakeDecoder::returning(Err(DecodeError::NotFound)))
    }

    pub fn native(plugin: FakeNativePlugin) -> Self {
        Self::with_plugin(test_config(), true, plugin, FakeCamera::new(false), FakeDecoder::returning(Err(DecodeError::NotFound)))
    }

    pub fn with_decoder(decoder: FakeDecoder) -> Self {
        Self::build(test_config(), false, FakeCamera::new(false), decoder)
    }

    pub fn build(
        config: ScannerConfig,
        native: bool,
        camera: FakeCamera,
        decoder: FakeDecoder,
    ) -> Self {
        Self::with_plugin(config, native, FakeNativePlugin::granted(), camera, decoder)
    }

    pub fn with_plugin(
        config: ScannerConfig,
        native: bool,
        plugin: FakeNativePlugin,
        camera: FakeCamera,
        decoder: FakeDecoder,
    ) -> Self {
        let probe = Arc::new(SwitchableProbe::new(native));
        let plugin = Arc::new(plugin);
        let camera = Arc::new(camera);
        let decoder = Arc::new(decoder);
        let event_bus = Arc::new(EventBus::new());

        let feedback = Arc::new(FeedbackService::new(
            &config,
            Arc::new(NoopFeedback),
            Arc::new(NoopFeedback),
            Some(plugin.clone() as Arc<dyn NativeScannerPlugin>),
            probe.clone(),
        ));

        let engine = ScanEngine::new(
            &config,
            ScanEngineDeps {
                probe: probe.clone(),
                native_plugin: Some(plugin.clone()),
                camera: camera.clone(),
                image_decoder: decoder.clone(),
                image_source: None,
                feedback,
                event_bus: event_bus.clone(),
            },
        );

        Self {
            engine: Arc::new(engine),
            probe,
            plugin,
            camera,
            decoder,
            event_bus,
        }
    }
}

/// Backend that decodes `content` at once and holds its first `release`
/// until `open_release` is called
pub struct GatedBackend {
    content: String,
    release_gate: Notify,
    pub acquires: AtomicUsize,
    pub releases_entered: AtomicUsize,
}

impl GatedBackend {
    pub fn new(content: &str) -> Self {
        Self {
            content: content.to_string(),
            release_gate: Notify::new(),
            acquires: AtomicUsize::new(0),
            releases_entered: AtomicUsize::new(0),
        }
    }

    pub fn open_release(&self) {
        self.release_gate.notify_one();
    }
}

#[async_trait]
impl ScanBackend for GatedBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Browser
    }

    async fn acquire(&self, session: &SessionContext) -> Result<ScanResult, ScanError> {
        self.acquires.fetch_add(1, Ordering::SeqCst);
        session.enter_scanning();
        Ok(live_result(self.content.clone(), "QR_CODE".to_string()))
    }

    async fn release(&self, _session_id: u64) {
        if self.releases_entered.fetch_add(1, Ordering::SeqCst) == 0 {
            self.release_gate.notified().await;
        }
    }

    async fn toggle_torch(&self) -> bool {
        false
    }

    fn torch_on(&self) -> bool {
        false
    }

    fn torch_available(&self) -> bool {
        false
    }
}

/// Engine whose browser slot is `backend`, selected through `probe`
pub fn engine_over(
    probe: Arc<dyn EnvironmentProbe>,
    backend: Arc<dyn ScanBackend>,
) -> (Arc<ScanEngine>, Arc<EventBus>) {
    let config = test_config();
    let event_bus = Arc::new(EventBus::new());
    let feedback = Arc::new(FeedbackService::new(
        &config,
        Arc::new(NoopFeedback),
        Arc::new(NoopFeedback),
        None,
        Arc::clone(&probe),
    ));

    let engine = ScanEngine::with_backends(
        &config,
        ScanEngineDeps {
            probe,
            native_plugin: None,
            camera: Arc::new(FakeCamera::new(false)),
            image_decoder: Arc::new(FakeDecoder::returning(Err(DecodeError::NotFound))),
            image_source: None,
            feedback,
            event_bus: Arc::clone(&event_bus),
        },
        None,
        backend,
    );

    (Arc::new(engine), event_bus)
}

pub fn resolver_with(fetcher: Arc<dyn JsonFetcher>, event_bus: Arc<EventBus>) -> ProductResolver {
    ProductResolver::new(fetcher, &test_config().product, event_bus)
}

/// Yield until `condition` holds, bounded so a broken test fails instead of hanging
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(tokio::time::Instant::now() < deadline, "condition not reached in time");
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}
