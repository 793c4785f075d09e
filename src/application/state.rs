// src/application/state.rs
//
// Composition root: one config + the host's collaborators in, a wired
// scanner stack out.

use std::sync::Arc;

use crate::config::ScannerConfig;
use crate::error::AppResult;
use crate::events::EventBus;
use crate::integrations::{
    CameraDevice, EnvironmentProbe, FileImageSource, Haptics, ImageDecoder, ImagePicker,
    ImageSource, JsonFetcher, NativeScannerPlugin, OpenFoodFactsClient, ToneGenerator,
};
use crate::services::{
    FeedbackService, ProductResolver, ScanEngine, ScanEngineDeps, ScanOrchestrator,
};

/// Host-provided collaborators
pub struct Collaborators {
    pub probe: Arc<dyn EnvironmentProbe>,
    pub native_plugin: Option<Arc<dyn NativeScannerPlugin>>,
    pub camera: Arc<dyn CameraDevice>,
    pub image_decoder: Arc<dyn ImageDecoder>,
    pub image_picker: Option<Arc<dyn ImagePicker>>,
    pub haptics: Arc<dyn Haptics>,
    pub tone_generator: Arc<dyn ToneGenerator>,
    /// Defaults to the Open Food Facts HTTP client
    pub fetcher: Option<Arc<dyn JsonFetcher>>,
}

/// Application state shared with the UI layer.
/// All fields are Arc-wrapped for thread-safe sharing.
pub struct AppState {
    pub config: Arc<ScannerConfig>,
    pub event_bus: Arc<EventBus>,
    pub engine: Arc<ScanEngine>,
    pub resolver: Arc<ProductResolver>,
    pub orchestrator: Arc<ScanOrchestrator>,
}

impl AppState {
    pub fn new(config: ScannerConfig, collaborators: Collaborators) -> AppResult<Self> {
        config.validate()?;

        let event_bus = Arc::new(EventBus::new());

        let fetcher: Arc<dyn JsonFetcher> = match collaborators.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(OpenFoodFactsClient::new(&config.product)?),
        };

        let feedback = Arc::new(FeedbackService::new(
            &config,
            collaborators.haptics,
            collaborators.tone_generator,
            collaborators.native_plugin.clone(),
            Arc::clone(&collaborators.probe),
        ));

        let image_source = collaborators
            .image_picker
            .map(|picker| Arc::new(FileImageSource::new(picker)) as Arc<dyn ImageSource>);

        let engine = Arc::new(ScanEngine::new(
            &config,
            ScanEngineDeps {
                probe: collaborators.probe,
                native_plugin: collaborators.native_plugin,
                camera: collaborators.camera,
                image_decoder: collaborators.image_decoder,
                image_source,
                feedback,
                event_bus: Arc::clone(&event_bus),
            },
        ));

        let resolver = Arc::new(ProductResolver::new(
            fetcher,
            &config.product,
            Arc::clone(&event_bus),
        ));

        let orchestrator = Arc::new(ScanOrchestrator::new(
            Arc::clone(&engine),
            Arc::clone(&resolver),
            Arc::clone(&event_bus),
            config.max_history,
            config.auto_query_product,
        ));

        log::debug!("Scanner stack ready: {:?}", engine);

        Ok(Self {
            config: Arc::new(config),
            event_bus,
            engine,
            resolver,
            orchestrator,
        })
    }

    /// Dispose the engine; history and resolver state stay readable
    pub async fn shutdown(&self) {
        self.engine.destroy().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::integrations::image::decoder::MockImageDecoder;
    use crate::integrations::openfoodfacts::client::MockJsonFetcher;
    use crate::integrations::{NoopFeedback, Platform};
    use crate::services::testing::FakeCamera;

    fn collaborators() -> Collaborators {
        let mut fetcher = MockJsonFetcher::new();
        fetcher.expect_get_json().times(0);

        Collaborators {
            probe: Arc::new(Platform::desktop()),
            native_plugin: None,
            camera: Arc::new(FakeCamera::new(false)),
            image_decoder: Arc::new(MockImageDecoder::new()),
            image_picker: None,
            haptics: Arc::new(NoopFeedback),
            tone_generator: Arc::new(NoopFeedback),
            fetcher: Some(Arc::new(fetcher)),
        }
    }

    #[tokio::test]
    async fn test_wiring_honours_config() {
        let config = ScannerConfig {
            max_history: 5,
            auto_query_product: false,
            ..ScannerConfig::default()
        };

        let state = AppState::new(config, collaborators()).unwrap();
        assert!(!state.orchestrator.auto_query());
        assert_eq!(state.config.max_history, 5);

        state.shutdown().await;
        assert!(state.engine.is_destroyed());
        assert!(state.orchestrator.start_scan().await.is_err());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ScannerConfig {
            max_history: 0,
            ..ScannerConfig::default()
        };

        assert!(matches!(
            AppState::new(config, collaborators()),
            Err(AppError::Config(_))
        ));
    }
}
