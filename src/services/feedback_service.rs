// src/services/feedback_service.rs
//
// Feedback Service - success side effects
//
// A vibration pulse and a short tone after every successful decode.
// Nothing here may fail a scan: every error is logged and swallowed.

use std::sync::Arc;
use std::time::Duration;

use crate::config::ScannerConfig;
use crate::integrations::{
    EnvironmentProbe, Haptics, NativeScannerPlugin, ToneGenerator, ToneSpec,
};

pub struct FeedbackService {
    vibrate: bool,
    sound: bool,
    vibrate_duration: Duration,
    tone: ToneSpec,
    haptics: Arc<dyn Haptics>,
    tone_generator: Arc<dyn ToneGenerator>,
    native_plugin: Option<Arc<dyn NativeScannerPlugin>>,
    probe: Arc<dyn EnvironmentProbe>,
}

impl FeedbackService {
    pub fn new(
        config: &ScannerConfig,
        haptics: Arc<dyn Haptics>,
        tone_generator: Arc<dyn ToneGenerator>,
        native_plugin: Option<Arc<dyn NativeScannerPlugin>>,
        probe: Arc<dyn EnvironmentProbe>,
    ) -> Self {
        Self {
            vibrate: config.vibrate,
            sound: config.sound,
            vibrate_duration: config.vibrate_duration(),
            tone: ToneSpec::from(&config.tone),
            haptics,
            tone_generator,
            native_plugin,
            probe,
        }
    }

    /// Run both success side effects
    pub async fn on_success(&self) {
        self.vibrate().await;
        self.play_tone();
    }

    /// Native pulse inside the app shell, device haptics otherwise (or when
    /// the native call fails)
    async fn vibrate(&self) {
        if !self.vibrate {
            return;
        }

        if self.probe.is_native_mobile() {
            if let Some(plugin) = &self.native_plugin {
                match plugin.vibrate().await {
                    Ok(()) => return,
                    Err(e) => log::debug!("Native vibrate failed, falling back: {}", e),
                }
            }
        }

        if let Err(e) = self.haptics.vibrate(self.vibrate_duration) {
            log::debug!("Vibration unavailable: {}", e);
        }
    }

    fn play_tone(&self) {
        if !self.sound {
            return;
        }

        if let Err(e) = self.tone_generator.play(&self.tone) {
            log::debug!("Failed to play scan tone: {}", e);
        }
    }
}
