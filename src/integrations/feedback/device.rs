// src/integrations/feedback/device.rs
//
// Haptic + audio side channels. Both are best-effort: callers log failures
// and move on.

use std::f32::consts::PI;
use std::time::Duration;
use thiserror::Error;

use crate::config::ToneConfig;

pub const TONE_SAMPLE_RATE: u32 = 44_100;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeedbackError {
    #[error("feedback channel unsupported")]
    Unsupported,

    #[error("{0}")]
    Failed(String),
}

#[cfg_attr(test, mockall::automock)]
pub trait Haptics: Send + Sync {
    fn vibrate(&self, duration: Duration) -> Result<(), FeedbackError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait ToneGenerator: Send + Sync {
    fn play(&self, tone: &ToneSpec) -> Result<(), FeedbackError>;
}

/// Single sine beep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSpec {
    pub frequency_hz: f32,
    pub duration: Duration,
    pub volume: f32,
}

impl ToneSpec {
    /// Mono PCM samples in [-volume, volume]
    pub fn render(&self, sample_rate: u32) -> Vec<f32> {
        let count = (self.duration.as_secs_f32() * sample_rate as f32).round() as usize;
        let step = 2.0 * PI * self.frequency_hz / sample_rate as f32;

        (0..count)
            .map(|i| (step * i as f32).sin() * self.volume)
            .collect()
    }
}

impl From<&ToneConfig> for ToneSpec {
    fn from(config: &ToneConfig) -> Self {
        Self {
            frequency_hz: config.frequency_hz,
            duration: Duration::from_millis(config.duration_ms),
            volume: config.volume,
        }
    }
}

/// Stand-in for hosts with neither a vibration motor nor audio output
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFeedback;

impl Haptics for NoopFeedback {
    fn vibrate(&self, _duration: Duration) -> Result<(), FeedbackError> {
        Err(FeedbackError::Unsupported)
    }
}

impl ToneGenerator for NoopFeedback {
    fn play(&self, _tone: &ToneSpec) -> Result<(), FeedbackError> {
        Err(FeedbackError::Unsupported)
    }
}
