pub mod device;

pub use device::{FeedbackError, Haptics, NoopFeedback, ToneGenerator, ToneSpec, TONE_SAMPLE_RATE};
