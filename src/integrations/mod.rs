// src/integrations/mod.rs
//
// External Integrations Module
//
// Collaborators the scanner core talks to but does not own: the native
// scanner plugin, the camera, still-image decoding, feedback channels,
// platform detection and the product-data HTTP API.

pub mod camera;
pub mod feedback;
pub mod image;
pub mod native;
pub mod openfoodfacts;
pub mod platform;

pub use camera::{CameraConstraints, CameraDevice, CameraError, FrameDecode, MediaStream, TrackCapabilities};
pub use feedback::{FeedbackError, Haptics, NoopFeedback, ToneGenerator, ToneSpec};
pub use image::{DecodeError, DecodeSurface, FileImageSource, ImageDecoder, ImageInput, ImagePicker, ImageSource};
pub use native::{NativeScanRequest, NativeScanResponse, NativeScannerPlugin, PermissionState, PluginError};
pub use openfoodfacts::{JsonFetcher, OpenFoodFactsClient};
pub use platform::{EnvironmentProbe, Platform};
