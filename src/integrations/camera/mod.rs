pub mod media;

pub use media::{
    CameraConstraints, CameraDevice, CameraError, FacingMode, FrameDecode, MediaStream,
    TrackCapabilities,
};
