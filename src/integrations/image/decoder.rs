// src/integrations/image/decoder.rs
//
// Still-image decode surface
//
// Every decode runs on its own temporary surface, so still-image scans never
// share state with a live session.

use async_trait::async_trait;
use thiserror::Error;

/// Image bytes plus what the caller knows about them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub file_name: Option<String>,
}

impl ImageInput {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Clone, Error)]
pub enum DecodeError {
    /// The decoder ran but found no symbol in the image
    #[error("no barcode found in image")]
    NotFound,

    #[error("{0}")]
    Failed(String),
}

impl DecodeError {
    /// Some decoders only signal "nothing found" through their message
    pub fn is_not_found(&self) -> bool {
        match self {
            DecodeError::NotFound => true,
            DecodeError::Failed(message) => message.contains("No MultiFormat Readers"),
        }
    }
}

/// Factory for disposable decode surfaces
#[cfg_attr(test, mockall::automock)]
pub trait ImageDecoder: Send + Sync {
    fn create_surface(&self) -> Result<Box<dyn DecodeSurface>, DecodeError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DecodeSurface: Send + Sync {
    /// Decode the image to text
    async fn decode(&self, image: &ImageInput) -> Result<String, DecodeError>;

    /// Tear the surface down. Called exactly once, on every exit path.
    fn dispose(&self);
}
