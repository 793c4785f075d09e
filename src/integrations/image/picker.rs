// src/integrations/image/picker.rs
//
// Image picker + filesystem image source

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::AppResult;
use crate::integrations::image::decoder::ImageInput;

/// Extensions offered by the picker filter
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// OS file dialog. `Ok(None)` means the user dismissed it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImagePicker: Send + Sync {
    async fn pick_image(&self) -> AppResult<Option<PathBuf>>;
}

/// Supplies image bytes when the caller has none in memory
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn acquire(&self) -> AppResult<Option<ImageInput>>;
}

/// MIME type from the file extension; anything unrecognized is treated as JPEG
pub fn mime_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

/// Read a picked file into an `ImageInput`
pub async fn load_image(path: &Path) -> AppResult<ImageInput> {
    let bytes = tokio::fs::read(path).await?;
    let mut input = ImageInput::new(bytes, mime_for_path(path));

    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        input = input.with_file_name(name);
    }

    Ok(input)
}

/// Picker-backed image source
pub struct FileImageSource {
    picker: Arc<dyn ImagePicker>,
}

impl FileImageSource {
    pub fn new(picker: Arc<dyn ImagePicker>) -> Self {
        Self { picker }
    }
}

#[async_trait]
impl ImageSource for FileImageSource {
    async fn acquire(&self) -> AppResult<Option<ImageInput>> {
        let Some(path) = self.picker.pick_image().await? else {
            log::debug!("Image picker dismissed");
            return Ok(None);
        };

        log::debug!("Loading picked image {}", path.display());
        load_image(&path).await.map(Some)
    }
}
