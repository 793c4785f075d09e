pub mod decoder;
pub mod picker;

pub use decoder::{DecodeError, DecodeSurface, ImageDecoder, ImageInput};
pub use picker::{
    load_image, mime_for_path, FileImageSource, ImagePicker, ImageSource, IMAGE_EXTENSIONS,
};
