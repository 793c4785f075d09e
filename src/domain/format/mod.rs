pub mod entity;
pub mod registry;

pub use entity::{BarcodeCategory, BarcodeFormat, FormatInfo};
pub use registry::{classify, describe, describe_raw, infer_from_content, normalize};
