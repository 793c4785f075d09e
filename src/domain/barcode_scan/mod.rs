pub mod entity;
pub mod history;

pub use entity::BarcodeScanResult;
pub use history::{ScanHistory, DEFAULT_HISTORY_CAPACITY};
