pub mod entity;
pub mod invariants;

pub use entity::{NutritionInfo, ProductInfo, ProductQueryResult, ProductSource};
pub use invariants::{is_likely_product_barcode, is_valid_barcode, validate_barcode};
