use crate::domain::{DomainError, DomainResult};

/// A lookup key must be 8 to 14 ASCII digits
pub fn is_valid_barcode(code: &str) -> bool {
    (8..=14).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_digit())
}

/// Same shape check, used when a scan's format is unknown but the payload
/// still looks like a retail code
pub fn is_likely_product_barcode(content: &str) -> bool {
    is_valid_barcode(content)
}

pub fn validate_barcode(code: &str) -> DomainResult<()> {
    if is_valid_barcode(code) {
        Ok(())
    } else {
        Err(DomainError::InvalidBarcode(code.to_string()))
    }
}
