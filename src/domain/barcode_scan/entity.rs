use serde::Serialize;

use crate::domain::product::{is_likely_product_barcode, ProductInfo};
use crate::domain::scan::ScanResult;

/// Scan output combined with optional product metadata.
///
/// Materialized in two phases: `pending` right after the decode, then
/// `complete` once the product lookup has run (or was skipped). Only a
/// completed result is eligible for history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarcodeScanResult {
    pub scan: ScanResult,
    pub product: Option<ProductInfo>,
    pub is_product_barcode: bool,
    pub product_query_done: bool,
}

impl BarcodeScanResult {
    /// Phase one: scan known, lookup not yet run
    pub fn pending(scan: ScanResult) -> Self {
        let is_product_barcode =
            scan.format_info.is_product_code || is_likely_product_barcode(&scan.content);

        Self {
            scan,
            product: None,
            is_product_barcode,
            product_query_done: false,
        }
    }

    /// Phase two: attach the lookup outcome and mark done
    pub fn complete(&mut self, product: Option<ProductInfo>) {
        self.product = product;
        self.product_query_done = true;
    }
}
