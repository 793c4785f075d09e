use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of symbologies the scanner can report.
///
/// Every decoded payload carries exactly one of these tags; backends that
/// cannot name the symbology fall back to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarcodeFormat {
    // 2D codes
    #[serde(rename = "QR_CODE")]
    QrCode,
    #[serde(rename = "DATA_MATRIX")]
    DataMatrix,
    #[serde(rename = "AZTEC")]
    Aztec,
    #[serde(rename = "PDF_417")]
    Pdf417,

    // Retail product codes (EAN/UPC)
    #[serde(rename = "EAN_13")]
    Ean13,
    #[serde(rename = "EAN_8")]
    Ean8,
    #[serde(rename = "UPC_A")]
    UpcA,
    #[serde(rename = "UPC_E")]
    UpcE,

    // Industrial codes
    #[serde(rename = "CODE_128")]
    Code128,
    #[serde(rename = "CODE_39")]
    Code39,
    #[serde(rename = "CODE_93")]
    Code93,
    #[serde(rename = "CODABAR")]
    Codabar,
    #[serde(rename = "ITF")]
    Itf,

    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl BarcodeFormat {
    pub const ALL: [BarcodeFormat; 14] = [
        BarcodeFormat::QrCode,
        BarcodeFormat::DataMatrix,
        BarcodeFormat::Aztec,
        BarcodeFormat::Pdf417,
        BarcodeFormat::Ean13,
        BarcodeFormat::Ean8,
        BarcodeFormat::UpcA,
        BarcodeFormat::UpcE,
        BarcodeFormat::Code128,
        BarcodeFormat::Code39,
        BarcodeFormat::Code93,
        BarcodeFormat::Codabar,
        BarcodeFormat::Itf,
        BarcodeFormat::Unknown,
    ];

    /// Canonical tag, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            BarcodeFormat::QrCode => "QR_CODE",
            BarcodeFormat::DataMatrix => "DATA_MATRIX",
            BarcodeFormat::Aztec => "AZTEC",
            BarcodeFormat::Pdf417 => "PDF_417",
            BarcodeFormat::Ean13 => "EAN_13",
            BarcodeFormat::Ean8 => "EAN_8",
            BarcodeFormat::UpcA => "UPC_A",
            BarcodeFormat::UpcE => "UPC_E",
            BarcodeFormat::Code128 => "CODE_128",
            BarcodeFormat::Code39 => "CODE_39",
            BarcodeFormat::Code93 => "CODE_93",
            BarcodeFormat::Codabar => "CODABAR",
            BarcodeFormat::Itf => "ITF",
            BarcodeFormat::Unknown => "UNKNOWN",
        }
    }
}

impl Default for BarcodeFormat {
    fn default() -> Self {
        BarcodeFormat::Unknown
    }
}

impl fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse grouping used by the UI and by the product-code decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BarcodeCategory {
    #[serde(rename = "QR_2D")]
    Qr2d,
    Product,
    Industrial,
    Unknown,
}

/// Static description of a format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatInfo {
    pub format: BarcodeFormat,
    pub label: &'static str,
    pub category: BarcodeCategory,
    pub category_label: &'static str,
    /// True when the code identifies a purchasable product (EAN/UPC family)
    pub is_product_code: bool,
}
