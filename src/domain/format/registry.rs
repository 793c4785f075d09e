// src/domain/format/registry.rs
//
// Format Registry
//
// Pure classification of backend symbology names and decoded payloads.
//
// RULES:
// - No state, no I/O
// - `normalize` precedence order is fixed (QR, EAN-13, EAN-8, UPC-A, UPC-E,
//   Code128, Code39, Code93, DataMatrix, Aztec, PDF417, Codabar, ITF). The
//   native plugin and the camera decoder spell names differently
//   ("QRCode" vs "QR_CODE", "Ean13" vs "EAN_13") and the substrings overlap.
// - `infer_from_content` checks EAN-8 before the UPC-E range, so an 8-digit
//   payload is never classified as UPC-E.

use regex::Regex;
use std::sync::LazyLock;

use super::entity::{BarcodeCategory, BarcodeFormat, FormatInfo};

static EAN13_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^EAN.*13$").unwrap());
static EAN8_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^EAN.*8$").unwrap());
static UPCA_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^UPC.*A$").unwrap());
static UPCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^UPC.*E$").unwrap());
static CODE39_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"CODE.*39").unwrap());
static CODE93_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"CODE.*93").unwrap());

/// Payloads longer than this are assumed to come from a 2D code
const LONG_CONTENT_THRESHOLD: usize = 50;

/// Map a backend-specific symbology name onto the closed format set.
pub fn normalize(raw_format: &str) -> BarcodeFormat {
    if raw_format.is_empty() {
        return BarcodeFormat::Unknown;
    }

    let key: String = raw_format
        .to_uppercase()
        .chars()
        .filter(|c| *c != '-' && *c != '_' && !c.is_whitespace())
        .collect();

    if key.contains("QR") {
        return BarcodeFormat::QrCode;
    }
    if key.contains("EAN13") || EAN13_PATTERN.is_match(&key) {
        return BarcodeFormat::Ean13;
    }
    if key.contains("EAN8") || EAN8_PATTERN.is_match(&key) {
        return BarcodeFormat::Ean8;
    }
    if key.contains("UPCA") || UPCA_PATTERN.is_match(&key) {
        return BarcodeFormat::UpcA;
    }
    if key.contains("UPCE") || UPCE_PATTERN.is_match(&key) {
        return BarcodeFormat::UpcE;
    }
    if key.contains("128") {
        return BarcodeFormat::Code128;
    }
    if CODE39_PATTERN.is_match(&key) {
        return BarcodeFormat::Code39;
    }
    if CODE93_PATTERN.is_match(&key) {
        return BarcodeFormat::Code93;
    }
    if key.contains("DATA") {
        return BarcodeFormat::DataMatrix;
    }
    if key.contains("AZTEC") {
        return BarcodeFormat::Aztec;
    }
    if key.contains("PDF") {
        return BarcodeFormat::Pdf417;
    }
    if key.contains("CODABAR") {
        return BarcodeFormat::Codabar;
    }
    if key.contains("ITF") || key.contains("INTERLEAVED") {
        return BarcodeFormat::Itf;
    }

    BarcodeFormat::Unknown
}

/// Guess the symbology from the decoded payload.
///
/// Used when the backend reports nothing usable. Rule order matters, see the
/// module header for the EAN-8 / UPC-E tie-break.
pub fn infer_from_content(content: &str) -> BarcodeFormat {
    if content.is_empty() {
        return BarcodeFormat::Unknown;
    }

    let all_digits = content.bytes().all(|b| b.is_ascii_digit());
    let len = content.len();

    if all_digits && len == 13 {
        return BarcodeFormat::Ean13;
    }
    if all_digits && len == 8 {
        return BarcodeFormat::Ean8;
    }
    if all_digits && len == 12 {
        return BarcodeFormat::UpcA;
    }
    if all_digits && (6..=8).contains(&len) {
        return BarcodeFormat::UpcE;
    }

    if content.starts_with("http://")
        || content.starts_with("https://")
        || content.contains("://")
        || content.contains('\n')
    {
        return BarcodeFormat::QrCode;
    }

    if content.chars().count() > LONG_CONTENT_THRESHOLD {
        return BarcodeFormat::QrCode;
    }

    BarcodeFormat::Unknown
}

/// Two-pass classification used by every live decode: backend name first,
/// payload inference when the name is not recognised.
pub fn classify(raw_format: &str, content: &str) -> BarcodeFormat {
    match normalize(raw_format) {
        BarcodeFormat::Unknown => infer_from_content(content),
        format => format,
    }
}

/// Constant-time table lookup. `Unknown` has its own entry.
pub fn describe(format: BarcodeFormat) -> FormatInfo {
    let (label, category) = match format {
        BarcodeFormat::QrCode => ("QR Code", BarcodeCategory::Qr2d),
        BarcodeFormat::DataMatrix => ("Data Matrix", BarcodeCategory::Qr2d),
        BarcodeFormat::Aztec => ("Aztec", BarcodeCategory::Qr2d),
        BarcodeFormat::Pdf417 => ("PDF417", BarcodeCategory::Qr2d),
        BarcodeFormat::Ean13 => ("EAN-13", BarcodeCategory::Product),
        BarcodeFormat::Ean8 => ("EAN-8", BarcodeCategory::Product),
        BarcodeFormat::UpcA => ("UPC-A", BarcodeCategory::Product),
        BarcodeFormat::UpcE => ("UPC-E", BarcodeCategory::Product),
        BarcodeFormat::Code128 => ("Code 128", BarcodeCategory::Industrial),
        BarcodeFormat::Code39 => ("Code 39", BarcodeCategory::Industrial),
        BarcodeFormat::Code93 => ("Code 93", BarcodeCategory::Industrial),
        BarcodeFormat::Codabar => ("Codabar", BarcodeCategory::Industrial),
        BarcodeFormat::Itf => ("ITF", BarcodeCategory::Industrial),
        BarcodeFormat::Unknown => ("Unknown Format", BarcodeCategory::Unknown),
    };

    FormatInfo {
        format,
        label,
        category,
        category_label: category_label(category),
        is_product_code: category == BarcodeCategory::Product,
    }
}

/// Describe a raw backend name directly
pub fn describe_raw(raw_format: &str) -> FormatInfo {
    describe(normalize(raw_format))
}

fn category_label(category: BarcodeCategory) -> &'static str {
    match category {
        BarcodeCategory::Qr2d => "2D Code",
        BarcodeCategory::Product => "Product Barcode",
        BarcodeCategory::Industrial => "Industrial Barcode",
        BarcodeCategory::Unknown => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qr_spellings_normalize_to_qr() {
        for raw in ["QRCode", "QR_CODE", "qrcode", "qr-code", "QR Code"] {
            assert_eq!(normalize(raw), BarcodeFormat::QrCode, "raw: {}", raw);
        }
    }

    #[test]
    fn test_native_and_camera_names_agree() {
        let pairs = [
            ("Ean13", "EAN_13", BarcodeFormat::Ean13),
            ("Ean8", "EAN_8", BarcodeFormat::Ean8),
            ("UpcA", "UPC_A", BarcodeFormat::UpcA),
            ("UpcE", "UPC_E", BarcodeFormat::UpcE),
            ("Code128", "CODE_128", BarcodeFormat::Code128),
            ("Code39", "CODE_39", BarcodeFormat::Code39),
            ("Code93", "CODE_93", BarcodeFormat::Code93),
            ("DataMatrix", "DATA_MATRIX", BarcodeFormat::DataMatrix),
            ("Aztec", "AZTEC", BarcodeFormat::Aztec),
            ("Pdf417", "PDF_417", BarcodeFormat::Pdf417),
            ("Codabar", "CODABAR", BarcodeFormat::Codabar),
            ("Itf", "ITF", BarcodeFormat::Itf),
        ];

        for (native, camera, expected) in pairs {
            assert_eq!(normalize(native), expected, "native name {}", native);
            assert_eq!(normalize(camera), expected, "camera name {}", camera);
        }
    }

    #[test]
    fn test_precedence_on_overlapping_names() {
        // "128" wins before any Code39/93 pattern
        assert_eq!(normalize("GS1-128"), BarcodeFormat::Code128);
        // Generic DATA / PDF fallbacks
        assert_eq!(normalize("DataBar"), BarcodeFormat::DataMatrix);
        assert_eq!(normalize("MicroPDF"), BarcodeFormat::Pdf417);
        assert_eq!(normalize("Interleaved 2 of 5"), BarcodeFormat::Itf);
        // QR substring is checked first
        assert_eq!(normalize("MICRO_QR"), BarcodeFormat::QrCode);
    }

    #[test]
    fn test_unmatched_names_are_unknown() {
        assert_eq!(normalize(""), BarcodeFormat::Unknown);
        assert_eq!(normalize("MaxiCode"), BarcodeFormat::Unknown);
        assert_eq!(normalize("UNKNOWN"), BarcodeFormat::Unknown);
    }

    #[test]
    fn test_infer_numeric_lengths() {
        assert_eq!(infer_from_content("6901234567892"), BarcodeFormat::Ean13);
        assert_eq!(infer_from_content("96385074"), BarcodeFormat::Ean8);
        assert_eq!(infer_from_content("036000291452"), BarcodeFormat::UpcA);
        assert_eq!(infer_from_content("123456"), BarcodeFormat::UpcE);
        assert_eq!(infer_from_content("1234567"), BarcodeFormat::UpcE);
    }

    #[test]
    fn test_eight_digits_never_upc_e() {
        for content in ["00000000", "12345670", "99999999"] {
            assert_eq!(infer_from_content(content), BarcodeFormat::Ean8);
        }
    }

    #[test]
    fn test_infer_qr_like_payloads() {
        assert_eq!(infer_from_content("https://example.com"), BarcodeFormat::QrCode);
        assert_eq!(infer_from_content("otpauth://totp/x"), BarcodeFormat::QrCode);
        assert_eq!(infer_from_content("line one\nline two"), BarcodeFormat::QrCode);
        assert_eq!(infer_from_content(&"a".repeat(51)), BarcodeFormat::QrCode);
    }

    #[test]
    fn test_infer_unknown() {
        assert_eq!(infer_from_content(""), BarcodeFormat::Unknown);
        assert_eq!(infer_from_content("hello"), BarcodeFormat::Unknown);
        assert_eq!(infer_from_content("12345"), BarcodeFormat::Unknown);
        assert_eq!(infer_from_content(&"a".repeat(50)), BarcodeFormat::Unknown);
    }

    #[test]
    fn test_classify_falls_back_to_content() {
        assert_eq!(classify("Ean13", "anything"), BarcodeFormat::Ean13);
        assert_eq!(classify("", "6901234567892"), BarcodeFormat::Ean13);
        assert_eq!(classify("MaxiCode", "https://example.com"), BarcodeFormat::QrCode);
    }

    #[test]
    fn test_describe_unknown() {
        let info = describe(BarcodeFormat::Unknown);
        assert_eq!(info.category, BarcodeCategory::Unknown);
        assert!(!info.is_product_code);
    }

    #[test]
    fn test_describe_is_total_and_consistent() {
        for format in BarcodeFormat::ALL {
            let info = describe(format);
            assert_eq!(info.format, format);
            assert_eq!(
                info.is_product_code,
                matches!(
                    format,
                    BarcodeFormat::Ean13 | BarcodeFormat::Ean8 | BarcodeFormat::UpcA | BarcodeFormat::UpcE
                )
            );
        }
    }

    #[test]
    fn test_describe_raw() {
        assert_eq!(describe_raw("EAN_13").label, "EAN-13");
        assert_eq!(describe_raw("nonsense").format, BarcodeFormat::Unknown);
    }
}
