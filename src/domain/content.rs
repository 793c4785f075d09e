// src/domain/content.rs
//
// Payload content classification (what a decoded QR payload *means*,
// independent of its symbology).

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::domain::product::is_likely_product_barcode;

static ANY_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(https?|ftp|file)://").unwrap());
static WEB_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^https?://").unwrap());
static BARE_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]+@[A-Za-z0-9_.-]+\.[A-Za-z0-9_]+$").unwrap());
static BARE_PHONE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+?[0-9]{10,13}$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QrContentType {
    Url,
    Email,
    Phone,
    Sms,
    Wifi,
    Vcard,
    Geo,
    Product,
    Text,
}

impl QrContentType {
    pub fn label(&self) -> &'static str {
        match self {
            QrContentType::Url => "Web link",
            QrContentType::Email => "Email address",
            QrContentType::Phone => "Phone number",
            QrContentType::Sms => "SMS",
            QrContentType::Wifi => "Wi-Fi configuration",
            QrContentType::Vcard => "Contact card",
            QrContentType::Geo => "Location",
            QrContentType::Product => "Product barcode",
            QrContentType::Text => "Text",
        }
    }
}

fn has_prefix_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Classify a decoded payload. Rules are checked in order on the trimmed text.
pub fn parse_content_type(content: &str) -> QrContentType {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return QrContentType::Text;
    }

    if WEB_URL.is_match(trimmed) {
        return QrContentType::Url;
    }
    if has_prefix_ignore_case(trimmed, "mailto:") || BARE_EMAIL.is_match(trimmed) {
        return QrContentType::Email;
    }
    if has_prefix_ignore_case(trimmed, "tel:") || BARE_PHONE.is_match(trimmed) {
        return QrContentType::Phone;
    }
    if has_prefix_ignore_case(trimmed, "sms:") || has_prefix_ignore_case(trimmed, "smsto:") {
        return QrContentType::Sms;
    }
    if has_prefix_ignore_case(trimmed, "WIFI:") {
        return QrContentType::Wifi;
    }
    if has_prefix_ignore_case(trimmed, "BEGIN:VCARD") {
        return QrContentType::Vcard;
    }
    if has_prefix_ignore_case(trimmed, "geo:") {
        return QrContentType::Geo;
    }
    if is_likely_product_barcode(trimmed) {
        return QrContentType::Product;
    }

    QrContentType::Text
}

/// http, https, ftp or file URL
pub fn is_url(content: &str) -> bool {
    ANY_URL.is_match(content.trim())
}

/// http or https URL
pub fn is_web_url(content: &str) -> bool {
    WEB_URL.is_match(content.trim())
}
