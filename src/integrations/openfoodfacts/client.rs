// src/integrations/openfoodfacts/client.rs
//
// Open Food Facts HTTP integration
//
// ARCHITECTURE:
// - Thin reqwest client: one GET per call, no retries (the resolver walks mirrors)
// - Maps the external payload into ProductInfo (NO lookup policy here)
//
// CRITICAL RULES:
// - This is INFRASTRUCTURE, not DOMAIN
// - `status == 1` with a `product` object is the only "found" shape

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::Value;

use crate::config::ProductQueryConfig;
use crate::domain::{NutritionInfo, ProductInfo};
use crate::error::{AppError, AppResult};

pub const UNKNOWN_PRODUCT_NAME: &str = "Unknown product";

/// Build the lookup URL for one mirror
pub fn product_url(mirror: &str, barcode: &str) -> String {
    format!("{}/api/v0/product/{}.json", mirror.trim_end_matches('/'), barcode)
}

/// GET a JSON document. Non-success statuses are errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    async fn get_json(&self, url: &str) -> AppResult<Value>;
}

/// Open Food Facts API client
pub struct OpenFoodFactsClient {
    http_client: Client,
    user_agent: String,
}

impl OpenFoodFactsClient {
    /// Per-request timeouts are applied by the caller, so the client itself
    /// carries none.
    pub fn new(config: &ProductQueryConfig) -> AppResult<Self> {
        let http_client = Client::builder()
            .build()
            .map_err(|e| AppError::Http(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            user_agent: config.user_agent.clone(),
        })
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

#[async_trait]
impl JsonFetcher for OpenFoodFactsClient {
    async fn get_json(&self, url: &str) -> AppResult<Value> {
        let response = self
            .http_client
            .get(url)
            .header(header::USER_AGENT, &self.user_agent)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Http(format!("HTTP {}", status.as_u16())));
        }

        Ok(response.json::<Value>().await?)
    }
}

// ============================================================================
// WIRE FORMAT
// ============================================================================

#[derive(Debug, Deserialize)]
struct ProductResponse {
    #[serde(default)]
    status: i64,
    product: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProductData {
    product_name: Option<String>,
    product_name_zh: Option<String>,
    product_name_en: Option<String>,
    brands: Option<String>,
    image_front_small_url: Option<String>,
    image_url: Option<String>,
    categories: Option<String>,
    ingredients_text: Option<String>,
    ingredients_text_zh: Option<String>,
    nutriments: Option<Nutriments>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Nutriments {
    #[serde(rename = "energy-kcal_100g")]
    energy_kcal_100g: Value,
    proteins_100g: Value,
    carbohydrates_100g: Value,
    fat_100g: Value,
    sugars_100g: Value,
    sodium_100g: Value,
    fiber_100g: Value,
}

/// Map a lookup response. `Ok(None)` when the source reports no product.
pub fn parse_product_response(body: Value) -> AppResult<Option<ProductInfo>> {
    let response: ProductResponse = serde_json::from_value(body)?;

    let raw = match response.product {
        Some(product @ Value::Object(_)) if response.status == 1 => product,
        _ => return Ok(None),
    };

    let data: ProductData = serde_json::from_value(raw.clone())?;

    let name = first_non_empty([
        &data.product_name_zh,
        &data.product_name,
        &data.product_name_en,
    ])
    .unwrap_or(UNKNOWN_PRODUCT_NAME)
    .to_string();

    Ok(Some(ProductInfo {
        name,
        brand: data.brands.unwrap_or_default(),
        image: first_non_empty([&data.image_front_small_url, &data.image_url])
            .unwrap_or_default()
            .to_string(),
        categories: data.categories.unwrap_or_default(),
        ingredients: first_non_empty([&data.ingredients_text_zh, &data.ingredients_text])
            .unwrap_or_default()
            .to_string(),
        nutrition: data.nutriments.as_ref().and_then(map_nutrition),
        raw,
    }))
}

fn first_non_empty<const N: usize>(candidates: [&Option<String>; N]) -> Option<&str> {
    candidates
        .into_iter()
        .filter_map(|c| c.as_deref())
        .find(|s| !s.is_empty())
}

fn map_nutrition(n: &Nutriments) -> Option<NutritionInfo> {
    let nutrition = NutritionInfo {
        energy: with_unit(&n.energy_kcal_100g, " kcal").unwrap_or_default(),
        proteins: with_unit(&n.proteins_100g, "g").unwrap_or_default(),
        carbohydrates: with_unit(&n.carbohydrates_100g, "g").unwrap_or_default(),
        fat: with_unit(&n.fat_100g, "g").unwrap_or_default(),
        sugars: with_unit(&n.sugars_100g, "g"),
        sodium: with_unit(&n.sodium_100g, "mg"),
        fiber: with_unit(&n.fiber_100g, "g"),
    };

    if nutrition.has_no_macros() {
        None
    } else {
        Some(nutrition)
    }
}

/// Zero, missing and non-numeric values are all absent
fn with_unit(value: &Value, unit: &str) -> Option<String> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if number == 0.0 || !number.is_finite() {
        return None;
    }

    Some(format!("{}{}", format_number(number), unit))
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
