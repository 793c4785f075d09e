use serde::{Deserialize, Serialize};

/// Commercial metadata for a retail product code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInfo {
    pub name: String,
    pub brand: String,
    /// Image URL, empty when the source has none
    pub image: String,
    pub categories: String,
    pub ingredients: String,
    /// None when no primary macro field is present
    pub nutrition: Option<NutritionInfo>,
    /// Source payload, kept opaque
    pub raw: serde_json::Value,
}

/// Per-100g nutrition facts, already formatted with units
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionInfo {
    pub energy: String,
    pub proteins: String,
    pub carbohydrates: String,
    pub fat: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sugars: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sodium: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiber: Option<String>,
}

impl NutritionInfo {
    /// True when all four primary macro fields are empty
    pub fn has_no_macros(&self) -> bool {
        self.energy.is_empty()
            && self.proteins.is_empty()
            && self.carbohydrates.is_empty()
            && self.fat.is_empty()
    }
}

/// Where a lookup result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductSource {
    OpenFoodFacts,
    Unknown,
}

/// Outcome of a product lookup. Always produced, never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQueryResult {
    pub found: bool,
    pub product: Option<ProductInfo>,
    pub source: ProductSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProductQueryResult {
    pub fn found(product: ProductInfo, source: ProductSource) -> Self {
        Self {
            found: true,
            product: Some(product),
            source,
            error: None,
        }
    }

    pub fn not_found(source: ProductSource, error: Option<String>) -> Self {
        Self {
            found: false,
            product: None,
            source,
            error,
        }
    }
}
