//! Pure extraction over rendered markup: the `__NEXT_DATA__` payload, the
//! selected variant and the revealed review summary.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub mod next_data;
pub mod reviews;
pub mod variant;

pub use next_data::{extract_product_details, PRODUCT_DETAILS_PATH};
pub use reviews::{parse_review_summary, ReviewSummary};
pub use variant::{FallbackPolicy, ResolvedSelection, SelectionSource, VariantResolver};

use crate::error::ExtractionError;

/// Product details object parsed from the embedded JSON.
///
/// `variations` keeps the payload's key order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductArticleDetails {
    pub product_name: String,
    pub variations: Vec<VariantRecord>,
}

/// One purchasable color option.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantRecord {
    #[serde(skip)]
    pub key: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_optional_string")]
    pub red_price_value: Option<String>,
    #[serde(default, deserialize_with = "lenient_optional_string")]
    pub white_price_value: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticleDetails {
    #[serde(default, deserialize_with = "lenient_string")]
    product_name: String,
    #[serde(default)]
    variations: Option<serde_json::Map<String, Value>>,
}

impl ProductArticleDetails {
    pub fn from_value(value: &Value) -> Result<Self, ExtractionError> {
        let raw = RawArticleDetails::deserialize(value)
            .map_err(|e| ExtractionError::InvalidShape { message: e.to_string() })?;

        let variations = raw
            .variations
            .unwrap_or_default()
            .into_iter()
            .map(|(key, value)| {
                let mut record = VariantRecord::deserialize(&value).map_err(|e| {
                    ExtractionError::InvalidShape { message: format!("variation '{}': {}", key, e) }
                })?;
                record.key = key;
                Ok(record)
            })
            .collect::<Result<Vec<_>, ExtractionError>>()?;

        Ok(Self {
            product_name: raw.product_name,
            variations,
        })
    }
}

/// The single record emitted per processed page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    pub price: f64,
    pub color: String,
    #[serde(rename = "availableColors")]
    pub available_colors: Vec<String>,
    pub reviews_count: u32,
    pub reviews_score: f64,
}

impl ProductRecord {
    /// Field assembly from the outputs of the earlier steps.
    pub fn assemble(
        details: &ProductArticleDetails,
        selection: &ResolvedSelection,
        reviews: ReviewSummary,
    ) -> Self {
        Self {
            name: details.product_name.trim().to_string(),
            price: selection.price,
            color: selection.variant.name.trim().to_string(),
            available_colors: selection.available_colors.clone(),
            reviews_count: reviews.count,
            reviews_score: reviews.score,
        }
    }
}

/// Strings in the payload are sometimes numbers; accept both.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_optional_string(deserializer)?.unwrap_or_default())
}

fn lenient_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
