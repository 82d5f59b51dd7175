use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

use super::ProductArticleDetails;
use crate::error::ExtractionError;

/// Key path from the `__NEXT_DATA__` root down to the product details object.
pub const PRODUCT_DETAILS_PATH: [&str; 5] = [
    "props",
    "pageProps",
    "productPageProps",
    "aemData",
    "productArticleDetails",
];

/// Text of the first element matching `script_selector`.
pub fn find_script_text(html: &str, script_selector: &str) -> Result<String, ExtractionError> {
    let selector = Selector::parse(script_selector).map_err(|_| ExtractionError::MissingScript)?;
    let document = Html::parse_document(html);

    let text: String = document
        .select(&selector)
        .next()
        .ok_or(ExtractionError::MissingScript)?
        .text()
        .collect();

    if text.trim().is_empty() {
        return Err(ExtractionError::MissingScript);
    }

    debug!("Found __NEXT_DATA__ ({} bytes)", text.len());
    Ok(text)
}

/// Parse the script body as JSON.
pub fn parse_next_data(text: &str) -> Result<Value, ExtractionError> {
    serde_json::from_str(text).map_err(|e| ExtractionError::InvalidJson { message: e.to_string() })
}

/// Follow `path` key by key, naming the first key that is absent.
pub fn descend<'a>(root: &'a Value, path: &[&str]) -> Result<&'a Value, ExtractionError> {
    path.iter().try_fold(root, |node, key| {
        node.get(*key)
            .filter(|value| !value.is_null())
            .ok_or_else(|| ExtractionError::MissingKey { key: (*key).to_string() })
    })
}

/// Typed product details found under [`PRODUCT_DETAILS_PATH`].
pub fn product_details(root: &Value) -> Result<ProductArticleDetails, ExtractionError> {
    let node = descend(root, &PRODUCT_DETAILS_PATH)?;

    let details = ProductArticleDetails::from_value(node)?;
    if details.variations.is_empty() {
        return Err(ExtractionError::NoVariations);
    }

    Ok(details)
}

/// Script lookup, JSON parse and key descent in one step.
pub fn extract_product_details(
    html: &str,
    script_selector: &str,
) -> Result<(Value, ProductArticleDetails), ExtractionError> {
    let text = find_script_text(html, script_selector)?;
    let root = parse_next_data(&text)?;
    let details = product_details(&root)?;
    Ok((root, details))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SCRIPT: &str = "script#__NEXT_DATA__";

    fn page(payload: &str) -> String {
        format!(
            r#"<html><head><script id="__NEXT_DATA__" type="application/json">{}</script></head><body></body></html>"#,
            payload
        )
    }

    fn next_data(details: Value) -> Value {
        json!({
            "props": {"pageProps": {"productPageProps": {"aemData": {"productArticleDetails": details}}}}
        })
    }

    #[test]
    fn test_missing_script() {
        let html = "<html><body><script id=\"other\">{}</script></body></html>";
        assert_eq!(find_script_text(html, SCRIPT), Err(ExtractionError::MissingScript));
    }

    #[test]
    fn test_empty_script_counts_as_missing() {
        assert_eq!(find_script_text(&page("  "), SCRIPT), Err(ExtractionError::MissingScript));
    }

    #[test]
    fn test_invalid_json() {
        let text = find_script_text(&page("{not json"), SCRIPT).unwrap();
        assert!(matches!(parse_next_data(&text), Err(ExtractionError::InvalidJson { .. })));
    }

    #[test]
    fn test_each_missing_key_is_reported() {
        let cases = [
            (json!({}), "props"),
            (json!({"props": {}}), "pageProps"),
            (json!({"props": {"pageProps": {}}}), "productPageProps"),
            (json!({"props": {"pageProps": {"productPageProps": {}}}}), "aemData"),
            (json!({"props": {"pageProps": {"productPageProps": {"aemData": null}}}}), "aemData"),
            (
                json!({"props": {"pageProps": {"productPageProps": {"aemData": {}}}}}),
                "productArticleDetails",
            ),
        ];

        for (root, key) in cases {
            assert_eq!(
                descend(&root, &PRODUCT_DETAILS_PATH),
                Err(ExtractionError::MissingKey { key: key.to_string() })
            );
        }

        let root = next_data(json!({"productName": "Tee", "variations": {}}));
        assert!(descend(&root, &PRODUCT_DETAILS_PATH).is_ok());
    }

    #[test]
    fn test_missing_or_empty_variations() {
        let root = next_data(json!({"productName": "Tee"}));
        assert_eq!(product_details(&root), Err(ExtractionError::NoVariations));

        let root = next_data(json!({"productName": "Tee", "variations": {}}));
        assert_eq!(product_details(&root), Err(ExtractionError::NoVariations));
    }

    #[test]
    fn test_extract_full_page() {
        let payload = next_data(json!({
            "productName": "Oversized T-shirt",
            "variations": {
                "1274171085001": {"name": "Black", "redPriceValue": "", "whitePriceValue": "49.00"},
                "1274171085002": {"name": "White", "whitePriceValue": "49.00"}
            }
        }));

        let (root, details) = extract_product_details(&page(&payload.to_string()), SCRIPT).unwrap();
        assert_eq!(details.product_name, "Oversized T-shirt");
        assert_eq!(details.variations.len(), 2);
        assert_eq!(details.variations[0].name, "Black");
        assert_eq!(details.variations[1].name, "White");
        assert!(root.get("props").is_some());
    }
}
