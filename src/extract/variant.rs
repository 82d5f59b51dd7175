use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::VariantRecord;
use crate::utils::{parse_decimal, StringUtils, DEFAULT_PRICE};

/// What to select when the visible color matches no variant name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// First variant in payload order.
    #[default]
    FirstInMapping,
}

/// How the selected variant was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    MatchedDefaultColor,
    Fallback(FallbackPolicy),
}

/// The variant that represents the page.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSelection {
    pub variant: VariantRecord,
    pub price: f64,
    pub default_color: String,
    pub available_colors: Vec<String>,
    pub source: SelectionSource,
}

#[derive(Debug, Clone, Default)]
pub struct VariantResolver {
    policy: FallbackPolicy,
}

impl VariantResolver {
    pub fn new(policy: FallbackPolicy) -> Self {
        Self { policy }
    }

    /// Pick the variant for `default_color`. `None` only when `variants` is empty.
    pub fn resolve(&self, variants: &[VariantRecord], default_color: &str) -> Option<ResolvedSelection> {
        let available_colors = available_colors(variants);

        let matched = StringUtils::non_blank(default_color).and_then(|color| {
            variants
                .iter()
                .find(|variant| StringUtils::eq_ignore_case_trimmed(&variant.name, color))
        });

        let (variant, source) = match matched {
            Some(variant) => {
                debug!("Default color '{}' matched variant '{}'", default_color.trim(), variant.name);
                (variant, SelectionSource::MatchedDefaultColor)
            }
            None => {
                let variant = self.fallback(variants)?;
                warn!(
                    "Default color '{}' matched no variant, falling back to '{}' ({:?})",
                    default_color.trim(),
                    variant.name,
                    self.policy
                );
                (variant, SelectionSource::Fallback(self.policy))
            }
        };

        Some(ResolvedSelection {
            price: resolve_price(variant),
            variant: variant.clone(),
            default_color: default_color.trim().to_string(),
            available_colors,
            source,
        })
    }

    fn fallback<'a>(&self, variants: &'a [VariantRecord]) -> Option<&'a VariantRecord> {
        match self.policy {
            FallbackPolicy::FirstInMapping => variants.first(),
        }
    }
}

/// Trimmed, non-empty variant names, unique and in first-seen order.
pub fn available_colors(variants: &[VariantRecord]) -> Vec<String> {
    let mut colors: Vec<String> = Vec::new();
    for variant in variants {
        if let Some(name) = StringUtils::non_blank(&variant.name) {
            if !colors.iter().any(|seen| seen == name) {
                colors.push(name.to_string());
            }
        }
    }
    colors
}

/// Discounted price when present and numeric, else list price, else [`DEFAULT_PRICE`].
pub fn resolve_price(variant: &VariantRecord) -> f64 {
    let red = variant.red_price_value.as_deref().and_then(parse_decimal);
    let white = variant.white_price_value.as_deref().and_then(parse_decimal);
    red.or(white).unwrap_or(DEFAULT_PRICE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(name: &str, red: Option<&str>, white: Option<&str>) -> VariantRecord {
        VariantRecord {
            key: name.to_lowercase(),
            name: name.to_string(),
            red_price_value: red.map(String::from),
            white_price_value: white.map(String::from),
        }
    }

    #[test]
    fn test_price_prefers_discount() {
        assert_eq!(resolve_price(&variant("Black", Some("19.99"), Some("29.99"))), 19.99);
    }

    #[test]
    fn test_blank_discount_uses_list_price() {
        assert_eq!(resolve_price(&variant("Black", Some(""), Some("29.99"))), 29.99);
        assert_eq!(resolve_price(&variant("Black", Some("   "), Some("29.99"))), 29.99);
        assert_eq!(resolve_price(&variant("Black", None, Some(" 29.99 "))), 29.99);
    }

    #[test]
    fn test_unparseable_prices_default_to_zero() {
        assert_eq!(resolve_price(&variant("Black", Some(""), Some(""))), 0.0);
        assert_eq!(resolve_price(&variant("Black", Some("n/a"), Some("--"))), 0.0);
        assert_eq!(resolve_price(&variant("Black", None, None)), 0.0);
    }

    #[test]
    fn test_unparseable_discount_falls_through_to_list_price() {
        assert_eq!(resolve_price(&variant("Black", Some("sale"), Some("29.99"))), 29.99);
    }

    #[test]
    fn test_available_colors_unique_in_first_seen_order() {
        let variants = vec![
            variant("Black", None, None),
            variant(" White ", None, None),
            variant("Black", None, None),
            variant("", None, None),
            variant("black", None, None),
            variant("White", None, None),
        ];

        assert_eq!(available_colors(&variants), vec!["Black", "White", "black"]);
    }

    #[test]
    fn test_case_insensitive_match() {
        let variants = vec![
            variant("White", None, Some("10")),
            variant("Dark Blue", Some("15"), Some("20")),
        ];

        let selection = VariantResolver::default().resolve(&variants, "  dark blue ").unwrap();
        assert_eq!(selection.variant.name, "Dark Blue");
        assert_eq!(selection.price, 15.0);
        assert_eq!(selection.default_color, "dark blue");
        assert_eq!(selection.source, SelectionSource::MatchedDefaultColor);
    }

    #[test]
    fn test_no_match_falls_back_to_first() {
        let variants = vec![variant("White", None, Some("10")), variant("Black", None, Some("12"))];

        let selection = VariantResolver::new(FallbackPolicy::FirstInMapping)
            .resolve(&variants, "Beige")
            .unwrap();
        assert_eq!(selection.variant.name, "White");
        assert_eq!(selection.price, 10.0);
        assert_eq!(selection.source, SelectionSource::Fallback(FallbackPolicy::FirstInMapping));

        let blank = VariantResolver::default().resolve(&variants, "   ").unwrap();
        assert_eq!(blank.variant.name, "White");
    }

    #[test]
    fn test_empty_variants_resolve_to_none() {
        assert!(VariantResolver::default().resolve(&[], "Black").is_none());
    }
}
