use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, REFERER, USER_AGENT};
use std::collections::HashMap;
use tracing::warn;

use crate::config::RequestConfig;

/// Static header set sent with every page request.
#[derive(Debug, Clone, PartialEq)]
pub struct SpoofedHeaders {
    user_agent: String,
    accept_language: String,
    accept: String,
    referer: String,
    connection: String,
}

impl SpoofedHeaders {
    pub fn from_config(config: &RequestConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            accept_language: config.accept_language.clone(),
            accept: config.accept.clone(),
            referer: config.referer.clone(),
            connection: config.connection.clone(),
        }
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Headers other than `User-Agent`, which browsers set through the context.
    ///
    /// Blank values are left out.
    pub fn extra_headers(&self) -> HashMap<String, String> {
        [
            ("Accept-Language", &self.accept_language),
            ("Accept", &self.accept),
            ("Referer", &self.referer),
            ("Connection", &self.connection),
        ]
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
    }

    /// Full header map for the HTTP client. Values that are not valid header
    /// text are skipped with a warning.
    pub fn header_map(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        let pairs: [(HeaderName, &String); 5] = [
            (USER_AGENT, &self.user_agent),
            (ACCEPT_LANGUAGE, &self.accept_language),
            (ACCEPT, &self.accept),
            (REFERER, &self.referer),
            (CONNECTION, &self.connection),
        ];

        for (name, value) in pairs {
            if value.trim().is_empty() {
                continue;
            }
            match HeaderValue::from_str(value) {
                Ok(header_value) => {
                    headers.insert(name, header_value);
                }
                Err(e) => warn!("Skipping invalid {} header value: {}", name, e),
            }
        }

        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_headers_are_spoofed() {
        let headers = SpoofedHeaders::from_config(&RequestConfig::default());

        assert!(headers.user_agent().contains("Chrome/115.0"));

        let map = headers.header_map();
        assert_eq!(map.len(), 5);
        assert!(map.get(USER_AGENT).unwrap().to_str().unwrap().starts_with("Mozilla/5.0"));
        assert_eq!(
            map.get(REFERER).unwrap().to_str().unwrap(),
            "https://www2.hm.com/bg_bg/index.html"
        );
        assert!(map.get(ACCEPT_LANGUAGE).unwrap().to_str().unwrap().starts_with("bg-BG"));
    }

    #[test]
    fn test_extra_headers_exclude_user_agent_and_blanks() {
        let mut config = RequestConfig::default();
        config.connection = "  ".to_string();

        let extra = SpoofedHeaders::from_config(&config).extra_headers();
        assert!(!extra.contains_key("User-Agent"));
        assert!(!extra.contains_key("Connection"));
        assert!(extra.contains_key("Referer"));
        assert_eq!(extra.len(), 3);
    }

    #[test]
    fn test_invalid_header_value_is_skipped() {
        let mut config = RequestConfig::default();
        config.referer = "bad\nvalue".to_string();

        let map = SpoofedHeaders::from_config(&config).header_map();
        assert!(map.get(REFERER).is_none());
        assert_eq!(map.len(), 4);
    }
}
