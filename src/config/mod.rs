use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;
use url::Url;

use crate::export::ExportFormat;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "HM_SCRAPER_CONFIG";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub target: TargetConfig,
    pub request: RequestConfig,
    pub selectors: SelectorConfig,
    pub reviews: ReviewConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TargetConfig {
    pub spider_name: String,
    pub start_urls: Vec<String>,
    pub allowed_domains: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RequestConfig {
    pub user_agent: String,
    pub accept_language: String,
    pub accept: String,
    pub referer: String,
    pub connection: String,
    pub navigation_timeout_ms: u64,
    pub headless: bool,
}

/// CSS selectors tuned to the product page markup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SelectorConfig {
    pub next_data_script: String,
    pub default_color: String,
    pub review_trigger: String,
    pub review_revealed: String,
    pub review_count: String,
    pub review_score: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReviewConfig {
    pub enabled: bool,
    pub reveal_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    pub format: ExportFormat,
    pub output_path: PathBuf,
    pub debug_dump_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file_enabled: bool,
    pub console_enabled: bool,
    pub json_format: bool,
    pub max_files: usize,
    pub log_directory: PathBuf,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            spider_name: "hm_product".to_string(),
            start_urls: vec![
                "https://www2.hm.com/bg_bg/productpage.1274171085.html".to_string(),
            ],
            allowed_domains: vec!["www2.hm.com".to_string()],
        }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0 Safari/537.36".to_string(),
            accept_language: "bg-BG,bg;q=0.9,en-US;q=0.8,en;q=0.7".to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8".to_string(),
            referer: "https://www2.hm.com/bg_bg/index.html".to_string(),
            connection: "keep-alive".to_string(),
            navigation_timeout_ms: 30_000,
            headless: true,
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            next_data_script: "script#__NEXT_DATA__".to_string(),
            default_color: r#"section[data-testid="color-selector"] p"#.to_string(),
            review_trigger: r#"[data-testid="reviews-summary"] button"#.to_string(),
            review_revealed: r#"[data-testid="reviews-drawer"]"#.to_string(),
            review_count: r#"[data-testid="reviews-drawer"] button[data-testid="reviews-tab"]"#.to_string(),
            review_score: r#"[data-testid="reviews-drawer"] [data-testid="average-rating"]"#.to_string(),
        }
    }
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reveal_timeout_ms: 5_000,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Json,
            output_path: PathBuf::from("product_data.json"),
            debug_dump_path: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_enabled: false,
            console_enabled: true,
            json_format: false,
            max_files: 5,
            log_directory: PathBuf::from("logs"),
        }
    }
}

impl AppConfig {
    /// Load configuration from default locations and apply environment overrides.
    ///
    /// Lookup order is `$HM_SCRAPER_CONFIG`, `./hm_scraper.toml`, then the
    /// platform config directory. Built-in defaults apply when none exist.
    pub async fn load() -> Result<Self> {
        let mut config = match find_config_file() {
            Some(path) => Self::load_from_file(&path).await?,
            None => {
                info!("No configuration file found, using defaults");
                Self::default()
            }
        };

        ConfigOverrides::apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from specific file
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        let config = Self::from_toml(&content)?;

        info!("Configuration loaded from: {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.target.start_urls.is_empty() {
            return Err(anyhow::anyhow!("At least one start URL must be configured"));
        }

        for raw in &self.target.start_urls {
            Url::parse(raw).map_err(|e| anyhow::anyhow!("Invalid start URL '{}': {}", raw, e))?;
        }

        if self.request.user_agent.trim().is_empty() {
            return Err(anyhow::anyhow!("A user agent must be configured"));
        }

        if self.request.navigation_timeout_ms == 0 {
            return Err(anyhow::anyhow!("Request navigation_timeout_ms must be > 0"));
        }

        if self.reviews.reveal_timeout_ms == 0 {
            return Err(anyhow::anyhow!("Reviews reveal_timeout_ms must be > 0"));
        }

        let selectors = [
            ("next_data_script", &self.selectors.next_data_script),
            ("default_color", &self.selectors.default_color),
            ("review_trigger", &self.selectors.review_trigger),
            ("review_revealed", &self.selectors.review_revealed),
            ("review_count", &self.selectors.review_count),
            ("review_score", &self.selectors.review_score),
        ];
        for (name, selector) in selectors {
            if selector.trim().is_empty() {
                return Err(anyhow::anyhow!("Selector '{}' must not be empty", name));
            }
            scraper::Selector::parse(selector)
                .map_err(|e| anyhow::anyhow!("Invalid selector '{}': {:?}", name, e))?;
        }

        Ok(())
    }

}

/// Offsite check: the host must equal an allowed domain or be a subdomain of
/// one. An empty list allows every host.
pub fn is_allowed_domain(allowed_domains: &[String], url: &Url) -> bool {
    if allowed_domains.is_empty() {
        return true;
    }

    let host = match url.host_str() {
        Some(host) => host.to_ascii_lowercase(),
        None => return false,
    };

    allowed_domains.iter().any(|domain| {
        let domain = domain.trim().to_ascii_lowercase();
        host == domain || host.ends_with(&format!(".{}", domain))
    })
}

fn find_config_file() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(explicit));
    }

    let local = PathBuf::from("hm_scraper.toml");
    if local.exists() {
        return Some(local);
    }

    directories::ProjectDirs::from("com", "hm", "scraper")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .filter(|path| path.exists())
}

/// Environment-based configuration overrides
pub struct ConfigOverrides;

impl ConfigOverrides {
    /// Apply environment variable overrides to configuration
    pub fn apply(config: &mut AppConfig) {
        Self::apply_from(config, |key| std::env::var(key).ok());
    }

    fn apply_from<F>(config: &mut AppConfig, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(urls) = lookup("HM_SCRAPER_START_URLS") {
            config.target.start_urls = urls
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }

        if let Some(user_agent) = lookup("HM_SCRAPER_USER_AGENT") {
            config.request.user_agent = user_agent;
        }

        if let Some(headless) = lookup("HM_SCRAPER_HEADLESS") {
            config.request.headless = headless.to_lowercase() != "false";
        }

        if let Some(timeout) = lookup("HM_SCRAPER_REVEAL_TIMEOUT_MS").and_then(|s| s.parse().ok()) {
            config.reviews.reveal_timeout_ms = timeout;
        }

        if let Some(format) = lookup("HM_SCRAPER_FORMAT").and_then(|s| s.parse().ok()) {
            config.export.format = format;
        }

        if let Some(output) = lookup("HM_SCRAPER_OUTPUT") {
            config.export.output_path = PathBuf::from(output);
        }

        if let Some(log_level) = lookup("HM_SCRAPER_LOG_LEVEL") {
            config.logging.level = log_level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.target.start_urls.len(), 1);
        assert_eq!(config.reviews.reveal_timeout_ms, 5_000);
        assert_eq!(config.export.format, ExportFormat::Json);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [export]
            format = "jsonl"
            output_path = "out.jsonl"

            [reviews]
            reveal_timeout_ms = 2500
            "#,
        )
        .unwrap();

        assert_eq!(config.export.format, ExportFormat::Jsonl);
        assert_eq!(config.export.output_path, PathBuf::from("out.jsonl"));
        assert_eq!(config.reviews.reveal_timeout_ms, 2500);
        assert!(config.reviews.enabled);
        assert_eq!(config.target.spider_name, "hm_product");
    }

    #[test]
    fn test_unparsable_start_url_rejected() {
        let mut config = AppConfig::default();
        config.target.start_urls = vec!["not a url".to_string()];
        assert!(config.validate().is_err());

        config.target.start_urls.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_offsite_url_is_not_allowed() {
        let domains = AppConfig::default().target.allowed_domains;
        assert!(!is_allowed_domain(&domains, &Url::parse("https://example.com/product.html").unwrap()));
        assert!(is_allowed_domain(&domains, &Url::parse("https://www2.hm.com/bg_bg/productpage.1.html").unwrap()));
        assert!(is_allowed_domain(&[], &Url::parse("https://example.com/").unwrap()));
    }

    #[test]
    fn test_subdomain_is_allowed() {
        let domains = vec!["hm.com".to_string()];
        assert!(is_allowed_domain(&domains, &Url::parse("https://www2.hm.com/bg_bg/").unwrap()));
        assert!(!is_allowed_domain(&domains, &Url::parse("https://nothm.com/").unwrap()));
    }

    #[test]
    fn test_invalid_selector_rejected() {
        let mut config = AppConfig::default();
        config.selectors.review_score = "[[".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("HM_SCRAPER_FORMAT", "jsonl"),
            ("HM_SCRAPER_REVEAL_TIMEOUT_MS", "1200"),
            ("HM_SCRAPER_HEADLESS", "false"),
            ("HM_SCRAPER_LOG_LEVEL", "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        ConfigOverrides::apply_from(&mut config, |key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.export.format, ExportFormat::Jsonl);
        assert_eq!(config.reviews.reveal_timeout_ms, 1200);
        assert!(!config.request.headless);
        assert_eq!(config.logging.level, "debug");
    }
}
