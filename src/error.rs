use thiserror::Error;

/// Reasons a page yields no record at all.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("Could not find __NEXT_DATA__ script tag")]
    MissingScript,

    #[error("__NEXT_DATA__ is not valid JSON: {message}")]
    InvalidJson { message: String },

    #[error("Product data not found in JSON: missing key '{key}'")]
    MissingKey { key: String },

    #[error("Product data has an unexpected shape: {message}")]
    InvalidShape { message: String },

    #[error("No variations found")]
    NoVariations,
}

/// Error types for the product scraper
#[derive(Error, Debug)]
pub enum ScrapeError {
    // Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    // Network errors
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("HTTP request failed: {url} - {status}")]
    HttpRequest { url: String, status: u16 },

    #[error("Navigation timed out: {url}")]
    Timeout { url: String },

    // Browser errors
    #[error("Browser error: {message}")]
    Browser { message: String },

    #[error("Interaction not supported by this session: {action}")]
    InteractionUnsupported { action: String },

    // Extraction errors
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    // Export errors
    #[error("Export error: {message}")]
    Export { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScrapeError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    /// Create a browser error
    pub fn browser(message: impl Into<String>) -> Self {
        Self::Browser { message: message.into() }
    }

    /// Create an export error
    pub fn export(message: impl Into<String>) -> Self {
        Self::Export { message: message.into() }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::Network { .. } | Self::HttpRequest { .. } | Self::Timeout { .. } => "network",
            Self::Browser { .. } | Self::InteractionUnsupported { .. } => "browser",
            Self::Extraction(_) => "extraction",
            Self::Export { .. } | Self::Io(_) => "export",
        }
    }
}

impl From<reqwest::Error> for ScrapeError {
    fn from(err: reqwest::Error) -> Self {
        match err.url() {
            Some(url) if err.is_timeout() => Self::Timeout { url: url.to_string() },
            _ => Self::network(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ScrapeError {
    fn from(err: serde_json::Error) -> Self {
        Self::export(err.to_string())
    }
}

pub type ScrapeResult<T> = Result<T, ScrapeError>;
