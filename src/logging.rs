use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;

/// Initialize logging system
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let mut layers = Vec::new();

    if config.console_enabled {
        let console_layer = fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed();
        layers.push(console_layer);
    }

    if config.file_enabled {
        std::fs::create_dir_all(&config.log_directory)?;

        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("hm_scraper")
            .filename_suffix("log")
            .max_log_files(config.max_files)
            .build(&config.log_directory)?;

        let file_layer = if config.json_format {
            fmt::layer()
                .json()
                .with_thread_ids(true)
                .with_writer(file_appender)
                .boxed()
        } else {
            fmt::layer()
                .with_ansi(false)
                .with_writer(file_appender)
                .boxed()
        };
        layers.push(file_layer);
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()?;

    info!("Logging initialized at level {}", config.level);
    if config.file_enabled {
        info!("Log directory: {}", config.log_directory.display());
    }

    Ok(())
}

/// Structured logging context
#[derive(Debug, Clone, Serialize)]
pub struct LogContext {
    pub component: String,
    pub operation: String,
    pub request_id: Option<String>,
    pub url: Option<String>,
    pub duration_ms: Option<u64>,
    pub status: Option<String>,
    pub error_category: Option<String>,
    pub additional_fields: HashMap<String, serde_json::Value>,
}

impl LogContext {
    pub fn new(component: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            operation: operation.into(),
            request_id: None,
            url: None,
            duration_ms: None,
            status: None,
            error_category: None,
            additional_fields: HashMap::new(),
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_duration(mut self, duration: std::time::Duration) -> Self {
        self.duration_ms = Some(duration.as_millis() as u64);
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_error_category(mut self, category: impl Into<String>) -> Self {
        self.error_category = Some(category.into());
        self
    }

    pub fn with_string_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_fields
            .insert(key.into(), serde_json::Value::String(value.into()));
        self
    }

    pub fn with_number_field(mut self, key: impl Into<String>, value: impl Into<i64>) -> Self {
        self.additional_fields
            .insert(key.into(), serde_json::Value::from(value.into()));
        self
    }
}

#[macro_export]
macro_rules! log_info {
    ($context:expr, $message:expr) => {
        tracing::info!(
            component = $context.component,
            operation = $context.operation,
            request_id = $context.request_id,
            url = $context.url,
            duration_ms = $context.duration_ms,
            status = $context.status,
            additional_fields = ?$context.additional_fields,
            $message
        );
    };
}

#[macro_export]
macro_rules! log_warn {
    ($context:expr, $message:expr) => {
        tracing::warn!(
            component = $context.component,
            operation = $context.operation,
            request_id = $context.request_id,
            url = $context.url,
            duration_ms = $context.duration_ms,
            status = $context.status,
            error_category = $context.error_category,
            additional_fields = ?$context.additional_fields,
            $message
        );
    };
}

#[macro_export]
macro_rules! log_error {
    ($context:expr, $message:expr) => {
        tracing::error!(
            component = $context.component,
            operation = $context.operation,
            request_id = $context.request_id,
            url = $context.url,
            duration_ms = $context.duration_ms,
            status = $context.status,
            error_category = $context.error_category,
            additional_fields = ?$context.additional_fields,
            $message
        );
    };

    ($context:expr, $error:expr, $message:expr) => {
        tracing::error!(
            component = $context.component,
            operation = $context.operation,
            request_id = $context.request_id,
            url = $context.url,
            duration_ms = $context.duration_ms,
            status = $context.status,
            error_category = $context.error_category,
            additional_fields = ?$context.additional_fields,
            error = %$error,
            $message
        );
    };
}

/// Run identifiers for correlating the log lines of one crawl.
pub struct RequestIdGenerator;

impl RequestIdGenerator {
    pub fn generate() -> String {
        use std::sync::atomic::{AtomicU64, Ordering};
        use std::time::{SystemTime, UNIX_EPOCH};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let counter = COUNTER.fetch_add(1, Ordering::SeqCst);

        format!("run-{}-{:04}", timestamp, counter % 10000)
    }
}
