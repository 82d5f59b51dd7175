use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

pub mod json_exporter;

use crate::config::ExportConfig;
use crate::error::{ScrapeError, ScrapeResult};
use crate::extract::ProductRecord;

/// Feed format of the output file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// One JSON array holding every record.
    #[default]
    Json,
    /// One JSON object per line.
    Jsonl,
}

impl std::str::FromStr for ExportFormat {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "jsonl" | "jsonlines" => Ok(ExportFormat::Jsonl),
            _ => Err(ScrapeError::config(format!("Invalid export format: {}", s))),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

/// Export statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportStats {
    pub format: ExportFormat,
    pub file_path: PathBuf,
    pub record_count: usize,
    pub file_size_bytes: u64,
    pub export_duration_ms: u64,
}

/// Output sink: collects emitted records and writes the feed file.
pub struct FeedExporter {
    format: ExportFormat,
    output_path: PathBuf,
    records: Vec<ProductRecord>,
}

impl FeedExporter {
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            format: config.format,
            output_path: config.output_path.clone(),
            records: Vec::new(),
        }
    }

    /// Hand one assembled record to the sink.
    pub fn emit(&mut self, record: ProductRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    /// Write every emitted record. An empty run still writes a valid feed.
    pub async fn finish(self) -> ScrapeResult<ExportStats> {
        let start_time = Instant::now();
        info!(
            "Exporting {} records to {} as {}",
            self.records.len(),
            self.output_path.display(),
            self.format
        );

        if let Some(parent) = self.output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let file_size_bytes = match self.format {
            ExportFormat::Json => json_exporter::export_json(&self.records, &self.output_path).await?,
            ExportFormat::Jsonl => json_exporter::export_jsonl(&self.records, &self.output_path).await?,
        };

        let stats = ExportStats {
            format: self.format,
            file_path: self.output_path,
            record_count: self.records.len(),
            file_size_bytes,
            export_duration_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            "Export completed: {} records in {}ms, file size: {} bytes",
            stats.record_count, stats.export_duration_ms, stats.file_size_bytes
        );

        Ok(stats)
    }
}
