use serde::Serialize;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::ScrapeResult;

/// Export records as one pretty-printed JSON array. Returns the file size.
pub async fn export_json<T: Serialize>(data: &[T], output_path: &Path) -> ScrapeResult<u64> {
    debug!("Exporting {} records to JSON: {}", data.len(), output_path.display());

    let json_string = serde_json::to_string_pretty(data)?;
    tokio::fs::write(output_path, json_string).await?;

    Ok(tokio::fs::metadata(output_path).await?.len())
}

/// Export records as JSON Lines. Returns the file size.
pub async fn export_jsonl<T: Serialize>(data: &[T], output_path: &Path) -> ScrapeResult<u64> {
    debug!("Exporting {} records to JSONL: {}", data.len(), output_path.display());

    let mut file = tokio::fs::File::create(output_path).await?;
    for item in data {
        let mut line = serde_json::to_string(item)?;
        line.push('\n');
        file.write_all(line.as_bytes()).await?;
    }
    file.flush().await?;

    Ok(tokio::fs::metadata(output_path).await?.len())
}
