//! Replay of payloads captured outside this tool (e.g. exported from a
//! browser session).
//!
//! The capture format is NDJSON, one response per line:
//!
//! ```text
//! {"url": "https://shop.example/api/catalog?page=1", "body": "{\"items\": []}"}
//! {"url": "https://shop.example/api/catalog?page=2", "body": {"items": []}}
//! ```
//!
//! `body` is either the raw response text or an inline JSON document. Raw
//! text is kept byte-for-byte so that malformed responses are replayed (and
//! skipped by the pipeline) exactly as they were captured.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ScraperError;
use crate::pipeline::Payload;

#[derive(Debug, Deserialize)]
struct CaptureRecord {
    url: String,
    body: CaptureBody,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CaptureBody {
    Raw(String),
    Inline(Value),
}

/// Reads every payload from an NDJSON capture file.
///
/// Blank lines are ignored. Lines that are not a valid capture record are
/// logged and skipped; they do not fail the whole file.
///
/// # Errors
///
/// Returns [`ScraperError::Capture`] if the file cannot be read.
pub async fn read_capture(path: &Path) -> Result<Vec<Payload>, ScraperError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ScraperError::Capture {
            path: path.display().to_string(),
            source: e,
        })?;

    Ok(parse_capture(&content, &path.display().to_string()))
}

fn parse_capture(content: &str, source_name: &str) -> Vec<Payload> {
    let mut payloads = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let record = match serde_json::from_str::<CaptureRecord>(line) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(
                    capture = source_name,
                    line = idx + 1,
                    error = %e,
                    "skipping unreadable capture record"
                );
                continue;
            }
        };

        let body = match record.body {
            CaptureBody::Raw(text) => text.into_bytes(),
            CaptureBody::Inline(value) => value.to_string().into_bytes(),
        };
        payloads.push(Payload::new(record.url, body));
    }

    payloads
}
