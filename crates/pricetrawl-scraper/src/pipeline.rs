//! Per-payload extraction and the concurrent ingest loop feeding the
//! [`Collector`].

use std::sync::Arc;

use futures::{Stream, StreamExt};
use pricetrawl_core::{ExtractRules, Item};
use serde_json::Value;
use tokio::task::{JoinError, JoinSet};

use crate::collector::Collector;
use crate::error::ScraperError;
use crate::matcher::ProductMatcher;

/// One captured API response: raw body plus the URL of the request that
/// produced it.
#[derive(Debug, Clone)]
pub struct Payload {
    pub origin_url: String,
    pub body: Vec<u8>,
}

impl Payload {
    #[must_use]
    pub fn new(origin_url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            origin_url: origin_url.into(),
            body: body.into(),
        }
    }
}

/// What a single payload contributed to the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PayloadOutcome {
    /// Product matches found in the payload, duplicates included.
    pub extracted: usize,
    /// Matches the collector had not seen before.
    pub accepted: usize,
}

/// One-shot extraction over an already decoded document.
#[must_use]
pub fn extract_items(value: &Value, origin_url: &str, rules: &ExtractRules) -> Vec<Item> {
    ProductMatcher::new(rules.clone()).extract(value, origin_url)
}

/// Decodes one payload, extracts its products and offers them to the
/// collector in one batch.
///
/// All items are extracted before any is offered, so a payload either
/// contributes everything it matched or nothing.
///
/// # Errors
///
/// Returns [`ScraperError::Deserialize`] if the body is not valid JSON.
pub fn process_payload(
    payload: &Payload,
    matcher: &ProductMatcher,
    collector: &Collector,
) -> Result<PayloadOutcome, ScraperError> {
    let value: Value =
        serde_json::from_slice(&payload.body).map_err(|e| ScraperError::Deserialize {
            context: format!("payload from {}", payload.origin_url),
            source: e,
        })?;

    let items = matcher.extract(&value, &payload.origin_url);
    let extracted = items.len();
    let accepted = collector.offer_all(items);

    tracing::debug!(
        origin_url = %payload.origin_url,
        extracted,
        accepted,
        "payload processed"
    );

    Ok(PayloadOutcome {
        extracted,
        accepted,
    })
}

/// Origin URL of the payload and its processing result.
type TaskOutput = (String, Result<PayloadOutcome, ScraperError>);

/// Totals across every payload handled by [`ingest`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub payloads: usize,
    pub malformed: usize,
    pub failed_tasks: usize,
    pub extracted: usize,
    pub accepted: usize,
}

impl IngestStats {
    fn record(&mut self, joined: Result<TaskOutput, JoinError>) {
        self.payloads += 1;
        match joined {
            Ok((_, Ok(outcome))) => {
                self.extracted += outcome.extracted;
                self.accepted += outcome.accepted;
            }
            Ok((origin_url, Err(e))) => {
                tracing::warn!(origin_url = %origin_url, error = %e, "skipping malformed payload");
                self.malformed += 1;
            }
            Err(e) => {
                tracing::error!(error = %e, "payload task did not complete");
                self.failed_tasks += 1;
            }
        }
    }
}

/// Processes payloads as they arrive on `payloads`, each on its own task,
/// with at most `max_concurrent` tasks in flight.
///
/// Malformed payloads are logged and counted, never fatal. Dropping the
/// returned future (e.g. on a run timeout) aborts every in-flight task;
/// those payloads contribute nothing to the collector.
pub async fn ingest<S>(
    payloads: S,
    matcher: Arc<ProductMatcher>,
    collector: Arc<Collector>,
    max_concurrent: usize,
) -> IngestStats
where
    S: Stream<Item = Payload>,
{
    let max_concurrent = max_concurrent.max(1);
    let mut tasks = JoinSet::new();
    let mut stats = IngestStats::default();

    let mut payloads = std::pin::pin!(payloads);
    while let Some(payload) = payloads.next().await {
        while tasks.len() >= max_concurrent {
            if let Some(joined) = tasks.join_next().await {
                stats.record(joined);
            }
        }

        let matcher = Arc::clone(&matcher);
        let collector = Arc::clone(&collector);
        tasks.spawn(async move {
            let outcome = process_payload(&payload, &matcher, &collector);
            (payload.origin_url, outcome)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        stats.record(joined);
    }

    tracing::info!(
        payloads = stats.payloads,
        malformed = stats.malformed,
        extracted = stats.extracted,
        accepted = stats.accepted,
        "ingest finished"
    );

    stats
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
