//! `collect` and `replay` command handlers.
//!
//! Both feed a payload stream into [`ingest`] and bound the run by the
//! configured deadline and Ctrl-C. However the run ends, the items the
//! collector accepted so far are written to CSV.

use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use futures::{future, stream, StreamExt};
use pricetrawl_core::{load_sources, AppConfig, ExtractRules, SourceConfig};
use pricetrawl_scraper::{
    ingest, read_capture, Collector, IngestStats, PayloadClient, ProductMatcher,
};

use crate::output::write_csv;

/// How a bounded ingest run ended.
#[derive(Debug)]
pub(crate) enum RunEnd {
    Finished(IngestStats),
    TimedOut,
    Interrupted,
}

/// Fetch every source in the sources file and write the accepted items.
///
/// When `dry_run` is `true` the sources are listed and nothing is fetched.
///
/// # Errors
///
/// Returns an error if the sources file is invalid, the HTTP client cannot
/// be built, every source failed to fetch, or the CSV cannot be written.
pub(crate) async fn run_collect(
    config: &AppConfig,
    sources_path: Option<PathBuf>,
    out: Option<PathBuf>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let sources_path = sources_path.unwrap_or_else(|| config.sources_path.clone());
    let out = out.unwrap_or_else(|| config.out_csv.clone());
    let sources = load_sources(&sources_path)
        .with_context(|| format!("loading sources from {}", sources_path.display()))?;

    if dry_run {
        let stdout = std::io::stdout();
        write_dry_run(&mut stdout.lock(), &sources.sources, &out)?;
        return Ok(());
    }

    let client = PayloadClient::new(
        config.request_timeout_secs,
        &config.user_agent,
        config.max_retries,
        config.retry_backoff_base_secs,
    )?;
    let urls: Vec<String> = sources.sources.iter().map(|s| s.url.clone()).collect();
    let matcher = Arc::new(ProductMatcher::new(sources.rules));
    let collector = Arc::new(Collector::new());

    let mut fetched_sources: usize = 0;
    let mut failed_sources: usize = 0;
    let payloads = client
        .fetch_all(&urls, config.max_concurrent_payloads)
        .filter_map(|(url, result)| {
            let payload = match result {
                Ok(payload) => {
                    fetched_sources += 1;
                    Some(payload)
                }
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "source fetch failed");
                    failed_sources += 1;
                    None
                }
            };
            future::ready(payload)
        });

    let end = drive(
        ingest(
            payloads,
            matcher,
            Arc::clone(&collector),
            config.max_concurrent_payloads,
        ),
        Duration::from_secs(config.run_timeout_secs),
    )
    .await;

    if failed_sources > 0 {
        tracing::warn!(
            failed_sources,
            total_sources = urls.len(),
            "some sources failed during collection"
        );
    }
    // Nothing fetched means nothing to write; keep any earlier dump intact.
    if fetched_sources == 0 {
        if failed_sources == urls.len() {
            anyhow::bail!("all {failed_sources} sources failed to fetch");
        }
        anyhow::bail!(
            "run ended before any source was fetched; {} left untouched",
            out.display()
        );
    }

    finish(&end, &collector, &out, config.run_timeout_secs)
}

fn write_dry_run<W: Write>(
    w: &mut W,
    sources: &[SourceConfig],
    out: &Path,
) -> anyhow::Result<()> {
    writeln!(
        w,
        "[dry-run] would fetch {} source(s) into {}",
        sources.len(),
        out.display()
    )?;
    for source in sources {
        writeln!(w, "  {}  {}", source.name, source.url)?;
        if let Some(notes) = source.notes.as_deref().filter(|n| !n.trim().is_empty()) {
            writeln!(w, "      {}", notes.trim())?;
        }
    }
    Ok(())
}

/// Replay an NDJSON capture file through the extraction pipeline.
///
/// # Errors
///
/// Returns an error if the capture file cannot be read or the CSV cannot
/// be written. Malformed records and payloads are skipped, not fatal.
pub(crate) async fn run_replay(
    config: &AppConfig,
    capture: &Path,
    out: Option<PathBuf>,
    rules: ExtractRules,
) -> anyhow::Result<()> {
    let out = out.unwrap_or_else(|| config.out_csv.clone());
    let payloads = read_capture(capture)
        .await
        .with_context(|| format!("reading capture {}", capture.display()))?;
    if payloads.is_empty() {
        tracing::warn!(capture = %capture.display(), "capture holds no payloads");
    }

    let collector = Arc::new(Collector::new());
    let end = drive(
        ingest(
            stream::iter(payloads),
            Arc::new(ProductMatcher::new(rules)),
            Arc::clone(&collector),
            config.max_concurrent_payloads,
        ),
        Duration::from_secs(config.run_timeout_secs),
    )
    .await;

    finish(&end, &collector, &out, config.run_timeout_secs)
}

/// Runs `run` until it completes, the deadline passes or Ctrl-C arrives.
/// The run future is dropped on the latter two, aborting its tasks.
pub(crate) async fn drive<F>(run: F, run_timeout: Duration) -> RunEnd
where
    F: Future<Output = IngestStats>,
{
    let interrupted = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for Ctrl-C; relying on the run deadline");
            future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = tokio::time::timeout(run_timeout, run) => match result {
            Ok(stats) => RunEnd::Finished(stats),
            Err(_) => RunEnd::TimedOut,
        },
        () = interrupted => RunEnd::Interrupted,
    }
}

fn finish(
    end: &RunEnd,
    collector: &Collector,
    out: &Path,
    run_timeout_secs: u64,
) -> anyhow::Result<()> {
    match end {
        RunEnd::Finished(stats) => {
            if stats.failed_tasks > 0 {
                tracing::warn!(
                    failed_tasks = stats.failed_tasks,
                    "some payload tasks did not complete"
                );
            }
        }
        RunEnd::TimedOut => {
            tracing::warn!(
                run_timeout_secs,
                "run deadline reached; writing items accepted so far"
            );
        }
        RunEnd::Interrupted => {
            tracing::warn!("interrupted; writing items accepted so far");
        }
    }

    let items = collector.snapshot();
    if items.is_empty() {
        tracing::warn!("no items extracted");
    }
    write_csv(out, &items)?;
    tracing::info!(items = items.len(), path = %out.display(), "wrote items");
    Ok(())
}

#[cfg(test)]
#[path = "collect_test.rs"]
mod tests;
