//! `extract` command handler: one JSON document in, JSON lines out.

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use pricetrawl_core::{ExtractRules, Item};
use pricetrawl_scraper::{extract_items, Collector};

/// Extracts the distinct items of `file` and prints one JSON object per
/// line on stdout.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not JSON, or stdout
/// cannot be written.
pub(crate) fn run_extract(origin: &str, file: &Path, rules: &ExtractRules) -> anyhow::Result<()> {
    let raw = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let value: serde_json::Value = serde_json::from_slice(&raw)
        .with_context(|| format!("{} is not valid JSON", file.display()))?;

    let collector = Collector::new();
    let accepted = collector.offer_all(extract_items(&value, origin, rules));
    let items = collector.into_items();
    tracing::info!(origin = %origin, items = accepted, "extraction finished");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_json_lines(&mut out, &items)?;
    out.flush()?;
    Ok(())
}

fn write_json_lines<W: Write>(out: &mut W, items: &[Item]) -> anyhow::Result<()> {
    for item in items {
        serde_json::to_writer(&mut *out, item)?;
        writeln!(out)?;
    }
    Ok(())
}
