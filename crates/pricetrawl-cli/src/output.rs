//! CSV export of collected items.

use std::path::Path;

use anyhow::Context;
use pricetrawl_core::Item;

const HEADER: [&str; 3] = ["name", "price", "url"];

/// Writes `items` to `path` as CSV with a `name,price,url` header, creating
/// parent directories as needed. The header is written even when `items`
/// is empty.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub(crate) fn write_csv(path: &Path, items: &[Item]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    writer.write_record(HEADER)?;
    for item in items {
        writer.write_record([item.name(), item.price(), item.url()])?;
    }
    writer.flush()?;
    Ok(())
}
