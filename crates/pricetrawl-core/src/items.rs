use serde::Serialize;

use crate::CoreError;

/// A product record extracted from a captured API payload.
///
/// Fields are private so an `Item` can only be built through [`Item::new`],
/// which guarantees that none of them is empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Item {
    name: String,
    /// Canonical decimal string, e.g. `"1234.50"`.
    price: String,
    /// Absolute product URL, or the payload's origin URL when no link could
    /// be recovered.
    url: String,
}

/// Identity of an [`Item`] for deduplication: the `(name, price, url)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey(String, String, String);

impl Item {
    /// Builds an item, collapsing whitespace runs in `name` to single spaces.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyField`] if any field is empty (after
    /// whitespace normalization for `name`, after trimming for the others).
    pub fn new(
        name: &str,
        price: impl Into<String>,
        url: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let name = normalize_space(name);
        let price = price.into();
        let url = url.into();

        if name.is_empty() {
            return Err(CoreError::EmptyField { field: "name" });
        }
        if price.trim().is_empty() {
            return Err(CoreError::EmptyField { field: "price" });
        }
        if url.trim().is_empty() {
            return Err(CoreError::EmptyField { field: "url" });
        }

        Ok(Self { name, price, url })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn price(&self) -> &str {
        &self.price
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the key under which this item is deduplicated.
    #[must_use]
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey(self.name.clone(), self.price.clone(), self.url.clone())
    }
}

/// Trims `s` and collapses every run of whitespace into a single space.
fn normalize_space(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
