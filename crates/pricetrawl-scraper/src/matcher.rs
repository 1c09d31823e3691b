//! Heuristic recognition of product-like objects.
//!
//! An object counts as a product only when it has both a name and a
//! normalizable price. The link always ends up non-empty through the
//! fallback chain in [`ProductMatcher::match_object`].

use pricetrawl_core::{ExtractRules, Item};
use serde_json::{Map, Value};

use crate::link::LinkResolver;
use crate::price::PriceNormalizer;
use crate::walk::walk;

#[derive(Debug, Clone)]
pub struct ProductMatcher {
    rules: ExtractRules,
    prices: PriceNormalizer,
}

impl ProductMatcher {
    #[must_use]
    pub fn new(rules: ExtractRules) -> Self {
        let prices = PriceNormalizer::new(&rules);
        Self { rules, prices }
    }

    /// Walks a decoded payload and returns every product found in it, in
    /// document order. Duplicates within the payload are kept; the
    /// collector discards them.
    #[must_use]
    pub fn extract(&self, payload: &Value, origin_url: &str) -> Vec<Item> {
        let links = LinkResolver::new(origin_url);
        let mut items = Vec::new();
        walk(payload, &mut |obj| {
            if let Some(item) = self.match_object(obj, &links) {
                items.push(item);
            }
        });
        items
    }

    /// Tries to read one candidate object as a product.
    ///
    /// The link is taken from the first link key (made absolute), else
    /// synthesized as a search URL from the first identifier key, else the
    /// payload's own URL.
    #[must_use]
    pub fn match_object(&self, obj: &Map<String, Value>, links: &LinkResolver) -> Option<Item> {
        let name = pick_string(obj, &self.rules.name_keys)?;
        let price = self.prices.find_price(obj)?;

        let url = pick_string(obj, &self.rules.link_keys)
            .and_then(|link| links.resolve(link))
            .or_else(|| {
                pick_identifier(obj, &self.rules.id_keys)
                    .and_then(|id| links.search_url(&id, &self.rules.search_path))
            })
            .unwrap_or_else(|| links.origin_url().to_owned());

        match Item::new(name, price, url) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::debug!(error = %e, "discarding incomplete product match");
                None
            }
        }
    }
}

/// Returns the first value among `keys` that is a non-blank string, trimmed.
fn pick_string<'a>(obj: &'a Map<String, Value>, keys: &[String]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| obj.get(key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// Like [`pick_string`], but integer identifiers (`"id": 1042`) count too.
fn pick_identifier(obj: &Map<String, Value>, keys: &[String]) -> Option<String> {
    keys.iter().find_map(|key| match obj.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Number(n) if n.is_u64() || n.is_i64() => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
#[path = "matcher_test.rs"]
mod tests;
