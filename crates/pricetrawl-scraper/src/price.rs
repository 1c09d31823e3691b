//! Price recognition and canonicalization.
//!
//! Storefront APIs encode prices as bare numbers, localized strings
//! (`"1 234,50 ₽"`) or small objects (`{"value": 1234.5, "currency": "RUB"}`).
//! [`PriceNormalizer`] turns all of them into one canonical decimal string:
//! ASCII digits with an optional single `.` separator.

use std::sync::LazyLock;

use pricetrawl_core::ExtractRules;
use regex::Regex;
use serde_json::{Map, Number, Value};

static CANONICAL_PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?$").expect("valid price regex"));

/// Characters used as digit-group separators in localized prices: ordinary
/// space, no-break space, narrow no-break space and thin space.
const GROUPING_SPACES: [char; 4] = [' ', '\u{a0}', '\u{202f}', '\u{2009}'];

#[derive(Debug, Clone)]
pub struct PriceNormalizer {
    price_keys: Vec<String>,
    price_containers: Vec<String>,
    container_price_keys: Vec<String>,
    price_value_keys: Vec<String>,
    /// Lowercased once so key scans only lowercase the key side.
    price_key_fragment: String,
    currency_symbols: Vec<String>,
}

impl PriceNormalizer {
    #[must_use]
    pub fn new(rules: &ExtractRules) -> Self {
        Self {
            price_keys: rules.price_keys.clone(),
            price_containers: rules.price_containers.clone(),
            container_price_keys: rules.container_price_keys.clone(),
            price_value_keys: rules.price_value_keys.clone(),
            price_key_fragment: rules.price_key_fragment.to_lowercase(),
            currency_symbols: rules
                .currency_symbols
                .iter()
                .filter(|s| !s.is_empty())
                .cloned()
                .collect(),
        }
    }

    /// Finds and normalizes the price of a candidate product object.
    ///
    /// Search order, first hit wins:
    /// 1. the configured top-level price keys, in order;
    /// 2. each price container sub-object (`price`, `prices`): its
    ///    price-like keys, then its synonym keys;
    /// 3. any own key of `obj` whose name contains the price fragment.
    #[must_use]
    pub fn find_price(&self, obj: &Map<String, Value>) -> Option<String> {
        self.price_keys
            .iter()
            .find_map(|key| obj.get(key).and_then(|v| self.normalize(v)))
            .or_else(|| {
                self.price_containers
                    .iter()
                    .filter_map(|key| obj.get(key).and_then(Value::as_object))
                    .find_map(|container| self.search_container(container))
            })
            .or_else(|| self.scan_price_like_keys(obj))
    }

    /// Normalizes a single field value, returning `None` when it is not a price.
    #[must_use]
    pub fn normalize(&self, value: &Value) -> Option<String> {
        match value {
            Value::Number(n) => normalize_number(n),
            Value::String(s) => self.normalize_str(s),
            Value::Object(inner) => self
                .price_value_keys
                .iter()
                .find_map(|key| inner.get(key))
                .and_then(|v| self.normalize(v)),
            Value::Null | Value::Bool(_) | Value::Array(_) => None,
        }
    }

    fn search_container(&self, container: &Map<String, Value>) -> Option<String> {
        self.scan_price_like_keys(container).or_else(|| {
            self.container_price_keys
                .iter()
                .find_map(|key| container.get(key).and_then(|v| self.normalize(v)))
        })
    }

    fn scan_price_like_keys(&self, obj: &Map<String, Value>) -> Option<String> {
        obj.iter()
            .filter(|(key, _)| key.to_lowercase().contains(&self.price_key_fragment))
            .find_map(|(_, v)| self.normalize(v))
    }

    fn normalize_str(&self, raw: &str) -> Option<String> {
        let mut stripped = raw.to_owned();
        for symbol in &self.currency_symbols {
            stripped = stripped.replace(symbol.as_str(), "");
        }

        let compact: String = stripped
            .trim()
            .chars()
            .filter(|c| !GROUPING_SPACES.contains(c))
            .collect();
        if compact.is_empty() {
            return None;
        }

        let canonical = compact.replace(',', ".");
        CANONICAL_PRICE.is_match(&canonical).then_some(canonical)
    }
}

/// Positive integers render as-is; positive floats drop an all-zero fraction
/// and otherwise use the shortest representation that round-trips.
fn normalize_number(n: &Number) -> Option<String> {
    if let Some(unsigned) = n.as_u64() {
        return (unsigned > 0).then(|| unsigned.to_string());
    }
    if n.is_i64() {
        // Only negative values are not also u64.
        return None;
    }

    let float = n.as_f64()?;
    if float <= 0.0 || !float.is_finite() {
        return None;
    }
    if float.fract() == 0.0 {
        Some(format!("{float:.0}"))
    } else {
        // `Display` for f64 is shortest-round-trip and never uses exponents.
        Some(float.to_string())
    }
}

#[cfg(test)]
#[path = "price_test.rs"]
mod tests;
