//! Field-name heuristics used to recognize product objects in arbitrary JSON.
//!
//! The defaults cover the key spellings seen across common storefront APIs.
//! Every list can be overridden from the `rules:` section of `sources.yaml`;
//! lists that are omitted keep their defaults.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractRules {
    /// Keys probed, in order, for the product name.
    pub name_keys: Vec<String>,
    /// Top-level keys probed, in order, for a price value.
    pub price_keys: Vec<String>,
    /// Keys whose object value is searched as a nested price container.
    pub price_containers: Vec<String>,
    /// Synonym keys tried inside a price container after the
    /// `price_key_fragment` scan.
    pub container_price_keys: Vec<String>,
    /// Keys read from an object that is itself a price value,
    /// e.g. `{"value": 10, "currency": "RUB"}`.
    pub price_value_keys: Vec<String>,
    /// Case-insensitive substring marking a key as price-bearing.
    pub price_key_fragment: String,
    /// Keys probed, in order, for a product link.
    pub link_keys: Vec<String>,
    /// Keys probed, in order, for an identifier used to synthesize a link.
    pub id_keys: Vec<String>,
    /// Currency glyphs stripped from string prices.
    pub currency_symbols: Vec<String>,
    /// Path appended to the payload origin, followed by the encoded
    /// identifier, when a link has to be synthesized.
    pub search_path: String,
}

fn owned(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| (*k).to_owned()).collect()
}

impl Default for ExtractRules {
    fn default() -> Self {
        Self {
            name_keys: owned(&["name", "title", "productName", "displayName"]),
            price_keys: owned(&[
                "price",
                "currentPrice",
                "regularPrice",
                "value",
                "amount",
                "salePrice",
                "priceValue",
            ]),
            price_containers: owned(&["price", "prices"]),
            container_price_keys: owned(&["value", "current", "regular", "amount"]),
            price_value_keys: owned(&["value", "amount"]),
            price_key_fragment: "price".to_owned(),
            link_keys: owned(&["url", "link", "productUrl", "href", "slug"]),
            id_keys: owned(&["id", "productId", "code", "sku"]),
            currency_symbols: owned(&["₽"]),
            search_path: "/search/?q=".to_owned(),
        }
    }
}

impl ExtractRules {
    /// Checks that the lists a match cannot succeed without are non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the first empty setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("name_keys", self.name_keys.is_empty()),
            ("price_keys", self.price_keys.is_empty()),
            ("price_key_fragment", self.price_key_fragment.trim().is_empty()),
        ];
        if let Some((field, _)) = required.iter().find(|(_, empty)| *empty) {
            return Err(ConfigError::Validation(format!(
                "rules.{field} must not be empty"
            )));
        }

        if !self.search_path.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "rules.search_path must start with '/', got \"{}\"",
                self.search_path
            )));
        }

        Ok(())
    }
}
