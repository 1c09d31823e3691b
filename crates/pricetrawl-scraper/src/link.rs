//! Product link reconstruction relative to the payload's request URL.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left unescaped in a query value: RFC 3986 unreserved set.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Resolves product links found in one payload.
///
/// Built once per payload from the URL of the request that produced it.
#[derive(Debug, Clone)]
pub struct LinkResolver {
    origin_url: String,
    origin: Option<String>,
}

impl LinkResolver {
    #[must_use]
    pub fn new(origin_url: &str) -> Self {
        let origin = extract_origin(origin_url);
        if origin.is_none() {
            tracing::debug!(
                origin_url,
                "payload URL has no usable origin; relative links will not be resolved"
            );
        }
        Self {
            origin_url: origin_url.to_owned(),
            origin,
        }
    }

    /// The full URL of the payload's request; last link fallback.
    #[must_use]
    pub fn origin_url(&self) -> &str {
        &self.origin_url
    }

    /// `scheme://host[:port]` of the payload URL, if it could be parsed.
    #[must_use]
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Makes an extracted link absolute.
    ///
    /// Root-relative links (`/p/123`) are prefixed with the origin; any other
    /// link is returned unchanged. Returns `None` for a root-relative link
    /// when the origin is unknown, so the caller can try its next fallback.
    #[must_use]
    pub fn resolve(&self, link: &str) -> Option<String> {
        if link.starts_with('/') {
            self.origin.as_ref().map(|origin| format!("{origin}{link}"))
        } else {
            Some(link.to_owned())
        }
    }

    /// Builds a storefront search URL for a product identifier, e.g.
    /// `https://shop.example/search/?q=SKU%2042`.
    #[must_use]
    pub fn search_url(&self, id: &str, search_path: &str) -> Option<String> {
        self.origin.as_ref().map(|origin| {
            format!(
                "{origin}{search_path}{}",
                utf8_percent_encode(id, QUERY_VALUE)
            )
        })
    }
}

/// Extracts `scheme://host[:port]` from an absolute URL.
///
/// Returns `None` when the URL does not parse or has no host
/// (e.g. `mailto:` or `data:` URLs).
#[must_use]
pub fn extract_origin(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(match parsed.port() {
        Some(port) => format!("{}://{host}:{port}", parsed.scheme()),
        None => format!("{}://{host}", parsed.scheme()),
    })
}
