//! Concurrent fetching of many endpoints as one payload stream.

use futures::stream::{self, Stream, StreamExt};

use crate::error::ScraperError;
use crate::pipeline::Payload;

use super::PayloadClient;

impl PayloadClient {
    /// Fetches every URL in `urls` with at most `max_concurrent` requests in
    /// flight, yielding each result as soon as it completes.
    ///
    /// Results arrive in completion order, not in the order of `urls`. Each
    /// item carries the requested URL so failures can be attributed.
    pub fn fetch_all<'a>(
        &'a self,
        urls: &'a [String],
        max_concurrent: usize,
    ) -> impl Stream<Item = (&'a str, Result<Payload, ScraperError>)> + 'a {
        stream::iter(urls)
            .map(move |url| async move { (url.as_str(), self.fetch_payload(url).await) })
            .buffer_unordered(max_concurrent.max(1))
    }
}
