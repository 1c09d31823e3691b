pub mod capture;
pub mod client;
pub mod collector;
pub mod error;
pub mod link;
pub mod matcher;
pub mod pipeline;
pub mod price;
mod rate_limit;
pub mod walk;

pub use capture::read_capture;
pub use client::PayloadClient;
pub use collector::Collector;
pub use error::ScraperError;
pub use link::LinkResolver;
pub use matcher::ProductMatcher;
pub use pipeline::{extract_items, ingest, process_payload, IngestStats, Payload, PayloadOutcome};
pub use price::PriceNormalizer;
pub use walk::walk;
