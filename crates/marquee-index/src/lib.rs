//! Search-index client for Marquee.
//!
//! Talks to an Elasticsearch-compatible HTTP endpoint: idempotent index
//! creation with a fixed strict mapping per collection, and NDJSON bulk
//! upserts keyed by document id.

mod client;
mod schema;

pub mod error;

pub use client::{ElasticIndex, IndexConfig};
pub use error::{Error, Result};
pub use schema::{index_name, mapping};
