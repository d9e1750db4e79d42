//! The `SearchIndex` trait: write access to the document index.

use std::future::Future;

use serde_json::Value;

use crate::{Transient, document::Document};

/// A document index with one named index per collection.
pub trait SearchIndex: Send + Sync {
  type Error: std::error::Error + Transient + Send + Sync + 'static;

  /// Create `index` with `schema` unless it already exists. Idempotent.
  fn ensure_index<'a>(
    &'a self,
    index: &'a str,
    schema: &'a Value,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Upsert `docs` into `index` keyed by [`Document::id`]; an existing
  /// document with the same id is fully replaced.
  ///
  /// Returns the number of documents accepted. Any per-document rejection is
  /// an error, never a silent drop.
  fn bulk_upsert<'a>(
    &'a self,
    index: &'a str,
    docs: &'a [Document],
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;
}
