//! The `SourceStore` trait: read access to the relational source of truth.
//!
//! Implemented by storage backends (e.g. `marquee-store-sqlite`). The sync
//! engine depends on this abstraction, not on any concrete database.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  Transient,
  collection::{Collection, Relation},
  row::{ChangedRow, InstanceRows},
};

/// Read-only view of the normalised movie/person/genre store.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait SourceStore: Send + Sync {
  type Error: std::error::Error + Transient + Send + Sync + 'static;

  /// Rows of `collection` whose `modified` is strictly greater than `since`,
  /// ordered ascending by `modified` and truncated to `limit`.
  fn changed_since(
    &self,
    collection: Collection,
    since: DateTime<Utc>,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<ChangedRow>, Self::Error>> + Send + '_;

  /// Rows of `collection` whose `modified` equals `modified` and whose id
  /// sorts after `after_id`, ordered by id. Completes a timestamp group cut
  /// off by a `changed_since` limit.
  fn changed_at<'a>(
    &'a self,
    collection: Collection,
    modified: DateTime<Utc>,
    after_id: &'a str,
  ) -> impl Future<Output = Result<Vec<ChangedRow>, Self::Error>> + Send + 'a;

  /// Join-denormalised rows for the given ids of `collection`; one row per
  /// (entity, related row) pair.
  fn instance_rows<'a>(
    &'a self,
    collection: Collection,
    ids: &'a [String],
  ) -> impl Future<Output = Result<InstanceRows, Self::Error>> + Send + 'a;

  /// Distinct ids of `relation.target` linked through `relation.junction` to
  /// any of `source_ids`, ordered by the target's own `modified`.
  fn related_ids<'a>(
    &'a self,
    relation: Relation,
    source_ids: &'a [String],
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + 'a;
}
