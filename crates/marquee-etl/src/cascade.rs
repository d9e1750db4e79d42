//! One-hop cascade through junction tables.
//!
//! When rows of a collection change, every document of a related collection
//! that embeds them is stale. The related ids are found through the junction
//! table and their documents are rebuilt and re-written. Only direct
//! neighbours are visited, and the related collection's own watermark is
//! left alone: a repair says nothing about rows of that collection that
//! changed on their own.

use marquee_core::{Collection, Relation, index::SearchIndex, source::SourceStore};
use tracing::{debug, info};

use crate::{
  BatchSink, Registration, SyncContext, SyncError, assemble::assemble_documents, retry::retry,
};

/// Ids of `relation.target` reached from a set of changed ids.
#[derive(Debug, Clone, PartialEq)]
pub struct Impacted {
  pub relation: Relation,
  pub ids:      Vec<String>,
}

/// For every relation declared on `collection`, the distinct related ids
/// linked to `changed_ids`, ordered by the related rows' `modified`.
/// Relations with no linked ids are omitted.
pub async fn impacted<S: SourceStore, I>(
  ctx: SyncContext<'_, S, I>,
  collection: Collection,
  changed_ids: &[String],
) -> Result<Vec<Impacted>, SyncError> {
  let mut out = Vec::new();
  if changed_ids.is_empty() {
    return Ok(out);
  }

  for &relation in collection.relations() {
    let op = format!("cascade {} -> {}", relation.source, relation.target);
    let ids = retry(&op, &ctx.settings.retry, move || {
      ctx.source.related_ids(relation, changed_ids)
    })
    .await
    .map_err(SyncError::from_source)?;

    debug!(from = %relation.source, to = %relation.target, impacted = ids.len(), "cascade");
    if !ids.is_empty() {
      out.push(Impacted { relation, ids });
    }
  }
  Ok(out)
}

/// Rebuild and re-write the documents of `target` for `ids`, assembling at
/// most `limit` ids at a time. Returns the number of documents written.
pub async fn repair<S: SourceStore, I: SearchIndex>(
  ctx: SyncContext<'_, S, I>,
  target: &Registration,
  ids: &[String],
) -> Result<usize, SyncError> {
  let mut sink =
    BatchSink::open(ctx.index, target, ctx.settings.flush_size, &ctx.settings.retry);

  for chunk in ids.chunks(ctx.settings.limit.max(1)) {
    for doc in assemble_documents(ctx, target.collection, chunk).await? {
      sink.push(doc).await?;
    }
  }

  let stats = sink.close().await?;
  info!(collection = %target.collection, cascaded = stats.flushed, "repair written");
  Ok(stats.flushed)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{SyncSettings, testing::*};

  fn ids(v: &[&str]) -> Vec<String> { v.iter().map(|s| s.to_string()).collect() }

  #[tokio::test]
  async fn genre_change_reaches_only_movies() {
    let s = source().await;
    let index = MemoryIndex::default();
    let settings = SyncSettings::default();
    insert_movie(&s, "m1", "Alpha", ts(1)).await;
    insert_genre(&s, "g1", "Drama", ts(1)).await;
    insert_person(&s, "p1", "Ann", ts(1)).await;
    tag(&s, "m1", "g1").await;
    credit(&s, "m1", "p1", "actor").await;

    let ctx = SyncContext { source: &s, index: &index, settings: &settings };
    let found = impacted(ctx, Collection::Genre, &ids(&["g1"])).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].relation.target, Collection::Movie);
    assert_eq!(found[0].ids, ids(&["m1"]));
  }

  #[tokio::test]
  async fn unlinked_change_impacts_nothing() {
    let s = source().await;
    let index = MemoryIndex::default();
    let settings = SyncSettings::default();
    insert_person(&s, "p1", "Ann", ts(1)).await;

    let ctx = SyncContext { source: &s, index: &index, settings: &settings };
    assert!(impacted(ctx, Collection::Person, &ids(&["p1"])).await.unwrap().is_empty());
    assert!(impacted(ctx, Collection::Person, &[]).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn repair_assembles_in_chunks_of_limit() {
    let s = source().await;
    let index = MemoryIndex::default();
    let settings = SyncSettings { limit: 2, flush_size: 10, ..SyncSettings::default() };
    let mut wanted = Vec::new();
    for i in 0..5 {
      let id = format!("m{i}");
      insert_movie(&s, &id, &format!("Movie {i}"), ts(i)).await;
      wanted.push(id);
    }

    let ctx = SyncContext { source: &s, index: &index, settings: &settings };
    let written = repair(ctx, &Registration::of(Collection::Movie), &wanted).await.unwrap();
    assert_eq!(written, 5);
    // Chunked assembly, but one sink: a single flush on close.
    assert_eq!(index.batch_sizes(), vec![5]);
    assert_eq!(index.written("movies"), wanted);
  }
}
