//! Change extraction against the collection's watermark.

use chrono::{DateTime, Utc};
use marquee_core::{Collection, source::SourceStore};
use tracing::debug;

use crate::{SyncContext, SyncError, retry::retry};

/// One extraction batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
  /// Ids in ascending `(modified, id)` order.
  pub ids:        Vec<String>,
  /// `modified` of the last row fetched; the watermark to commit once the
  /// batch is loaded.
  pub high_water: DateTime<Utc>,
}

/// Fetch up to `limit` rows of `collection` changed after `since`.
///
/// `None` when nothing changed. A full batch is extended with the rest of
/// its last timestamp group, so the batch may exceed `limit` but every row
/// at or below `high_water` has been fetched before it is committed.
pub async fn extract<S: SourceStore, I>(
  ctx: SyncContext<'_, S, I>,
  collection: Collection,
  since: DateTime<Utc>,
) -> Result<Option<Extracted>, SyncError> {
  let limit = ctx.settings.limit;
  let op = format!("extract {collection}");
  let mut rows = retry(&op, &ctx.settings.retry, move || {
    ctx.source.changed_since(collection, since, limit)
  })
  .await
  .map_err(SyncError::from_source)?;

  let Some(last) = rows.last() else {
    debug!(%collection, %since, "no changes");
    return Ok(None);
  };
  let high_water = last.modified;

  if rows.len() >= limit {
    let last_id = last.id.clone();
    let after_id = last_id.as_str();
    let rest = retry(&op, &ctx.settings.retry, move || {
      ctx.source.changed_at(collection, high_water, after_id)
    })
    .await
    .map_err(SyncError::from_source)?;
    if !rest.is_empty() {
      debug!(%collection, %high_water, extra = rest.len(), "completed boundary group");
    }
    rows.extend(rest);
  }

  let ids = rows.into_iter().map(|r| r.id).collect();
  Ok(Some(Extracted { ids, high_water }))
}
