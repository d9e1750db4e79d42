//! Document assembly: instance rows fetched from the source, grouped into
//! one document per id.

use marquee_core::{Collection, Document, assemble::assemble, source::SourceStore};

use crate::{SyncContext, SyncError, retry::retry};

/// Build the documents of `collection` for `ids`. Used for both changed and
/// cascaded ids, so document shape has a single definition.
pub async fn assemble_documents<S: SourceStore, I>(
  ctx: SyncContext<'_, S, I>,
  collection: Collection,
  ids: &[String],
) -> Result<Vec<Document>, SyncError> {
  if ids.is_empty() {
    return Ok(Vec::new());
  }
  let rows = retry(&format!("assemble {collection}"), &ctx.settings.retry, move || {
    ctx.source.instance_rows(collection, ids)
  })
  .await
  .map_err(SyncError::from_source)?;
  Ok(assemble(rows))
}
