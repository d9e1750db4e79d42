//! Buffered bulk writer bound to one index.
//!
//! Documents are pushed one at a time; every `batch_size` pushes trigger a
//! bulk write, and [`BatchSink::close`] writes the remainder. `push` awaits
//! the flush it triggers, so the producer never runs more than one batch
//! ahead of the index.

use marquee_core::{Document, index::SearchIndex};
use tracing::{debug, warn};

use crate::{Registration, RetryPolicy, SyncError, retry::retry};

/// Totals reported by [`BatchSink::close`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkStats {
  pub flushed: usize,
  pub batches: usize,
}

pub struct BatchSink<'a, I> {
  index:        &'a I,
  target:       &'a Registration,
  batch_size:   usize,
  retry:        &'a RetryPolicy,
  buffer:       Vec<Document>,
  index_exists: bool,
  stats:        SinkStats,
}

impl<'a, I: SearchIndex> BatchSink<'a, I> {
  /// Bind a sink to `target`'s index. Nothing is sent until the first flush.
  pub fn open(
    index: &'a I,
    target: &'a Registration,
    batch_size: usize,
    retry: &'a RetryPolicy,
  ) -> Self {
    let batch_size = batch_size.max(1);
    Self {
      index,
      target,
      batch_size,
      retry,
      buffer: Vec::with_capacity(batch_size),
      index_exists: false,
      stats: SinkStats::default(),
    }
  }

  pub fn pending(&self) -> usize { self.buffer.len() }

  pub async fn push(&mut self, doc: Document) -> Result<(), SyncError> {
    self.buffer.push(doc);
    if self.buffer.len() >= self.batch_size {
      self.flush().await?;
    }
    Ok(())
  }

  /// Write the buffered documents, creating the index first if needed.
  ///
  /// On failure the buffer is kept, so no document leaves the sink without
  /// either being accepted by the index or surfacing an error.
  pub async fn flush(&mut self) -> Result<(), SyncError> {
    if self.buffer.is_empty() {
      return Ok(());
    }
    self.ensure_index().await?;

    let index = self.index;
    let name = self.target.index;
    let docs = &self.buffer;
    let accepted = retry(&format!("bulk {name}"), self.retry, move || {
      index.bulk_upsert(name, docs)
    })
    .await
    .map_err(SyncError::from_index)?;

    self.stats.flushed += accepted;
    self.stats.batches += 1;
    debug!(index = name, docs = accepted, "batch flushed");
    self.buffer.clear();
    Ok(())
  }

  /// Flush the remainder and release the binding.
  pub async fn close(mut self) -> Result<SinkStats, SyncError> {
    self.flush().await?;
    Ok(self.stats)
  }

  async fn ensure_index(&mut self) -> Result<(), SyncError> {
    if self.index_exists {
      return Ok(());
    }
    let index = self.index;
    let name = self.target.index;
    let schema = &self.target.schema;
    retry(&format!("ensure {name}"), self.retry, move || index.ensure_index(name, schema))
      .await
      .map_err(SyncError::from_index)?;
    self.index_exists = true;
    Ok(())
  }
}

impl<I> Drop for BatchSink<'_, I> {
  fn drop(&mut self) {
    if !self.buffer.is_empty() {
      warn!(
        index = self.target.index,
        unflushed = self.buffer.len(),
        "batch sink dropped with unflushed documents"
      );
    }
  }
}
