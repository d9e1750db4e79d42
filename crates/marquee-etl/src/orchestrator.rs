//! The sync cycle.
//!
//! ```text
//! IDLE ─▶ GUARD_ACQUIRED ─▶ for each registered collection, in order:
//!                             EXTRACT ─▶ ASSEMBLE ─▶ CASCADE ─▶ LOAD ─▶ COMMIT
//!      ─▶ GUARD_RELEASED ─▶ SLEEP ─▶ IDLE
//! ```
//!
//! A collection with nothing newer than its watermark is skipped outright.
//! Any error stops the cycle; the guard is released on the way out so the
//! next process start is not blocked by a failure that was already reported.

use std::{future::Future, time::Duration};

use chrono::{DateTime, Utc};
use marquee_core::{Collection, index::SearchIndex, source::SourceStore};
use tracing::{error, info};

use crate::{
  BatchSink, Registration, Registry, SyncContext, SyncError, SyncSettings, WatermarkStore,
  assemble::assemble_documents, cascade, extract::extract,
};

// ─── Reports ─────────────────────────────────────────────────────────────────

/// Outcome of one collection within a cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionReport {
  pub collection: Collection,
  pub extracted:  usize,
  /// Related documents re-written by the cascade.
  pub cascaded:   usize,
  pub flushed:    usize,
  /// The committed watermark; `None` when the collection was skipped.
  pub watermark:  Option<DateTime<Utc>>,
}

impl CollectionReport {
  fn skipped(collection: Collection) -> Self {
    Self { collection, extracted: 0, cascaded: 0, flushed: 0, watermark: None }
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
  pub collections: Vec<CollectionReport>,
}

impl CycleReport {
  /// Documents written to any index during the cycle.
  pub fn written(&self) -> usize {
    self.collections.iter().map(|c| c.flushed + c.cascaded).sum()
  }

  pub fn get(&self, collection: Collection) -> Option<&CollectionReport> {
    self.collections.iter().find(|c| c.collection == collection)
  }
}

// ─── Orchestrator ────────────────────────────────────────────────────────────

pub struct Orchestrator<S, I> {
  source:   S,
  index:    I,
  registry: Registry,
  settings: SyncSettings,
  state:    WatermarkStore,
  interval: Duration,
}

impl<S: SourceStore, I: SearchIndex> Orchestrator<S, I> {
  pub fn new(
    source: S,
    index: I,
    registry: Registry,
    settings: SyncSettings,
    state: WatermarkStore,
    interval: Duration,
  ) -> Self {
    Self { source, index, registry, settings, state, interval }
  }

  pub fn source(&self) -> &S { &self.source }

  pub fn index(&self) -> &I { &self.index }

  pub fn state(&self) -> &WatermarkStore { &self.state }

  /// Run one guarded cycle over every registered collection.
  pub async fn run_cycle(&mut self) -> Result<CycleReport, SyncError> {
    self.state.acquire_run_guard().await?;

    match self.sync_all().await {
      Ok(report) => {
        self.state.release_run_guard().await?;
        info!(written = report.written(), "cycle complete");
        Ok(report)
      }
      Err(err) => {
        if let Err(release_err) = self.state.release_run_guard().await {
          error!(%release_err, "could not release run guard after failed cycle");
        }
        Err(err)
      }
    }
  }

  /// Run cycles until `shutdown` resolves or a cycle fails.
  ///
  /// `shutdown` is only observed between cycles; a cycle in progress always
  /// runs to completion.
  pub async fn run_forever(
    &mut self,
    shutdown: impl Future<Output = ()>,
  ) -> Result<(), SyncError> {
    tokio::pin!(shutdown);
    loop {
      self.run_cycle().await?;
      tokio::select! {
        _ = tokio::time::sleep(self.interval) => {}
        _ = &mut shutdown => {
          info!("shutdown requested, stopping");
          return Ok(());
        }
      }
    }
  }

  async fn sync_all(&mut self) -> Result<CycleReport, SyncError> {
    let ctx = SyncContext { source: &self.source, index: &self.index, settings: &self.settings };
    let mut report = CycleReport::default();
    for registration in self.registry.iter() {
      let outcome = sync_collection(ctx, &mut self.state, registration).await?;
      report.collections.push(outcome);
    }
    Ok(report)
  }
}

/// Extract, assemble, cascade, load and commit one collection.
async fn sync_collection<S: SourceStore, I: SearchIndex>(
  ctx: SyncContext<'_, S, I>,
  state: &mut WatermarkStore,
  registration: &Registration,
) -> Result<CollectionReport, SyncError> {
  let collection = registration.collection;
  let since = state.get(collection);

  let Some(batch) = extract(ctx, collection, since).await? else {
    return Ok(CollectionReport::skipped(collection));
  };
  let extracted = batch.ids.len();
  info!(%collection, extracted, since = %since, "changes extracted");

  let docs = assemble_documents(ctx, collection, &batch.ids).await?;

  let mut cascaded = 0;
  for hit in cascade::impacted(ctx, collection, &batch.ids).await? {
    let target = Registration::of(hit.relation.target);
    cascaded += cascade::repair(ctx, &target, &hit.ids).await?;
  }

  let mut sink =
    BatchSink::open(ctx.index, registration, ctx.settings.flush_size, &ctx.settings.retry);
  for doc in docs {
    sink.push(doc).await?;
  }
  let flushed = sink.close().await?.flushed;

  state.set(collection, batch.high_water).await?;
  info!(
    %collection,
    extracted,
    cascaded,
    flushed,
    watermark = %batch.high_water,
    "collection synced"
  );

  Ok(CollectionReport {
    collection,
    extracted,
    cascaded,
    flushed,
    watermark: Some(batch.high_water),
  })
}
