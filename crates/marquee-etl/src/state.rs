//! The persisted watermark record and run guard.
//!
//! One small JSON file holds, per collection, the `modified` timestamp of
//! the last row committed to the index, plus a top-level `etl_process` flag:
//!
//! ```json
//! {
//!   "etl_process": "stopped",
//!   "movie": { "modified": "2024-03-01T12:00:00.000001Z" },
//!   "person": { "modified": "2024-02-11T08:30:00Z" }
//! }
//! ```
//!
//! Every write goes to a sibling `*.tmp` file that is then renamed over the
//! record, so a crash mid-write leaves the previous record intact.

use std::{
  collections::BTreeMap,
  ffi::OsString,
  io::ErrorKind,
  path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use marquee_core::{Collection, watermark_floor};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::SyncError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessState {
  Started,
  #[default]
  Stopped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionState {
  pub modified: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateRecord {
  #[serde(default)]
  pub etl_process: ProcessState,
  #[serde(flatten)]
  pub collections: BTreeMap<String, CollectionState>,
}

/// File-backed watermark store. Owned by exactly one orchestrator.
#[derive(Debug)]
pub struct WatermarkStore {
  path:   PathBuf,
  record: StateRecord,
}

impl WatermarkStore {
  /// Load the record at `path`; a missing file is an empty record.
  pub async fn open(path: impl Into<PathBuf>) -> Result<Self, SyncError> {
    let path = path.into();
    let record = read_record(&path).await?;
    debug!(path = %path.display(), guard = ?record.etl_process, "state loaded");
    Ok(Self { path, record })
  }

  pub fn path(&self) -> &Path { &self.path }

  pub fn record(&self) -> &StateRecord { &self.record }

  /// The committed watermark, or the floor sentinel if none was committed.
  pub fn get(&self, collection: Collection) -> DateTime<Utc> {
    self
      .record
      .collections
      .get(collection.name())
      .map(|s| s.modified)
      .unwrap_or_else(watermark_floor)
  }

  /// Commit `modified` as the watermark of `collection` and persist it.
  ///
  /// Watermarks never move backward; a regressing value is ignored.
  pub async fn set(
    &mut self,
    collection: Collection,
    modified: DateTime<Utc>,
  ) -> Result<(), SyncError> {
    let current = self.get(collection);
    if modified < current {
      warn!(
        %collection,
        current = %current,
        requested = %modified,
        "ignoring watermark regression"
      );
      return Ok(());
    }
    self
      .record
      .collections
      .insert(collection.name().to_owned(), CollectionState { modified });
    self.persist().await
  }

  pub fn guard_held(&self) -> bool { self.record.etl_process == ProcessState::Started }

  /// Set the run guard. Re-reads the file first so a guard written by
  /// another process since [`open`](Self::open) is seen.
  pub async fn acquire_run_guard(&mut self) -> Result<(), SyncError> {
    self.record = read_record(&self.path).await?;
    if self.guard_held() {
      return Err(SyncError::ConcurrentRun(self.path.clone()));
    }
    self.record.etl_process = ProcessState::Started;
    self.persist().await?;
    debug!(path = %self.path.display(), "run guard acquired");
    Ok(())
  }

  pub async fn release_run_guard(&mut self) -> Result<(), SyncError> {
    self.record.etl_process = ProcessState::Stopped;
    self.persist().await?;
    debug!(path = %self.path.display(), "run guard released");
    Ok(())
  }

  /// Clear a guard left behind by an abrupt exit. Operator action only.
  pub async fn force_release(&mut self) -> Result<bool, SyncError> {
    self.record = read_record(&self.path).await?;
    let was_held = self.guard_held();
    if was_held {
      self.release_run_guard().await?;
      info!(path = %self.path.display(), "stale run guard cleared");
    }
    Ok(was_held)
  }

  async fn persist(&self) -> Result<(), SyncError> {
    let body = serde_json::to_vec_pretty(&self.record)
      .map_err(|source| SyncError::StateFormat { path: self.path.clone(), source })?;

    let mut tmp = OsString::from(self.path.as_os_str());
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let io_err = |source| SyncError::State { path: self.path.clone(), source };
    tokio::fs::write(&tmp, body).await.map_err(io_err)?;
    tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)?;
    Ok(())
  }
}

async fn read_record(path: &Path) -> Result<StateRecord, SyncError> {
  match tokio::fs::read(path).await {
    Ok(bytes) => serde_json::from_slice(&bytes)
      .map_err(|source| SyncError::StateFormat { path: path.to_owned(), source }),
    Err(e) if e.kind() == ErrorKind::NotFound => Ok(StateRecord::default()),
    Err(source) => Err(SyncError::State { path: path.to_owned(), source }),
  }
}
