//! Error type for the sync engine.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
  /// The persisted run guard is already set: another instance is running,
  /// or a previous one did not exit cleanly. Never cleared automatically.
  #[error(
    "run guard already set in {}; another sync may be running. \
     Clear it with --release-guard once that is ruled out",
    .0.display()
  )]
  ConcurrentRun(PathBuf),

  #[error("configuration error: {0}")]
  Config(String),

  #[error("source error: {0}")]
  Source(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("index error: {0}")]
  Index(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("state file {}: {source}", .path.display())]
  State {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("state file {} is malformed: {source}", .path.display())]
  StateFormat {
    path:   PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

impl SyncError {
  pub fn from_source<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    SyncError::Source(Box::new(e))
  }

  pub fn from_index<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    SyncError::Index(Box::new(e))
  }
}

impl From<config::ConfigError> for SyncError {
  fn from(e: config::ConfigError) -> Self { SyncError::Config(e.to_string()) }
}
