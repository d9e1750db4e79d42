//! Process configuration.
//!
//! Read from an optional TOML file and overridden by `MARQUEE_*` environment
//! variables, nested keys separated by `__` (`MARQUEE_RETRY__MAX_ATTEMPTS`).

use std::{path::PathBuf, time::Duration};

use marquee_index::IndexConfig;
use serde::Deserialize;

use crate::{Registry, RetryPolicy, SyncError, SyncSettings};

/// Runtime configuration, deserialised from `marquee.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct EtlConfig {
  pub source_path:          PathBuf,
  #[serde(default = "default_elastic_url")]
  pub elastic_url:          String,
  #[serde(default = "default_index_timeout")]
  pub index_timeout_secs:   u64,
  #[serde(default = "default_state_file")]
  pub state_file:           PathBuf,
  #[serde(default = "default_batch")]
  pub limit:                usize,
  #[serde(default = "default_batch")]
  pub flush_size:           usize,
  #[serde(default = "default_interval")]
  pub upload_interval_secs: u64,
  #[serde(default = "default_collections")]
  pub collections:          Vec<String>,
  #[serde(default)]
  pub retry:                RetryPolicy,
}

fn default_elastic_url() -> String { "http://localhost:9200".into() }

fn default_index_timeout() -> u64 { IndexConfig::DEFAULT_TIMEOUT.as_secs() }

fn default_state_file() -> PathBuf { PathBuf::from("state.json") }

fn default_batch() -> usize { 100 }

fn default_interval() -> u64 { 10 }

fn default_collections() -> Vec<String> {
  ["movie", "genre", "person"].map(String::from).to_vec()
}

impl EtlConfig {
  /// Layer `file` (if it exists) under the environment and deserialise.
  pub fn load(file: impl Into<PathBuf>) -> Result<Self, SyncError> {
    let settings = config::Config::builder()
      .add_source(config::File::from(file.into()).required(false))
      .add_source(
        config::Environment::with_prefix("MARQUEE")
          .prefix_separator("_")
          .separator("__")
          .list_separator(",")
          .with_list_parse_key("collections")
          .try_parsing(true),
      )
      .build()?;
    let cfg: Self = settings.try_deserialize()?;
    cfg.validate()?;
    Ok(cfg)
  }

  pub fn validate(&self) -> Result<(), SyncError> {
    if self.limit == 0 {
      return Err(SyncError::Config("limit must be at least 1".into()));
    }
    if self.flush_size == 0 {
      return Err(SyncError::Config("flush_size must be at least 1".into()));
    }
    if self.index_timeout_secs == 0 {
      return Err(SyncError::Config("index_timeout_secs must be at least 1".into()));
    }
    if self.retry.max_attempts == 0 {
      return Err(SyncError::Config("retry.max_attempts must be at least 1".into()));
    }
    if self.retry.factor.is_nan() || self.retry.factor < 1.0 {
      return Err(SyncError::Config("retry.factor must be at least 1.0".into()));
    }
    self.registry().map(drop)
  }

  pub fn registry(&self) -> Result<Registry, SyncError> {
    Registry::resolve(self.collections.as_slice())
  }

  /// Index client settings; a request past the timeout fails as transient
  /// and goes through the `retry` policy.
  pub fn index_config(&self) -> IndexConfig {
    IndexConfig::new(self.elastic_url.clone())
      .with_timeout(Duration::from_secs(self.index_timeout_secs))
  }

  pub fn settings(&self) -> SyncSettings {
    SyncSettings { limit: self.limit, flush_size: self.flush_size, retry: self.retry.clone() }
  }

  pub fn upload_interval(&self) -> Duration { Duration::from_secs(self.upload_interval_secs) }
}
