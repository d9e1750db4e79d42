//! The explicit context handed to every sync stage.

use crate::retry::RetryPolicy;

/// Tunables shared by all stages of a cycle.
#[derive(Debug, Clone)]
pub struct SyncSettings {
  /// Maximum rows fetched per collection per cycle, and the chunk size for
  /// re-assembling cascaded ids.
  pub limit:      usize,
  /// Documents per bulk write.
  pub flush_size: usize,
  pub retry:      RetryPolicy,
}

impl Default for SyncSettings {
  fn default() -> Self {
    Self { limit: 100, flush_size: 100, retry: RetryPolicy::default() }
  }
}

/// Borrowed handles to the source, the index, and the settings.
pub struct SyncContext<'a, S, I> {
  pub source:   &'a S,
  pub index:    &'a I,
  pub settings: &'a SyncSettings,
}

impl<S, I> Clone for SyncContext<'_, S, I> {
  fn clone(&self) -> Self { *self }
}

impl<S, I> Copy for SyncContext<'_, S, I> {}
