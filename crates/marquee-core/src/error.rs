//! Error types for `marquee-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown collection: {0:?}")]
  UnknownCollection(String),

  #[error("unknown role: {0:?}")]
  UnknownRole(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Classifies an error as worth retrying.
///
/// Backends implement this so the sync engine can tell a dropped connection
/// or an overloaded node apart from a malformed request.
pub trait Transient {
  fn is_transient(&self) -> bool;
}
