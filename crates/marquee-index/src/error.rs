//! Error type for `marquee-index`.

use marquee_core::Transient;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("{method} {path} → {status}: {body}")]
  Status {
    method: &'static str,
    path:   String,
    status: u16,
    body:   String,
  },

  /// The bulk request succeeded but some documents were not written.
  #[error("index {index} rejected {} of {total} documents: {}", .failed.len(), describe(.failed))]
  Rejected {
    index:  String,
    total:  usize,
    /// `(document id, item status)` for each failed item.
    failed: Vec<(String, u16)>,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

fn describe(failed: &[(String, u16)]) -> String {
  failed
    .iter()
    .take(5)
    .map(|(id, status)| format!("{id} ({status})"))
    .collect::<Vec<_>>()
    .join(", ")
}

impl Transient for Error {
  fn is_transient(&self) -> bool {
    match self {
      Error::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
      Error::Status { status, .. } => *status == 429 || *status >= 500,
      Error::Rejected { failed, .. } => {
        !failed.is_empty() && failed.iter().all(|(_, status)| *status == 429)
      }
      Error::Json(_) => false,
    }
  }
}
