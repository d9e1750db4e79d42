//! Async HTTP client for an Elasticsearch-compatible index.

use std::{collections::HashMap, time::Duration};

use marquee_core::{Document, index::SearchIndex};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::{Error, Result};

/// Connection settings for the index endpoint.
#[derive(Debug, Clone)]
pub struct IndexConfig {
  pub base_url: String,
  /// Per-request deadline. An expired request fails with a transient
  /// [`Error::Http`] and is retried by the caller's policy.
  pub timeout:  Duration,
}

impl IndexConfig {
  pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

  pub fn new(base_url: impl Into<String>) -> Self {
    Self { base_url: base_url.into(), timeout: Self::DEFAULT_TIMEOUT }
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }
}

/// Async HTTP client for the index's REST API.
///
/// Clones share one connection pool.
#[derive(Clone)]
pub struct ElasticIndex {
  client: Client,
  config: IndexConfig,
}

impl ElasticIndex {
  pub fn new(config: IndexConfig) -> Result<Self> {
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// `GET /`; succeeds once the node answers.
  pub async fn ping(&self) -> Result<()> {
    let resp = self.client.get(self.url("")).send().await?;
    check(resp, "GET", "/").await?;
    Ok(())
  }
}

/// Turn a non-success response into [`Error::Status`].
async fn check(resp: Response, method: &'static str, path: &str) -> Result<Response> {
  if resp.status().is_success() {
    return Ok(resp);
  }
  let status = resp.status().as_u16();
  let body = resp.text().await.unwrap_or_default();
  Err(Error::Status { method, path: path.to_owned(), status, body })
}

// ─── Bulk protocol ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct BulkResponse {
  errors: bool,
  items:  Vec<HashMap<String, BulkItem>>,
}

#[derive(Debug, Deserialize)]
struct BulkItem {
  #[serde(rename = "_id")]
  id:     String,
  status: u16,
  #[serde(default)]
  error:  Option<Value>,
}

/// One `index` action line plus the document source line per document.
fn bulk_body(index: &str, docs: &[Document]) -> Result<String> {
  let mut body = String::new();
  for doc in docs {
    let action = serde_json::json!({ "index": { "_index": index, "_id": doc.id() } });
    body.push_str(&serde_json::to_string(&action)?);
    body.push('\n');
    body.push_str(&serde_json::to_string(doc)?);
    body.push('\n');
  }
  Ok(body)
}

// ─── SearchIndex impl ────────────────────────────────────────────────────────

impl SearchIndex for ElasticIndex {
  type Error = Error;

  async fn ensure_index(&self, index: &str, schema: &Value) -> Result<()> {
    let path = format!("/{index}");
    let resp = self.client.head(self.url(index)).send().await?;
    match resp.status() {
      s if s.is_success() => return Ok(()),
      StatusCode::NOT_FOUND => {}
      _ => {
        check(resp, "HEAD", &path).await?;
      }
    }

    let resp = self.client.put(self.url(index)).json(schema).send().await?;
    if resp.status() == StatusCode::BAD_REQUEST {
      let body = resp.text().await.unwrap_or_default();
      // Another writer created it between our HEAD and PUT.
      if body.contains("resource_already_exists_exception") {
        return Ok(());
      }
      return Err(Error::Status { method: "PUT", path, status: 400, body });
    }
    check(resp, "PUT", &path).await?;
    tracing::info!(index, "index created");
    Ok(())
  }

  async fn bulk_upsert(&self, index: &str, docs: &[Document]) -> Result<usize> {
    if docs.is_empty() {
      return Ok(0);
    }

    let resp = self
      .client
      .post(self.url("_bulk"))
      .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
      .body(bulk_body(index, docs)?)
      .send()
      .await?;
    let resp = check(resp, "POST", "/_bulk").await?;
    let report: BulkResponse = resp.json().await?;

    if !report.errors {
      return Ok(docs.len());
    }

    let failed: Vec<(String, u16)> = report
      .items
      .into_iter()
      .flat_map(HashMap::into_values)
      .filter(|item| item.error.is_some() || item.status >= 300)
      .map(|item| (item.id, item.status))
      .collect();

    if failed.is_empty() {
      return Ok(docs.len());
    }
    tracing::warn!(index, failed = failed.len(), total = docs.len(), "bulk items rejected");
    Err(Error::Rejected { index: index.to_owned(), total: docs.len(), failed })
  }
}
