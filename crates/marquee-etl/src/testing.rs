//! Test doubles and fixtures shared by the engine's tests.

use std::{
  collections::HashMap,
  fmt,
  sync::{Arc, Mutex},
};

use chrono::{DateTime, Duration, Utc};
use marquee_core::{Document, Transient, index::SearchIndex};
use marquee_store_sqlite::{SqliteStore, encode_dt};
use serde_json::Value;

// ─── MemoryIndex ─────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct FakeFailure {
  pub transient: bool,
}

impl fmt::Display for FakeFailure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "injected failure (transient: {})", self.transient)
  }
}

impl std::error::Error for FakeFailure {}

impl Transient for FakeFailure {
  fn is_transient(&self) -> bool { self.transient }
}

#[derive(Default)]
struct Inner {
  indices:      HashMap<String, Value>,
  docs:         HashMap<(String, String), Document>,
  /// `(index, ids)` per accepted bulk call, in order.
  bulks:        Vec<(String, Vec<String>)>,
  ensure_calls: usize,
  fail_bulks:   usize,
  fail_kind:    bool,
}

/// An in-memory `SearchIndex` that records every accepted write.
#[derive(Clone, Default)]
pub struct MemoryIndex {
  inner: Arc<Mutex<Inner>>,
}

impl MemoryIndex {
  /// Make the next `n` bulk calls fail.
  pub fn fail_next_bulks(&self, n: usize, transient: bool) {
    let mut inner = self.inner.lock().unwrap();
    inner.fail_bulks = n;
    inner.fail_kind = transient;
  }

  pub fn batch_sizes(&self) -> Vec<usize> {
    self.inner.lock().unwrap().bulks.iter().map(|(_, ids)| ids.len()).collect()
  }

  /// Ids written to `index`, in write order, duplicates included.
  pub fn written(&self, index: &str) -> Vec<String> {
    let inner = self.inner.lock().unwrap();
    inner
      .bulks
      .iter()
      .filter(|(name, _)| name == index)
      .flat_map(|(_, ids)| ids.iter().cloned())
      .collect()
  }

  pub fn total_writes(&self) -> usize { self.batch_sizes().iter().sum() }

  pub fn ensure_calls(&self) -> usize { self.inner.lock().unwrap().ensure_calls }

  pub fn doc_count(&self, index: &str) -> usize {
    self.inner.lock().unwrap().docs.keys().filter(|(name, _)| name == index).count()
  }

  pub fn doc(&self, index: &str, id: &str) -> Option<Document> {
    let inner = self.inner.lock().unwrap();
    inner.docs.get(&(index.to_owned(), id.to_owned())).cloned()
  }
}

impl SearchIndex for MemoryIndex {
  type Error = FakeFailure;

  async fn ensure_index(&self, index: &str, schema: &Value) -> Result<(), FakeFailure> {
    let mut inner = self.inner.lock().unwrap();
    inner.ensure_calls += 1;
    inner.indices.entry(index.to_owned()).or_insert_with(|| schema.clone());
    Ok(())
  }

  async fn bulk_upsert(&self, index: &str, docs: &[Document]) -> Result<usize, FakeFailure> {
    let mut inner = self.inner.lock().unwrap();
    if inner.fail_bulks > 0 {
      inner.fail_bulks -= 1;
      return Err(FakeFailure { transient: inner.fail_kind });
    }
    for doc in docs {
      inner.docs.insert((index.to_owned(), doc.id().to_owned()), doc.clone());
    }
    let ids = docs.iter().map(|d| d.id().to_owned()).collect();
    inner.bulks.push((index.to_owned(), ids));
    Ok(docs.len())
  }
}

// ─── SQLite fixtures ─────────────────────────────────────────────────────────

pub fn ts(offset_secs: i64) -> DateTime<Utc> {
  DateTime::from_timestamp(1_700_000_000, 0).unwrap() + Duration::seconds(offset_secs)
}

pub async fn source() -> SqliteStore { SqliteStore::open_in_memory().await.unwrap() }

pub async fn insert_movie(s: &SqliteStore, id: &str, title: &str, modified: DateTime<Utc>) {
  s.execute_batch(format!(
    "INSERT INTO film_work (id, title, description, rating, type, modified)
     VALUES ('{id}', '{title}', NULL, 7.5, 'movie', '{}')",
    encode_dt(modified)
  ))
  .await
  .unwrap();
}

pub async fn insert_person(s: &SqliteStore, id: &str, name: &str, modified: DateTime<Utc>) {
  s.execute_batch(format!(
    "INSERT INTO person (id, full_name, modified) VALUES ('{id}', '{name}', '{}')",
    encode_dt(modified)
  ))
  .await
  .unwrap();
}

pub async fn insert_genre(s: &SqliteStore, id: &str, name: &str, modified: DateTime<Utc>) {
  s.execute_batch(format!(
    "INSERT INTO genre (id, name, modified) VALUES ('{id}', '{name}', '{}')",
    encode_dt(modified)
  ))
  .await
  .unwrap();
}

pub async fn rename_person(s: &SqliteStore, id: &str, name: &str, modified: DateTime<Utc>) {
  s.execute_batch(format!(
    "UPDATE person SET full_name = '{name}', modified = '{}' WHERE id = '{id}'",
    encode_dt(modified)
  ))
  .await
  .unwrap();
}

pub async fn rename_genre(s: &SqliteStore, id: &str, name: &str, modified: DateTime<Utc>) {
  s.execute_batch(format!(
    "UPDATE genre SET name = '{name}', modified = '{}' WHERE id = '{id}'",
    encode_dt(modified)
  ))
  .await
  .unwrap();
}

pub async fn credit(s: &SqliteStore, movie: &str, person: &str, role: &str) {
  s.execute_batch(format!(
    "INSERT INTO person_film_work (film_work_id, person_id, role)
     VALUES ('{movie}', '{person}', '{role}')"
  ))
  .await
  .unwrap();
}

pub async fn tag(s: &SqliteStore, movie: &str, genre: &str) {
  s.execute_batch(format!(
    "INSERT INTO genre_film_work (film_work_id, genre_id) VALUES ('{movie}', '{genre}')"
  ))
  .await
  .unwrap();
}
