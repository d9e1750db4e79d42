//! Static registration of the synchronised collections.
//!
//! Each configured collection name resolves once, at start, to a fixed
//! entry: the index it is written to, that index's schema, and the
//! relations its changes cascade through.

use marquee_core::{Collection, Relation};
use marquee_index::{index_name, mapping};
use serde_json::Value;

use crate::SyncError;

#[derive(Debug, Clone)]
pub struct Registration {
  pub collection: Collection,
  pub index:      &'static str,
  pub schema:     Value,
  pub relations:  &'static [Relation],
}

impl Registration {
  pub fn of(collection: Collection) -> Self {
    Self {
      collection,
      index: index_name(collection),
      schema: mapping(collection),
      relations: collection.relations(),
    }
  }
}

/// The ordered list of collections a cycle walks.
#[derive(Debug, Clone)]
pub struct Registry {
  entries: Vec<Registration>,
}

impl Registry {
  /// Resolve configured names in order. Unknown names, duplicates and an
  /// empty list are rejected.
  pub fn resolve<S: AsRef<str>>(names: &[S]) -> Result<Self, SyncError> {
    if names.is_empty() {
      return Err(SyncError::Config("no collections registered".into()));
    }

    let mut entries: Vec<Registration> = Vec::with_capacity(names.len());
    for name in names {
      let collection: Collection = name
        .as_ref()
        .parse()
        .map_err(|e: marquee_core::Error| SyncError::Config(e.to_string()))?;
      if entries.iter().any(|r| r.collection == collection) {
        return Err(SyncError::Config(format!("collection {collection:?} registered twice")));
      }
      entries.push(Registration::of(collection));
    }
    Ok(Self { entries })
  }

  pub fn iter(&self) -> impl Iterator<Item = &Registration> { self.entries.iter() }

  pub fn get(&self, collection: Collection) -> Option<&Registration> {
    self.entries.iter().find(|r| r.collection == collection)
  }
}

impl Default for Registry {
  fn default() -> Self {
    Self { entries: Collection::ALL.into_iter().map(Registration::of).collect() }
  }
}
