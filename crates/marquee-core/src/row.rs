//! Flat rows as returned by the relational source.
//!
//! Instance rows are join-denormalised: one row per (entity, related row)
//! pair. Partner columns are `None` where the left join found no match.

use chrono::{DateTime, Utc};

use crate::collection::Role;

/// A row whose `modified` timestamp is newer than a watermark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedRow {
  pub id:       String,
  pub modified: DateTime<Utc>,
}

/// One `film_work` row joined with one person link and one genre link.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieRow {
  pub movie_id:    String,
  pub title:       String,
  pub description: Option<String>,
  pub rating:      Option<f64>,
  pub film_type:   Option<String>,
  pub role:        Option<Role>,
  pub person_id:   Option<String>,
  pub full_name:   Option<String>,
  pub genre_id:    Option<String>,
  pub genre_name:  Option<String>,
}

/// One `person` row joined with one film link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonRow {
  pub person_id: String,
  pub full_name: String,
  pub role:      Option<Role>,
  pub film_id:   Option<String>,
}

/// One `genre` row; genres embed nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreRow {
  pub genre_id:    String,
  pub name:        String,
  pub description: Option<String>,
}

/// The instance rows of one collection.
#[derive(Debug, Clone, PartialEq)]
pub enum InstanceRows {
  Movie(Vec<MovieRow>),
  Person(Vec<PersonRow>),
  Genre(Vec<GenreRow>),
}

impl InstanceRows {
  pub fn len(&self) -> usize {
    match self {
      InstanceRows::Movie(rows) => rows.len(),
      InstanceRows::Person(rows) => rows.len(),
      InstanceRows::Genre(rows) => rows.len(),
    }
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}
