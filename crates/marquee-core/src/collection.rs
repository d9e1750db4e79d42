//! Entity collections and the many-to-many relations between them.
//!
//! The relation map is declared statically per collection. The sync engine
//! walks it to find which related collections must be repaired when rows of
//! one collection change.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

// ─── Collection ──────────────────────────────────────────────────────────────

/// One of the synchronised entity collections.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
  Movie,
  Person,
  Genre,
}

impl Collection {
  /// Every collection, in the default registration order.
  pub const ALL: [Collection; 3] =
    [Collection::Movie, Collection::Genre, Collection::Person];

  pub fn name(self) -> &'static str {
    match self {
      Collection::Movie => "movie",
      Collection::Person => "person",
      Collection::Genre => "genre",
    }
  }

  /// The relations declared on this collection (one hop only).
  pub fn relations(self) -> &'static [Relation] {
    match self {
      Collection::Movie => MOVIE_RELATIONS,
      Collection::Person => PERSON_RELATIONS,
      Collection::Genre => GENRE_RELATIONS,
    }
  }
}

impl fmt::Display for Collection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for Collection {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "movie" => Ok(Collection::Movie),
      "person" => Ok(Collection::Person),
      "genre" => Ok(Collection::Genre),
      other => Err(Error::UnknownCollection(other.to_owned())),
    }
  }
}

// ─── Relations ───────────────────────────────────────────────────────────────

/// A junction table linking two collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Junction {
  /// Movie ↔ Person, carrying a [`Role`].
  PersonFilmWork,
  /// Movie ↔ Genre, no attribute.
  GenreFilmWork,
}

/// A directed edge from a changed collection to a dependent one.
///
/// When rows of `source` change, documents of `target` linked through
/// `junction` embed stale data and must be re-assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Relation {
  pub source:   Collection,
  pub target:   Collection,
  pub junction: Junction,
}

const MOVIE_RELATIONS: &[Relation] = &[
  Relation {
    source:   Collection::Movie,
    target:   Collection::Genre,
    junction: Junction::GenreFilmWork,
  },
  Relation {
    source:   Collection::Movie,
    target:   Collection::Person,
    junction: Junction::PersonFilmWork,
  },
];

const PERSON_RELATIONS: &[Relation] = &[Relation {
  source:   Collection::Person,
  target:   Collection::Movie,
  junction: Junction::PersonFilmWork,
}];

const GENRE_RELATIONS: &[Relation] = &[Relation {
  source:   Collection::Genre,
  target:   Collection::Movie,
  junction: Junction::GenreFilmWork,
}];

// ─── Role ────────────────────────────────────────────────────────────────────

/// The part a person plays in a film; the attribute of
/// [`Junction::PersonFilmWork`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Actor,
  Director,
  Writer,
}

impl Role {
  pub fn as_str(self) -> &'static str {
    match self {
      Role::Actor => "actor",
      Role::Director => "director",
      Role::Writer => "writer",
    }
  }
}

impl FromStr for Role {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "actor" => Ok(Role::Actor),
      "director" => Ok(Role::Director),
      "writer" => Ok(Role::Writer),
      other => Err(Error::UnknownRole(other.to_owned())),
    }
  }
}

// ─── Watermark ───────────────────────────────────────────────────────────────

/// The lower bound used when a collection has never been synchronised
/// (`0001-01-01T00:00:00Z`).
pub fn watermark_floor() -> DateTime<Utc> {
  DateTime::from_timestamp(-62_135_596_800, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
}
