//! Assembled documents: the denormalised unit written to the search index.
//!
//! Documents are never stored by the engine; they are built per cycle from
//! join rows and discarded once flushed.

use serde::{Deserialize, Serialize};

use crate::collection::{Collection, Role};

/// An embedded `{id, name}` reference to a related entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
  pub id:   String,
  pub name: String,
}

/// A movie with its genres and credited people embedded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieDocument {
  pub id:              String,
  pub imdb_rating:     Option<f64>,
  pub title:           String,
  pub description:     Option<String>,
  pub film_type:       Option<String>,
  pub genre:           Vec<NamedRef>,
  pub directors_names: Vec<String>,
  pub actors_names:    Vec<String>,
  pub writers_names:   Vec<String>,
  pub directors:       Vec<NamedRef>,
  pub actors:          Vec<NamedRef>,
  pub writers:         Vec<NamedRef>,
}

/// A person with the films they took part in, partitioned by role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonDocument {
  pub id:                String,
  pub full_name:         String,
  pub roles:             Vec<Role>,
  pub film_ids:          Vec<String>,
  pub actor_film_ids:    Vec<String>,
  pub director_film_ids: Vec<String>,
  pub writer_film_ids:   Vec<String>,
}

/// A genre; flat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreDocument {
  pub id:          String,
  pub name:        String,
  pub description: Option<String>,
}

/// A document of any collection, serialised as its bare body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Document {
  Movie(MovieDocument),
  Person(PersonDocument),
  Genre(GenreDocument),
}

impl Document {
  /// The id the document is upserted under.
  pub fn id(&self) -> &str {
    match self {
      Document::Movie(d) => &d.id,
      Document::Person(d) => &d.id,
      Document::Genre(d) => &d.id,
    }
  }

  pub fn collection(&self) -> Collection {
    match self {
      Document::Movie(_) => Collection::Movie,
      Document::Person(_) => Collection::Person,
      Document::Genre(_) => Collection::Genre,
    }
  }
}
