//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite, plus the table/column names each
//! collection and junction maps to.

use chrono::{DateTime, SecondsFormat, Utc};
use marquee_core::{Collection, Junction, Role};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// Canonical timestamp text: fixed-width RFC 3339 with microseconds and `Z`.
pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Role ────────────────────────────────────────────────────────────────────

pub fn decode_role(s: Option<String>) -> Result<Option<Role>> {
  Ok(s.map(|r| r.parse::<Role>()).transpose()?)
}

// ─── Table names ─────────────────────────────────────────────────────────────

pub fn table_name(collection: Collection) -> &'static str {
  match collection {
    Collection::Movie => "film_work",
    Collection::Person => "person",
    Collection::Genre => "genre",
  }
}

pub fn junction_table(junction: Junction) -> &'static str {
  match junction {
    Junction::PersonFilmWork => "person_film_work",
    Junction::GenreFilmWork => "genre_film_work",
  }
}

/// The junction column holding the foreign key of `collection`, if the
/// junction links it at all.
pub fn junction_column(junction: Junction, collection: Collection) -> Option<&'static str> {
  match (junction, collection) {
    (Junction::PersonFilmWork, Collection::Movie) => Some("film_work_id"),
    (Junction::PersonFilmWork, Collection::Person) => Some("person_id"),
    (Junction::GenreFilmWork, Collection::Movie) => Some("film_work_id"),
    (Junction::GenreFilmWork, Collection::Genre) => Some("genre_id"),
    _ => None,
  }
}

/// `?1, ?2, …, ?n` for an `IN (…)` list.
pub fn placeholders(n: usize) -> String {
  (1..=n).map(|i| format!("?{i}")).collect::<Vec<_>>().join(", ")
}
