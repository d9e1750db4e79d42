//! [`SqliteStore`], the SQLite implementation of [`SourceStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OpenFlags;

use marquee_core::{
  Collection, Relation,
  row::{ChangedRow, GenreRow, InstanceRows, MovieRow, PersonRow},
  source::SourceStore,
};

use crate::{
  Error, Result,
  encode::{
    decode_dt, decode_role, encode_dt, junction_column, junction_table, placeholders, table_name,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// The relational source backed by a single SQLite file.
///
/// Clones share the same background connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open an existing database at `path` read-only.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_with_flags(
      path,
      OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .await?;
    Ok(Self { conn })
  }

  /// Open an in-memory store with the schema applied. Used by tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  pub async fn init_schema(&self) -> Result<()> {
    self.execute_batch(SCHEMA).await
  }

  /// Run raw SQL against a writable store. Used to load fixtures.
  pub async fn execute_batch(&self, sql: impl Into<String>) -> Result<()> {
    let sql = sql.into();
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(&sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn movie_rows(&self, ids: Vec<String>) -> Result<Vec<MovieRow>> {
    let sql = format!(
      "SELECT
         fw.id, fw.title, fw.description, fw.rating, fw.type,
         pfw.role, p.id, p.full_name,
         g.id, g.name
       FROM film_work fw
       LEFT JOIN person_film_work pfw ON pfw.film_work_id = fw.id
       LEFT JOIN person           p   ON p.id            = pfw.person_id
       LEFT JOIN genre_film_work  gfw ON gfw.film_work_id = fw.id
       LEFT JOIN genre            g   ON g.id            = gfw.genre_id
       WHERE fw.id IN ({})
       ORDER BY fw.modified, fw.id",
      placeholders(ids.len())
    );

    let raws: Vec<(MovieRow, Option<String>)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(ids.iter()), |row| {
            let movie = MovieRow {
              movie_id:    row.get(0)?,
              title:       row.get(1)?,
              description: row.get(2)?,
              rating:      row.get(3)?,
              film_type:   row.get(4)?,
              role:        None,
              person_id:   row.get(6)?,
              full_name:   row.get(7)?,
              genre_id:    row.get(8)?,
              genre_name:  row.get(9)?,
            };
            Ok((movie, row.get(5)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(mut movie, role)| {
        movie.role = decode_role(role)?;
        Ok(movie)
      })
      .collect()
  }

  async fn person_rows(&self, ids: Vec<String>) -> Result<Vec<PersonRow>> {
    let sql = format!(
      "SELECT p.id, p.full_name, pfw.role, fw.id
       FROM person p
       LEFT JOIN person_film_work pfw ON pfw.person_id = p.id
       LEFT JOIN film_work        fw  ON fw.id        = pfw.film_work_id
       WHERE p.id IN ({})
       ORDER BY p.modified, p.id",
      placeholders(ids.len())
    );

    let raws: Vec<(PersonRow, Option<String>)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(ids.iter()), |row| {
            let person = PersonRow {
              person_id: row.get(0)?,
              full_name: row.get(1)?,
              role:      None,
              film_id:   row.get(3)?,
            };
            Ok((person, row.get(2)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(mut person, role)| {
        person.role = decode_role(role)?;
        Ok(person)
      })
      .collect()
  }

  async fn genre_rows(&self, ids: Vec<String>) -> Result<Vec<GenreRow>> {
    let sql = format!(
      "SELECT g.id, g.name, g.description FROM genre g
       WHERE g.id IN ({})
       ORDER BY g.modified, g.id",
      placeholders(ids.len())
    );

    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(ids.iter()), |row| {
            Ok(GenreRow {
              genre_id:    row.get(0)?,
              name:        row.get(1)?,
              description: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(rows)
  }
}

fn decode_changed(raws: Vec<(String, String)>) -> Result<Vec<ChangedRow>> {
  raws
    .into_iter()
    .map(|(id, modified)| Ok(ChangedRow { id, modified: decode_dt(&modified)? }))
    .collect()
}

// ─── SourceStore impl ────────────────────────────────────────────────────────

impl SourceStore for SqliteStore {
  type Error = Error;

  async fn changed_since(
    &self,
    collection: Collection,
    since:      DateTime<Utc>,
    limit:      usize,
  ) -> Result<Vec<ChangedRow>> {
    let sql = format!(
      "SELECT id, modified FROM {}
       WHERE modified > ?1
       ORDER BY modified, id
       LIMIT ?2",
      table_name(collection)
    );
    let since_str = encode_dt(since);
    let limit_val = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws: Vec<(String, String)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![since_str, limit_val], |row| {
            Ok((row.get(0)?, row.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    tracing::debug!(%collection, rows = raws.len(), "change query");
    decode_changed(raws)
  }

  async fn changed_at(
    &self,
    collection: Collection,
    modified:   DateTime<Utc>,
    after_id:   &str,
  ) -> Result<Vec<ChangedRow>> {
    let sql = format!(
      "SELECT id, modified FROM {}
       WHERE modified = ?1 AND id > ?2
       ORDER BY id",
      table_name(collection)
    );
    let modified_str = encode_dt(modified);
    let after_id = after_id.to_owned();

    let raws: Vec<(String, String)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![modified_str, after_id], |row| {
            Ok((row.get(0)?, row.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    tracing::debug!(%collection, rows = raws.len(), "boundary group query");
    decode_changed(raws)
  }

  async fn instance_rows(
    &self,
    collection: Collection,
    ids:        &[String],
  ) -> Result<InstanceRows> {
    let ids = ids.to_vec();
    if ids.is_empty() {
      return Ok(match collection {
        Collection::Movie => InstanceRows::Movie(Vec::new()),
        Collection::Person => InstanceRows::Person(Vec::new()),
        Collection::Genre => InstanceRows::Genre(Vec::new()),
      });
    }

    let rows = match collection {
      Collection::Movie => InstanceRows::Movie(self.movie_rows(ids).await?),
      Collection::Person => InstanceRows::Person(self.person_rows(ids).await?),
      Collection::Genre => InstanceRows::Genre(self.genre_rows(ids).await?),
    };

    tracing::debug!(%collection, rows = rows.len(), "instance query");
    Ok(rows)
  }

  async fn related_ids(
    &self,
    relation:   Relation,
    source_ids: &[String],
  ) -> Result<Vec<String>> {
    if source_ids.is_empty() {
      return Ok(Vec::new());
    }

    // Every relation declared in `marquee_core` has both columns mapped.
    let target_col = junction_column(relation.junction, relation.target)
      .ok_or_else(|| marquee_core::Error::UnknownCollection(relation.target.to_string()))?;
    let source_col = junction_column(relation.junction, relation.source)
      .ok_or_else(|| marquee_core::Error::UnknownCollection(relation.source.to_string()))?;

    let sql = format!(
      "SELECT DISTINCT t.id, t.modified
       FROM {target} t
       JOIN {junction} j ON j.{target_col} = t.id
       WHERE j.{source_col} IN ({list})
       ORDER BY t.modified, t.id",
      target = table_name(relation.target),
      junction = junction_table(relation.junction),
      list = placeholders(source_ids.len()),
    );
    let ids = source_ids.to_vec();

    let related: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(ids.iter()), |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    tracing::debug!(
      source = %relation.source,
      target = %relation.target,
      related = related.len(),
      "relation query"
    );
    Ok(related)
  }
}
