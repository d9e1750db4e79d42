//! SQL schema of the relational source.
//!
//! The sync engine only reads these tables. The DDL is applied by
//! [`SqliteStore::open_in_memory`](crate::SqliteStore::open_in_memory) and
//! [`SqliteStore::init_schema`](crate::SqliteStore::init_schema) for fixtures
//! and fresh databases.
//!
//! `modified` columns hold RFC 3339 UTC text with microsecond precision
//! (`2024-01-02T03:04:05.000000Z`), so string comparison is chronological.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS film_work (
    id          TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    description TEXT,
    rating      REAL,
    type        TEXT,
    created     TEXT,
    modified    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS person (
    id        TEXT PRIMARY KEY,
    full_name TEXT NOT NULL,
    created   TEXT,
    modified  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS genre (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    description TEXT,
    created     TEXT,
    modified    TEXT NOT NULL
);

-- Junction rows have no lifecycle of their own; changes surface through
-- the `modified` column of the rows they link.
CREATE TABLE IF NOT EXISTS person_film_work (
    film_work_id TEXT NOT NULL REFERENCES film_work(id),
    person_id    TEXT NOT NULL REFERENCES person(id),
    role         TEXT NOT NULL CHECK (role IN ('actor', 'director', 'writer')),
    created      TEXT,
    PRIMARY KEY (film_work_id, person_id, role)
);

CREATE TABLE IF NOT EXISTS genre_film_work (
    film_work_id TEXT NOT NULL REFERENCES film_work(id),
    genre_id     TEXT NOT NULL REFERENCES genre(id),
    created      TEXT,
    PRIMARY KEY (film_work_id, genre_id)
);

CREATE INDEX IF NOT EXISTS film_work_modified_idx ON film_work(modified);
CREATE INDEX IF NOT EXISTS person_modified_idx    ON person(modified);
CREATE INDEX IF NOT EXISTS genre_modified_idx     ON genre(modified);
CREATE INDEX IF NOT EXISTS person_film_work_person_idx ON person_film_work(person_id);
CREATE INDEX IF NOT EXISTS genre_film_work_genre_idx   ON genre_film_work(genre_id);
";
