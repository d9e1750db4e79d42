//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{DateTime, Duration, Utc};
use marquee_core::{
  Collection, Role, assemble::assemble_movies, row::InstanceRows, source::SourceStore,
  watermark_floor,
};
use uuid::Uuid;

use crate::{SqliteStore, encode::encode_dt};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn ts(offset_secs: i64) -> DateTime<Utc> {
  DateTime::from_timestamp(1_700_000_000, 0).unwrap() + Duration::seconds(offset_secs)
}

async fn insert_movie(s: &SqliteStore, id: &str, title: &str, modified: DateTime<Utc>) {
  s.execute_batch(format!(
    "INSERT INTO film_work (id, title, description, rating, type, modified)
     VALUES ('{id}', '{title}', 'About {title}', 8.1, 'movie', '{}')",
    encode_dt(modified)
  ))
  .await
  .unwrap();
}

async fn insert_person(s: &SqliteStore, id: &str, name: &str, modified: DateTime<Utc>) {
  s.execute_batch(format!(
    "INSERT INTO person (id, full_name, modified) VALUES ('{id}', '{name}', '{}')",
    encode_dt(modified)
  ))
  .await
  .unwrap();
}

async fn insert_genre(s: &SqliteStore, id: &str, name: &str, modified: DateTime<Utc>) {
  s.execute_batch(format!(
    "INSERT INTO genre (id, name, modified) VALUES ('{id}', '{name}', '{}')",
    encode_dt(modified)
  ))
  .await
  .unwrap();
}

async fn credit(s: &SqliteStore, movie: &str, person: &str, role: &str) {
  s.execute_batch(format!(
    "INSERT INTO person_film_work (film_work_id, person_id, role)
     VALUES ('{movie}', '{person}', '{role}')"
  ))
  .await
  .unwrap();
}

async fn tag(s: &SqliteStore, movie: &str, genre: &str) {
  s.execute_batch(format!(
    "INSERT INTO genre_film_work (film_work_id, genre_id) VALUES ('{movie}', '{genre}')"
  ))
  .await
  .unwrap();
}

fn ids(v: &[&str]) -> Vec<String> { v.iter().map(|s| s.to_string()).collect() }

// ─── Change extraction ───────────────────────────────────────────────────────

#[tokio::test]
async fn changed_since_orders_and_limits() {
  let s = store().await;
  insert_movie(&s, "m3", "Third", ts(3)).await;
  insert_movie(&s, "m1", "First", ts(1)).await;
  insert_movie(&s, "m2", "Second", ts(2)).await;

  let rows = s.changed_since(Collection::Movie, watermark_floor(), 2).await.unwrap();
  let got: Vec<_> = rows.iter().map(|r| r.id.as_str()).collect();
  assert_eq!(got, ["m1", "m2"]);
  assert_eq!(rows[1].modified, ts(2));

  let rest = s.changed_since(Collection::Movie, ts(2), 2).await.unwrap();
  assert_eq!(rest.len(), 1);
  assert_eq!(rest[0].id, "m3");

  let none = s.changed_since(Collection::Movie, ts(3), 2).await.unwrap();
  assert!(none.is_empty());
}

#[tokio::test]
async fn changed_since_is_strictly_greater() {
  let s = store().await;
  insert_person(&s, "p1", "Ann", ts(5)).await;
  insert_person(&s, "p2", "Bob", ts(5)).await;

  let at = s.changed_since(Collection::Person, ts(5), 10).await.unwrap();
  assert!(at.is_empty());
  let before = s.changed_since(Collection::Person, ts(4), 10).await.unwrap();
  assert_eq!(before.len(), 2);
}

#[tokio::test]
async fn changed_at_returns_rest_of_timestamp_group() {
  let s = store().await;
  insert_movie(&s, "m1", "Alpha", ts(1)).await;
  insert_movie(&s, "m4", "Delta", ts(2)).await;
  insert_movie(&s, "m2", "Beta", ts(2)).await;
  insert_movie(&s, "m3", "Gamma", ts(2)).await;
  insert_movie(&s, "m5", "Echo", ts(3)).await;

  let batch = s.changed_since(Collection::Movie, ts(0), 2).await.unwrap();
  let last = batch.last().unwrap();
  assert_eq!((last.id.as_str(), last.modified), ("m2", ts(2)));

  let rest = s.changed_at(Collection::Movie, ts(2), &last.id).await.unwrap();
  let got: Vec<_> = rest.iter().map(|r| r.id.as_str()).collect();
  assert_eq!(got, ["m3", "m4"]);
  assert!(rest.iter().all(|r| r.modified == ts(2)));

  assert!(s.changed_at(Collection::Movie, ts(2), "m4").await.unwrap().is_empty());
}

// ─── Instance rows ───────────────────────────────────────────────────────────

#[tokio::test]
async fn movie_instance_rows_join_people_and_genres() {
  let s = store().await;
  insert_movie(&s, "m1", "Alpha", ts(1)).await;
  insert_person(&s, "p1", "Ann", ts(1)).await;
  insert_person(&s, "p2", "Bob", ts(1)).await;
  insert_genre(&s, "g1", "Drama", ts(1)).await;
  insert_genre(&s, "g2", "Comedy", ts(1)).await;
  credit(&s, "m1", "p1", "actor").await;
  credit(&s, "m1", "p2", "director").await;
  tag(&s, "m1", "g1").await;
  tag(&s, "m1", "g2").await;

  let rows = s.instance_rows(Collection::Movie, &ids(&["m1"])).await.unwrap();
  let InstanceRows::Movie(rows) = rows else { panic!("expected movie rows") };
  // 2 credits × 2 genres.
  assert_eq!(rows.len(), 4);

  let docs = assemble_movies(rows);
  assert_eq!(docs.len(), 1);
  assert_eq!(docs[0].title, "Alpha");
  assert_eq!(docs[0].imdb_rating, Some(8.1));
  assert_eq!(docs[0].genre.len(), 2);
  assert_eq!(docs[0].actors_names, vec!["Ann"]);
  assert_eq!(docs[0].directors_names, vec!["Bob"]);
}

#[tokio::test]
async fn movie_without_links_yields_single_null_joined_row() {
  let s = store().await;
  insert_movie(&s, "m1", "Lonely", ts(1)).await;

  let InstanceRows::Movie(rows) =
    s.instance_rows(Collection::Movie, &ids(&["m1"])).await.unwrap()
  else {
    panic!("expected movie rows")
  };
  assert_eq!(rows.len(), 1);
  assert!(rows[0].person_id.is_none());
  assert!(rows[0].genre_id.is_none());
  assert!(rows[0].role.is_none());
}

#[tokio::test]
async fn person_instance_rows_carry_roles() {
  let s = store().await;
  insert_movie(&s, "m1", "Alpha", ts(1)).await;
  insert_person(&s, "p1", "Ann", ts(1)).await;
  credit(&s, "m1", "p1", "writer").await;

  let InstanceRows::Person(rows) =
    s.instance_rows(Collection::Person, &ids(&["p1"])).await.unwrap()
  else {
    panic!("expected person rows")
  };
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].role, Some(Role::Writer));
  assert_eq!(rows[0].film_id.as_deref(), Some("m1"));
}

#[tokio::test]
async fn instance_rows_for_no_ids_is_empty() {
  let s = store().await;
  let rows = s.instance_rows(Collection::Genre, &[]).await.unwrap();
  assert!(rows.is_empty());
}

#[tokio::test]
async fn instance_rows_for_many_ids() {
  let s = store().await;
  let mut wanted = Vec::new();
  for i in 0..50 {
    let id = Uuid::new_v4().to_string();
    insert_genre(&s, &id, &format!("Genre {i}"), ts(i)).await;
    wanted.push(id);
  }
  let rows = s.instance_rows(Collection::Genre, &wanted).await.unwrap();
  assert_eq!(rows.len(), 50);
}

// ─── Relations ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn person_change_reaches_linked_movies_once() {
  let s = store().await;
  insert_movie(&s, "f2", "Later", ts(20)).await;
  insert_movie(&s, "f1", "Earlier", ts(10)).await;
  insert_movie(&s, "f3", "Unrelated", ts(5)).await;
  insert_person(&s, "p1", "Ann", ts(1)).await;
  credit(&s, "f1", "p1", "actor").await;
  credit(&s, "f1", "p1", "director").await;
  credit(&s, "f2", "p1", "writer").await;

  let relation = Collection::Person.relations()[0];
  let related = s.related_ids(relation, &ids(&["p1"])).await.unwrap();
  // Distinct, ordered by the movies' own `modified`.
  assert_eq!(related, ["f1", "f2"]);
}

#[tokio::test]
async fn movie_change_reaches_genres_and_people() {
  let s = store().await;
  insert_movie(&s, "m1", "Alpha", ts(1)).await;
  insert_person(&s, "p1", "Ann", ts(1)).await;
  insert_genre(&s, "g1", "Drama", ts(1)).await;
  insert_genre(&s, "g2", "Comedy", ts(2)).await;
  credit(&s, "m1", "p1", "actor").await;
  tag(&s, "m1", "g1").await;

  let mut found = Vec::new();
  for relation in Collection::Movie.relations() {
    let related = s.related_ids(*relation, &ids(&["m1"])).await.unwrap();
    found.push((relation.target, related));
  }
  assert_eq!(
    found,
    vec![
      (Collection::Genre, ids(&["g1"])),
      (Collection::Person, ids(&["p1"])),
    ]
  );
}

#[tokio::test]
async fn relation_without_links_is_empty() {
  let s = store().await;
  insert_genre(&s, "g1", "Drama", ts(1)).await;
  let relation = Collection::Genre.relations()[0];
  let related = s.related_ids(relation, &ids(&["g1"])).await.unwrap();
  assert!(related.is_empty());
}

#[tokio::test]
async fn unknown_role_is_a_decode_error() {
  let s = store().await;
  insert_movie(&s, "m1", "Alpha", ts(1)).await;
  insert_person(&s, "p1", "Ann", ts(1)).await;
  // Bypass the CHECK constraint to simulate a foreign writer.
  s.execute_batch(
    "PRAGMA ignore_check_constraints = ON;
     INSERT INTO person_film_work (film_work_id, person_id, role) VALUES ('m1', 'p1', 'stunt');",
  )
  .await
  .unwrap();

  let err = s.instance_rows(Collection::Person, &ids(&["p1"])).await.unwrap_err();
  assert!(err.to_string().contains("stunt"), "{err}");
}
