//! Grouping reduction from join rows to documents.
//!
//! Rows are folded per primary id. Embedded lists behave like ordered sets:
//! a value already present (by equality) is not appended again, and order is
//! first-seen order among the input rows. Documents come out in the order
//! their id first appears.

use std::collections::HashMap;

use crate::{
  collection::Role,
  document::{Document, GenreDocument, MovieDocument, NamedRef, PersonDocument},
  row::{GenreRow, InstanceRows, MovieRow, PersonRow},
};

/// Fold instance rows of any collection into documents.
pub fn assemble(rows: InstanceRows) -> Vec<Document> {
  match rows {
    InstanceRows::Movie(rows) => {
      assemble_movies(rows).into_iter().map(Document::Movie).collect()
    }
    InstanceRows::Person(rows) => {
      assemble_persons(rows).into_iter().map(Document::Person).collect()
    }
    InstanceRows::Genre(rows) => {
      assemble_genres(rows).into_iter().map(Document::Genre).collect()
    }
  }
}

pub fn assemble_movies(rows: Vec<MovieRow>) -> Vec<MovieDocument> {
  let mut docs: Vec<MovieDocument> = Vec::new();
  let mut slots: HashMap<String, usize> = HashMap::new();

  for row in rows {
    let slot = *slots.entry(row.movie_id.clone()).or_insert_with(|| {
      docs.push(MovieDocument {
        id: row.movie_id.clone(),
        imdb_rating: row.rating,
        title: row.title.clone(),
        description: row.description.clone(),
        film_type: row.film_type.clone(),
        ..MovieDocument::default()
      });
      docs.len() - 1
    });
    let doc = &mut docs[slot];

    if let (Some(id), Some(name)) = (row.genre_id, row.genre_name) {
      push_unique(&mut doc.genre, NamedRef { id, name });
    }

    let (Some(role), Some(id), Some(name)) = (row.role, row.person_id, row.full_name)
    else {
      continue;
    };
    let (names, people) = match role {
      Role::Director => (&mut doc.directors_names, &mut doc.directors),
      Role::Actor => (&mut doc.actors_names, &mut doc.actors),
      Role::Writer => (&mut doc.writers_names, &mut doc.writers),
    };
    push_unique(names, name.clone());
    push_unique(people, NamedRef { id, name });
  }

  docs
}

pub fn assemble_persons(rows: Vec<PersonRow>) -> Vec<PersonDocument> {
  let mut docs: Vec<PersonDocument> = Vec::new();
  let mut slots: HashMap<String, usize> = HashMap::new();

  for row in rows {
    let slot = *slots.entry(row.person_id.clone()).or_insert_with(|| {
      docs.push(PersonDocument {
        id: row.person_id.clone(),
        full_name: row.full_name.clone(),
        ..PersonDocument::default()
      });
      docs.len() - 1
    });
    let doc = &mut docs[slot];

    if let Some(role) = row.role {
      push_unique(&mut doc.roles, role);
    }
    let Some(film_id) = row.film_id else { continue };
    push_unique(&mut doc.film_ids, film_id.clone());
    match row.role {
      Some(Role::Actor) => push_unique(&mut doc.actor_film_ids, film_id),
      Some(Role::Director) => push_unique(&mut doc.director_film_ids, film_id),
      Some(Role::Writer) => push_unique(&mut doc.writer_film_ids, film_id),
      None => {}
    }
  }

  docs
}

pub fn assemble_genres(rows: Vec<GenreRow>) -> Vec<GenreDocument> {
  let mut docs: Vec<GenreDocument> = Vec::new();
  let mut slots: HashMap<String, usize> = HashMap::new();

  for row in rows {
    if slots.contains_key(&row.genre_id) {
      continue;
    }
    slots.insert(row.genre_id.clone(), docs.len());
    docs.push(GenreDocument {
      id:          row.genre_id,
      name:        row.name,
      description: row.description,
    });
  }

  docs
}

fn push_unique<T: PartialEq>(list: &mut Vec<T>, value: T) {
  if !list.contains(&value) {
    list.push(value);
  }
}
