//! Fixed index names and mappings, one per collection.
//!
//! Every mapping is `dynamic: strict`: a document carrying a field the
//! mapping does not declare is rejected. Free-text fields go through the
//! `ru_en` analyzer (English and Russian stop words and stemming); ids and
//! enumerations are exact-match keywords.

use marquee_core::Collection;
use serde_json::{Value, json};

pub fn index_name(collection: Collection) -> &'static str {
  match collection {
    Collection::Movie => "movies",
    Collection::Person => "persons",
    Collection::Genre => "genres",
  }
}

/// The index body (`settings` + `mappings`) used when creating the index.
pub fn mapping(collection: Collection) -> Value {
  let mappings = match collection {
    Collection::Movie => movie_mappings(),
    Collection::Person => person_mappings(),
    Collection::Genre => genre_mappings(),
  };
  json!({ "settings": settings(), "mappings": mappings })
}

fn settings() -> Value {
  json!({
    "refresh_interval": "1s",
    "analysis": {
      "filter": {
        "english_stop":               { "type": "stop",    "stopwords": "_english_" },
        "english_stemmer":            { "type": "stemmer", "language": "english" },
        "english_possessive_stemmer": { "type": "stemmer", "language": "possessive_english" },
        "russian_stop":               { "type": "stop",    "stopwords": "_russian_" },
        "russian_stemmer":            { "type": "stemmer", "language": "russian" }
      },
      "analyzer": {
        "ru_en": {
          "tokenizer": "standard",
          "filter": [
            "lowercase",
            "english_stop",
            "english_stemmer",
            "english_possessive_stemmer",
            "russian_stop",
            "russian_stemmer"
          ]
        }
      }
    }
  })
}

fn text() -> Value { json!({ "type": "text", "analyzer": "ru_en" }) }

fn keyword() -> Value { json!({ "type": "keyword" }) }

/// A nested `{id, name}` object list.
fn named_refs() -> Value {
  json!({
    "type": "nested",
    "dynamic": "strict",
    "properties": { "id": keyword(), "name": text() }
  })
}

fn movie_mappings() -> Value {
  json!({
    "dynamic": "strict",
    "properties": {
      "id":          keyword(),
      "imdb_rating": { "type": "float" },
      "film_type":   keyword(),
      "genre":       named_refs(),
      "title": {
        "type": "text",
        "analyzer": "ru_en",
        "fields": { "raw": keyword() }
      },
      "description":     text(),
      "directors_names": text(),
      "actors_names":    text(),
      "writers_names":   text(),
      "directors":       named_refs(),
      "actors":          named_refs(),
      "writers":         named_refs()
    }
  })
}

fn person_mappings() -> Value {
  json!({
    "dynamic": "strict",
    "properties": {
      "id":                keyword(),
      "full_name":         text(),
      "roles":             keyword(),
      "film_ids":          keyword(),
      "actor_film_ids":    keyword(),
      "director_film_ids": keyword(),
      "writer_film_ids":   keyword()
    }
  })
}

fn genre_mappings() -> Value {
  json!({
    "dynamic": "strict",
    "properties": {
      "id":          keyword(),
      "name":        keyword(),
      "description": text()
    }
  })
}
