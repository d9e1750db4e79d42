//! Core types and trait definitions for the Marquee sync engine.
//!
//! No HTTP or database dependencies live here. The relational source and the
//! search index are reached only through the [`source::SourceStore`] and
//! [`index::SearchIndex`] traits.

// Trait futures spell out their `Send` bounds explicitly.
#![allow(async_fn_in_trait)]

pub mod assemble;
pub mod collection;
pub mod document;
pub mod error;
pub mod index;
pub mod row;
pub mod source;

pub use collection::{Collection, Junction, Relation, Role, watermark_floor};
pub use document::Document;
pub use error::{Error, Result, Transient};
