//! SQLite backend for the Marquee relational source.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod encode;
mod schema;
mod store;

pub mod error;

pub use encode::encode_dt;
pub use error::{Error, Result};
pub use schema::SCHEMA;
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
