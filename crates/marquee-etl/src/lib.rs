//! Incremental synchronisation engine for Marquee.
//!
//! Keeps one search index per collection in step with the relational source:
//! changed rows are detected against a persisted watermark, assembled into
//! denormalised documents, cascaded one hop through junction tables, and
//! written to the index in fixed-size batches.
//!
//! ```text
//! Orchestrator ─▶ extract ─▶ assemble ─┬─▶ cascade ─▶ assemble(related) ─▶ BatchSink
//!                                      └─▶ BatchSink(primary) ─▶ WatermarkStore::set
//! ```

pub mod assemble;
pub mod cascade;
pub mod config;
pub mod context;
pub mod error;
pub mod extract;
pub mod orchestrator;
pub mod registry;
pub mod retry;
pub mod sink;
pub mod state;

#[cfg(test)]
mod testing;

pub use config::EtlConfig;
pub use context::{SyncContext, SyncSettings};
pub use error::SyncError;
pub use orchestrator::{CollectionReport, CycleReport, Orchestrator};
pub use registry::{Registration, Registry};
pub use retry::RetryPolicy;
pub use sink::{BatchSink, SinkStats};
pub use state::WatermarkStore;
