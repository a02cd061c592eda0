//! # Engine
//!
//! The top-level StrataKV store: one active write buffer, one shadow buffer
//! holding the snapshot currently being flushed, and an ordered list of
//! immutable on-disk tables (newest last).
//!
//! Writes land in the active buffer; once it crosses its entry threshold the
//! engine swaps the buffers and flushes the frozen snapshot to a new table.
//! A merge folds the whole table list into a single equivalent table,
//! preferring the newest value wherever tables overlap. Reads walk the tiers
//! newest-first: active buffer, shadow buffer, then tables newest-to-oldest.

mod config;
mod engine;
mod metrics;

pub use config::EngineConfig;
pub use engine::Engine;
pub use metrics::Metrics;
