//! # SSTable — Sorted String Table
//!
//! Immutable, on-disk storage files for the StrataKV storage engine.
//!
//! When the in-memory write buffer crosses its entry threshold the engine
//! flushes it to disk as a table. Tables are **write-once, read-many**
//! — once created they are never modified, only replaced during compaction.
//!
//! ## File layout
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │ DATA BLOCKS                                   │
//! │                                               │
//! │ count (u64) | count × (key bstr | value bstr) │
//! │                                               │
//! │ ... repeated per block of 4 records ...       │
//! ├───────────────────────────────────────────────┤
//! │ SPARSE INDEX (one entry per block)            │
//! │                                               │
//! │ n (u64) | n × (first_key bstr | offset u64)   │
//! ├───────────────────────────────────────────────┤
//! │ FOOTER (always last 8 bytes)                  │
//! │                                               │
//! │ index_start_offset (u64 LE)                   │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! All integers are little-endian. A `bstr` is a u64 length prefix followed
//! by that many raw bytes. Records are globally ascending by key, so a point
//! lookup needs the footer, the index, and exactly one block.

pub mod codec;
mod reader;
mod writer;

pub use reader::TableReader;
pub use writer::{TableWriter, BLOCK_SIZE};

/// A single key-value pair as stored in a table.
pub type Record = (Vec<u8>, Vec<u8>);
