use anyhow::Result;
use std::fs::{create_dir_all, rename, OpenOptions};
use std::io::{Seek, Write};
use std::path::Path;

use crate::codec::{write_bstr, write_footer, write_u64};
use crate::Record;

/// Number of records per data block.
///
/// Only the writer needs this — readers discover each block's size from its
/// on-disk count. A smaller block means a larger index but smaller reads per
/// lookup.
pub const BLOCK_SIZE: usize = 4;

/// Writes a sorted record sequence to disk as an immutable table file.
///
/// The writer is stateless — all work happens inside the single static method
/// [`write`](TableWriter::write). The write is crash-safe: data is first
/// written to a temporary file, fsynced, and then atomically renamed to the
/// final path.
pub struct TableWriter {}

impl TableWriter {
    /// Writes `records` to a new table file at `path`.
    ///
    /// `records` must already be sorted by key with no duplicate keys; the
    /// caller enforces both. An empty slice produces a valid zero-record
    /// table. Missing parent directories are created.
    ///
    /// # Crash Safety
    ///
    /// Writes to `path.sst.tmp`, calls `sync_all()`, then atomically renames.
    /// If the process crashes mid-write the temp file is left behind and
    /// ignored on recovery.
    ///
    /// # Errors
    ///
    /// Returns an error on any I/O failure; the final path is never touched
    /// unless the whole file was written and synced.
    pub fn write(path: &Path, records: &[Record]) -> Result<()> {
        debug_assert!(
            records.windows(2).all(|w| w[0].0 < w[1].0),
            "records must be sorted by key without duplicates"
        );

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }

        // Create temporary file next to target for atomic rename later
        let tmp_path = path.with_extension("sst.tmp");
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)?;

        // Keep an in-memory index: (first key of block, offset)
        let mut index: Vec<(&[u8], u64)> = Vec::new();

        // Write DATA BLOCKS
        for block in records.chunks(BLOCK_SIZE) {
            let offset = file.stream_position()?;
            index.push((&block[0].0, offset));

            write_u64(&mut file, block.len() as u64)?;
            for (key, value) in block {
                write_bstr(&mut file, key)?;
                write_bstr(&mut file, value)?;
            }
        }

        // Write SPARSE INDEX and remember where it starts
        let index_start = file.stream_position()?;
        write_u64(&mut file, index.len() as u64)?;
        for (first_key, offset) in &index {
            write_bstr(&mut file, first_key)?;
            write_u64(&mut file, *offset)?;
        }

        // Write FOOTER
        write_footer(&mut file, index_start)?;

        // Flush and sync
        file.flush()?;
        file.sync_all()?;

        // Atomically move into place
        rename(tmp_path, path)?;

        Ok(())
    }
}
