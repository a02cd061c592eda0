use anyhow::{bail, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::ops::Bound;
use std::path::{Path, PathBuf};

use crate::codec::{read_bstr, read_footer, read_u64, FOOTER_BYTES};
use crate::Record;

/// Reads a table file for point lookups.
///
/// On [`open`](TableReader::open) the **sparse index** is loaded into memory
/// as a `BTreeMap<Vec<u8>, u64>` (block first-key → block byte offset) and
/// cached for the reader's lifetime. A point lookup then costs one seek plus
/// one block read.
///
/// The data file itself is **not** kept open between lookups — each
/// [`find`](TableReader::find) call opens the file, reads exactly one block,
/// and closes the handle. This keeps ownership simple and avoids holding
/// long-lived file descriptors across the engine's table list.
pub struct TableReader {
    /// Path to the `.sst` file on disk.
    path: PathBuf,
    /// Sparse index: each block's first key mapped to the block's offset.
    index: BTreeMap<Vec<u8>, u64>,
    /// Byte offset where the index region begins (end of the data region).
    index_start: u64,
}

impl TableReader {
    /// Opens a table file and loads its sparse index into memory.
    ///
    /// # Validation
    ///
    /// - The file must be at least 8 bytes (footer size).
    /// - The footer's index offset must point inside the file.
    /// - Every index entry's block offset must fall inside the data region,
    ///   and the index itself must not overrun the footer.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation fails or on I/O failure.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let mut f = File::open(&path_buf)?;

        let (index_start, file_len) = read_footer(&mut f)?;
        if index_start > file_len - FOOTER_BYTES {
            bail!(
                "corrupt table {}: index offset {} past end of data region",
                path_buf.display(),
                index_start
            );
        }

        f.seek(SeekFrom::Start(index_start))?;
        let n = read_u64(&mut f)?;
        let mut index = BTreeMap::new();
        for _ in 0..n {
            let first_key = read_bstr(&mut f)?;
            let offset = read_u64(&mut f)?;
            if offset >= index_start {
                bail!(
                    "corrupt table {}: block offset {} inside index region",
                    path_buf.display(),
                    offset
                );
            }
            index.insert(first_key, offset);
        }
        if f.stream_position()? > file_len - FOOTER_BYTES {
            bail!("corrupt table {}: index overruns footer", path_buf.display());
        }

        Ok(Self {
            path: path_buf,
            index,
            index_start,
        })
    }

    /// Point lookup for a single key.
    ///
    /// The target block is the one whose first key is the greatest index key
    /// `<=` the wanted key. A key that sorts before the table's smallest key
    /// returns `Ok(None)` without reading any block; otherwise exactly one
    /// block is read and scanned linearly for an exact match.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure or a truncated block.
    pub fn find(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let block_offset = match self
            .index
            .range::<[u8], _>((Bound::Unbounded, Bound::Included(key)))
            .next_back()
        {
            Some((_, offset)) => *offset,
            None => return Ok(None),
        };

        // Open file each time to keep API & ownership simple.
        let mut f = File::open(&self.path)?;
        f.seek(SeekFrom::Start(block_offset))?;

        let count = read_u64(&mut f)?;
        for _ in 0..count {
            let k = read_bstr(&mut f)?;
            let v = read_bstr(&mut f)?;
            if k == key {
                return Ok(Some(v));
            }
        }
        Ok(None)
    }

    /// Reads every record in the file in key order, without consulting the
    /// index. Blocks are read sequentially up to the footer's index offset.
    ///
    /// This is the bulk path used by compaction and the inspector; point
    /// lookups should go through [`find`](TableReader::find).
    pub fn load_all<P: AsRef<Path>>(path: P) -> Result<Vec<Record>> {
        let mut f = File::open(path.as_ref())?;

        let (index_start, file_len) = read_footer(&mut f)?;
        if index_start > file_len - FOOTER_BYTES {
            bail!(
                "corrupt table {}: index offset {} past end of data region",
                path.as_ref().display(),
                index_start
            );
        }

        f.seek(SeekFrom::Start(0))?;
        let mut records = Vec::new();
        while f.stream_position()? < index_start {
            let count = read_u64(&mut f)?;
            for _ in 0..count {
                let key = read_bstr(&mut f)?;
                let value = read_bstr(&mut f)?;
                records.push((key, value));
            }
        }
        Ok(records)
    }

    /// The path this reader was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of data blocks (= number of sparse index entries).
    pub fn block_count(&self) -> usize {
        self.index.len()
    }

    /// Byte offset where the data region ends.
    pub fn data_len(&self) -> u64 {
        self.index_start
    }
}
