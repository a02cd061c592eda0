//! Offline table inspection: the library half of the `sst_cli` binary.

use anyhow::Result;
use buffer::Buffer;
use sstable::{Record, TableReader, TableWriter};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// All records of the table at `path`, in key order.
pub fn list(path: &Path) -> Result<Vec<Record>> {
    TableReader::load_all(path)
}

/// Single point lookup against the table at `path`.
pub fn get(path: &Path, key: &[u8]) -> Result<Option<Vec<u8>>> {
    TableReader::open(path)?.find(key)
}

/// Writes a copy of the table at `path` with `key` set to `value`.
///
/// Tables are immutable, so the result lands in a sibling file named
/// `<stem>_updated_<unix-secs>.sst` and the original is left untouched.
/// Returns the new file's path.
pub fn set(path: &Path, key: &[u8], value: &[u8]) -> Result<PathBuf> {
    let records = TableReader::load_all(path)?;

    // A scratch buffer gives overwrite semantics and a sorted drain for free.
    let mut scratch = Buffer::new();
    for (k, v) in records {
        scratch.put(k, v)?;
    }
    scratch.put(key.to_vec(), value.to_vec())?;
    let updated = scratch.drain_sorted();

    let out = updated_path(path);
    TableWriter::write(&out, &updated)?;
    Ok(out)
}

fn updated_path(path: &Path) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("table");
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    path.with_file_name(format!("{stem}_updated_{secs}.sst"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_sample(path: &Path) -> Vec<Record> {
        let records = vec![
            (b"bar".to_vec(), b"1".to_vec()),
            (b"foo".to_vec(), b"OLD".to_vec()),
            (b"qux".to_vec(), b"3".to_vec()),
        ];
        TableWriter::write(path, &records).unwrap();
        records
    }

    #[test]
    fn list_dumps_records_in_key_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.sst");
        let records = write_sample(&path);

        assert_eq!(list(&path).unwrap(), records);
    }

    #[test]
    fn get_hits_and_misses() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.sst");
        write_sample(&path);

        assert_eq!(get(&path, b"foo").unwrap(), Some(b"OLD".to_vec()));
        assert_eq!(get(&path, b"missing").unwrap(), None);
    }

    #[test]
    fn set_writes_a_sibling_and_keeps_the_original() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.sst");
        write_sample(&path);
        let original_bytes = std::fs::read(&path).unwrap();

        let out = set(&path, b"foo", b"NEW").unwrap();

        assert_ne!(out, path);
        assert!(out
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .starts_with("f_updated_"));

        // New file carries the override exactly once; old foo is gone.
        let updated = list(&out).unwrap();
        assert_eq!(
            updated,
            vec![
                (b"bar".to_vec(), b"1".to_vec()),
                (b"foo".to_vec(), b"NEW".to_vec()),
                (b"qux".to_vec(), b"3".to_vec()),
            ]
        );

        // Original table is byte-for-byte unchanged.
        assert_eq!(std::fs::read(&path).unwrap(), original_bytes);
    }

    #[test]
    fn set_can_add_a_new_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.sst");
        write_sample(&path);

        let out = set(&path, b"new-key", b"v").unwrap();
        let updated = list(&out).unwrap();
        assert_eq!(updated.len(), 4);
        assert!(updated.contains(&(b"new-key".to_vec(), b"v".to_vec())));
    }
}
