use anyhow::{bail, Context, Result};
use buffer::Buffer;
use sstable::{Record, TableReader, TableWriter};
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::config::EngineConfig;
use crate::metrics::Metrics;

/// The StrataKV store for one data directory.
///
/// The engine exclusively owns its two buffers and the table list; callers
/// that need to share it across threads wrap it in `Arc<Mutex<_>>`, which
/// serializes every operation and makes the flush swap and the table list
/// updates atomic publication points for readers.
pub struct Engine {
    config: EngineConfig,
    active: Buffer,
    shadow: Buffer,
    /// On-disk tables, oldest first / newest last.
    tables: Vec<TableReader>,
    flushing: bool,
    merging: bool,
    next_table_seq: u64,
    metrics: Metrics,
}

impl Engine {
    /// Opens the store rooted at `config.data_dir`, creating the directory if
    /// needed and re-discovering any tables a previous run left behind.
    ///
    /// Table names sort by creation time, so a lexicographic listing restores
    /// the newest-last order the read path depends on. Files that fail to
    /// open are logged and skipped.
    pub fn open(config: EngineConfig) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)
            .with_context(|| format!("creating data directory {}", config.data_dir.display()))?;

        let mut paths: Vec<PathBuf> = fs::read_dir(&config.data_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.extension().map_or(false, |ext| ext == "sst"))
            .collect();
        paths.sort();

        let mut tables = Vec::with_capacity(paths.len());
        for path in paths {
            match TableReader::open(&path) {
                Ok(reader) => tables.push(reader),
                Err(e) => {
                    tracing::warn!("skipping unreadable table {}: {e:#}", path.display());
                }
            }
        }
        if !tables.is_empty() {
            tracing::info!(
                "recovered {} table(s) from {}",
                tables.len(),
                config.data_dir.display()
            );
        }

        let max_entries = config.max_entries;
        Ok(Self {
            config,
            active: Buffer::with_max_entries(max_entries),
            shadow: Buffer::with_max_entries(max_entries),
            tables,
            flushing: false,
            merging: false,
            next_table_seq: 0,
            metrics: Metrics::default(),
        })
    }

    /// Stores `value` under `key`, overwriting any prior value.
    ///
    /// If the write pushes the active buffer over its entry threshold and no
    /// flush is already in progress, the flush pipeline runs before this
    /// method returns. A failed flush is logged but does not fail the put:
    /// the data stays reachable in memory and the next oversize put retries.
    pub fn put(&mut self, key: Vec<u8>, value: Vec<u8>) -> Result<()> {
        if key.is_empty() {
            bail!("empty keys are not allowed");
        }
        self.active.put(key, value)?;

        if self.active.oversize() && !self.flushing {
            if let Err(e) = self.flush() {
                tracing::error!("flush abandoned: {e:#}");
            }
        }
        Ok(())
    }

    /// Looks `key` up across every tier, newest first: active buffer, shadow
    /// buffer, then the tables from newest to oldest. Returns the first hit.
    ///
    /// A table that fails to read is treated as a miss for that table only —
    /// the walk continues into older tables — and the failure is logged.
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        if let Some(v) = self.active.get(key) {
            return Some(v.to_vec());
        }
        if let Some(v) = self.shadow.get(key) {
            return Some(v.to_vec());
        }
        for table in self.tables.iter().rev() {
            match table.find(key) {
                Ok(Some(v)) => return Some(v),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("lookup in {} failed: {e:#}", table.path().display());
                }
            }
        }
        None
    }

    /// Flushes the active buffer to a new on-disk table.
    ///
    /// No-op on an empty buffer. On failure the buffer swap is undone and the
    /// records stay reachable in memory.
    pub fn flush(&mut self) -> Result<()> {
        if self.active.is_empty() {
            return Ok(());
        }
        self.flushing = true;
        let result = self.flush_inner();
        self.flushing = false;
        result
    }

    fn flush_inner(&mut self) -> Result<()> {
        let started = Instant::now();

        // Freeze the full buffer and swap it into the shadow slot; the
        // drained former shadow becomes the new writable active.
        self.active.set_readonly(true);
        std::mem::swap(&mut self.active, &mut self.shadow);
        self.active.set_readonly(false);

        let bytes = self.shadow.size_bytes() as u64;
        let count = self.shadow.len();
        let path = self.next_table_path();

        let records: Vec<Record> = self
            .shadow
            .iter()
            .map(|(k, v)| (k.to_vec(), v.to_vec()))
            .collect();

        let published =
            TableWriter::write(&path, &records).and_then(|()| TableReader::open(&path));
        let reader = match published {
            Ok(reader) => reader,
            Err(e) => {
                // Undo the swap so the snapshot is the active buffer again.
                std::mem::swap(&mut self.active, &mut self.shadow);
                self.active.set_readonly(false);
                return Err(e.context(format!("flushing to {}", path.display())));
            }
        };
        self.tables.push(reader);

        // The shadow may only be emptied once the table is in the list, so
        // the flushed keys are findable in some tier at every point.
        self.shadow.clear();
        self.shadow.set_readonly(false);

        self.metrics.flush_time_ns += started.elapsed().as_nanos() as u64;
        self.metrics.flush_bytes += bytes;
        tracing::info!("flushed {count} record(s), {bytes} bytes to {}", path.display());
        Ok(())
    }

    /// Merges the entire table list into a single new table.
    ///
    /// Inputs are read in full, combined smallest-key-first with the newest
    /// table winning on duplicate keys, and written as one fresh table. The
    /// output is published to the table list before any input file is
    /// unlinked. No-op when the list is empty; a single-table merge rewrites
    /// the same records under a new name. On failure the previous table list
    /// is restored untouched.
    pub fn merge(&mut self) -> Result<()> {
        if self.tables.is_empty() {
            return Ok(());
        }
        self.merging = true;
        let result = self.merge_inner();
        self.merging = false;
        result
    }

    fn merge_inner(&mut self) -> Result<()> {
        let started = Instant::now();

        let inputs = std::mem::take(&mut self.tables);

        // Load every input fully; sources end up oldest first, like `inputs`.
        let mut sources: Vec<VecDeque<Record>> = Vec::with_capacity(inputs.len());
        let mut bytes = 0u64;
        for table in &inputs {
            match TableReader::load_all(table.path()) {
                Ok(records) => {
                    bytes += record_bytes(&records);
                    sources.push(records.into());
                }
                Err(e) => {
                    self.tables = inputs;
                    return Err(e.context("loading merge input"));
                }
            }
        }

        let mut merged = merge_newest_wins(sources);
        // The selection already emits ascending unique keys; keep the output
        // ordered even if that ever changes.
        merged.sort_by(|a, b| a.0.cmp(&b.0));
        bytes += record_bytes(&merged);

        let path = self.next_table_path();
        let published =
            TableWriter::write(&path, &merged).and_then(|()| TableReader::open(&path));
        let reader = match published {
            Ok(reader) => reader,
            Err(e) => {
                self.tables = inputs;
                return Err(e.context(format!("writing merge output {}", path.display())));
            }
        };

        // Publish the output before unlinking any input.
        self.tables.push(reader);
        for table in &inputs {
            if let Err(e) = fs::remove_file(table.path()) {
                tracing::warn!(
                    "could not remove merged input {}: {e}",
                    table.path().display()
                );
            }
        }

        self.metrics.merge_time_ns += started.elapsed().as_nanos() as u64;
        self.metrics.merge_bytes += bytes;
        tracing::info!(
            "merged {} table(s), {} record(s) into {}",
            inputs.len(),
            merged.len(),
            path.display()
        );
        Ok(())
    }

    /// Number of on-disk tables currently in the list.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Snapshot of the cumulative flush/merge counters.
    pub fn metrics(&self) -> Metrics {
        self.metrics
    }

    /// The configuration this engine was opened with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fresh table file name: seconds-resolution timestamp plus a monotonic
    /// counter. The counter keeps two tables created within the same second
    /// from colliding, and the existence check covers names left over from a
    /// previous run.
    fn next_table_path(&mut self) -> PathBuf {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        loop {
            let name = format!("{secs}-{:06}.sst", self.next_table_seq);
            self.next_table_seq += 1;
            let path = self.config.data_dir.join(name);
            if !path.exists() {
                return path;
            }
        }
    }
}

fn record_bytes(records: &[Record]) -> u64 {
    records
        .iter()
        .map(|(k, v)| (k.len() + v.len()) as u64)
        .sum()
}

/// K-way merge of sorted record queues, ordered oldest source first.
///
/// Repeatedly emits the smallest remaining front key. On duplicate keys the
/// entry from the newest (highest-index) source wins and the superseded
/// duplicates are dropped, so the output is ascending and free of duplicate
/// keys.
fn merge_newest_wins(mut sources: Vec<VecDeque<Record>>) -> Vec<Record> {
    let mut merged = Vec::new();
    loop {
        let mut winner: Option<usize> = None;
        for (i, source) in sources.iter().enumerate() {
            let Some((key, _)) = source.front() else {
                continue;
            };
            let better = match winner.and_then(|w| sources[w].front()) {
                None => true,
                // `<=` hands a tie to the newer source.
                Some((best, _)) => key <= best,
            };
            if better {
                winner = Some(i);
            }
        }
        let Some(w) = winner else {
            break;
        };
        let Some((key, value)) = sources[w].pop_front() else {
            break;
        };
        // Drop the losing duplicates from the older sources.
        for source in sources.iter_mut() {
            while source.front().map_or(false, |(k, _)| *k == key) {
                source.pop_front();
            }
        }
        merged.push((key, value));
    }
    merged
}
