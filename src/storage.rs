//! Shard storage for position rows.
//!
//! A data directory holds one live shard, appended to for the lifetime of the
//! process, and any number of archive shards (older files moved aside by the
//! operator). Archives are opened read-only at startup. A file that cannot be
//! opened or has the wrong table layout is logged and left out; it never
//! prevents startup.

use crate::config::Config;
use crate::error::Result;
use crate::index::RangePredicate;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracklog_types::point::PositionSample;

pub mod schema;
mod shard;

pub use schema::{Column, POSITIONS, SchemaDescriptor};
pub use shard::{Shard, ShardMode};

/// Anything that can answer a cell range query with timestamp-ordered rows.
pub trait PositionSource {
    /// Human readable name used in log messages
    fn name(&self) -> String;

    /// Rows whose cell id matches `predicate`, ordered by timestamp
    fn query_range(&self, predicate: &RangePredicate) -> Result<Vec<PositionSample>>;
}

/// In-memory position source, mainly for tests and tooling.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    name: String,
    samples: Vec<PositionSample>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            samples: Vec::new(),
        }
    }

    pub fn push(&mut self, sample: PositionSample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl FromIterator<PositionSample> for MemorySource {
    fn from_iter<I: IntoIterator<Item = PositionSample>>(iter: I) -> Self {
        Self {
            name: "memory".to_string(),
            samples: iter.into_iter().collect(),
        }
    }
}

impl PositionSource for MemorySource {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn query_range(&self, predicate: &RangePredicate) -> Result<Vec<PositionSample>> {
        let mut rows: Vec<PositionSample> = self
            .samples
            .iter()
            .filter(|s| predicate.matches(s.cell_id))
            .copied()
            .collect();
        // stable, so insertion order breaks ties like rowid does
        rows.sort_by_key(|s| s.timestamp);
        Ok(rows)
    }
}

/// Archive files among `entries`, sorted by path. Entries that cannot be read
/// are logged and skipped.
fn archive_candidates<I>(entries: I, live_path: &Path, extension: &str) -> Vec<PathBuf>
where
    I: IntoIterator<Item = io::Result<PathBuf>>,
{
    let mut candidates = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                log::warn!("Skipping unreadable directory entry: {}", e);
                continue;
            }
        };
        if path == live_path || !path.is_file() {
            continue;
        }
        if path.extension().is_some_and(|ext| ext == extension) {
            candidates.push(path);
        }
    }
    candidates.sort();
    candidates
}

/// A file left out of the shard set and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedShard {
    pub path: PathBuf,
    pub reason: String,
}

/// The live shard plus every accepted archive shard of a data directory.
#[derive(Debug)]
pub struct ShardSet {
    live: Shard,
    archives: Vec<Shard>,
    rejected: Vec<RejectedShard>,
}

impl ShardSet {
    /// Open the live shard and discover archives in `dir`.
    ///
    /// The directory is created if missing. Archives are opened in file name
    /// order, which is the order their rows appear in query results.
    ///
    /// # Errors
    ///
    /// Only failures of the live shard are errors.
    pub fn open<P: AsRef<Path>>(dir: P, config: &Config) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let live_path = dir.join(&config.live_file_name);
        let live = Shard::open_live(&live_path)?;

        let entries: Vec<io::Result<PathBuf>> = match fs::read_dir(dir) {
            Ok(read_dir) => read_dir.map(|entry| entry.map(|e| e.path())).collect(),
            Err(e) => {
                log::warn!("Cannot list {} for archives: {}", dir.display(), e);
                Vec::new()
            }
        };
        let candidates = archive_candidates(entries, &live_path, &config.archive_extension);

        let mut archives = Vec::new();
        let mut rejected = Vec::new();
        for path in candidates {
            match Shard::open_archive(&path) {
                Ok(shard) => archives.push(shard),
                Err(e) => {
                    log::warn!("Skipping shard {}: {}", path.display(), e);
                    rejected.push(RejectedShard {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        log::debug!(
            "Opened live shard {} and {} archive shard(s) in {}",
            live_path.display(),
            archives.len(),
            dir.display()
        );

        Ok(Self {
            live,
            archives,
            rejected,
        })
    }

    /// Write one row to the live shard.
    pub fn append(&self, sample: &PositionSample) -> Result<()> {
        self.live.append(sample)
    }

    pub fn live(&self) -> &Shard {
        &self.live
    }

    pub fn archives(&self) -> &[Shard] {
        &self.archives
    }

    /// Paths of the accepted archives in open order.
    pub fn archive_paths(&self) -> Vec<&Path> {
        self.archives.iter().map(Shard::path).collect()
    }

    pub fn rejected(&self) -> &[RejectedShard] {
        &self.rejected
    }

    /// Live shard first, then archives in open order.
    pub fn shards(&self) -> impl Iterator<Item = &Shard> + '_ {
        std::iter::once(&self.live).chain(self.archives.iter())
    }

    pub fn sources(&self) -> Vec<&dyn PositionSource> {
        self.shards().map(|s| s as &dyn PositionSource).collect()
    }

    /// Number of open shards, live included.
    pub fn len(&self) -> usize {
        1 + self.archives.len()
    }

    /// Rows of the live shard newer than `cutoff_ms`.
    pub fn recent(&self, cutoff_ms: i64) -> Result<Vec<PositionSample>> {
        self.live.since(cutoff_ms)
    }

    /// Release every handle. Close failures are logged and swallowed.
    pub fn close_all(self) {
        for shard in std::iter::once(self.live).chain(self.archives) {
            let path = shard.path().to_path_buf();
            if let Err(e) = shard.close() {
                log::error!("Error closing shard {}: {}", path.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{cover, encode};
    use rusqlite::Connection;
    use tempfile::TempDir;
    use tracklog_types::bounds::GeoBounds;
    use tracklog_types::point::LatLng;

    fn sample(ts: i64, lat: f64, lon: f64) -> PositionSample {
        PositionSample::new(ts, LatLng::new(lat, lon), encode(lat, lon))
    }

    fn write_archive(path: &Path, rows: &[PositionSample]) {
        let shard = Shard::open_live(path).unwrap();
        for row in rows {
            shard.append(row).unwrap();
        }
        shard.close().unwrap();
    }

    #[test]
    fn test_open_creates_live_shard() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("nested").join("data");

        let set = ShardSet::open(&data_dir, &Config::default()).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.archives().is_empty());
        assert!(data_dir.join("tracks.db").is_file());
        set.close_all();
    }

    #[test]
    fn test_open_discovers_archives_in_name_order() {
        let dir = TempDir::new().unwrap();
        write_archive(&dir.path().join("b-2023.db"), &[sample(2, 1.0, 1.0)]);
        write_archive(&dir.path().join("a-2022.db"), &[sample(1, 1.0, 1.0)]);
        fs::write(dir.path().join("notes.txt"), "not a shard").unwrap();

        let set = ShardSet::open(dir.path(), &Config::default()).unwrap();
        assert_eq!(set.len(), 3);
        let names: Vec<_> = set
            .archive_paths()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a-2022.db", "b-2023.db"]);
        assert!(set.rejected().is_empty());
    }

    #[test]
    fn test_open_skips_wrong_schema() {
        let dir = TempDir::new().unwrap();
        let bad = dir.path().join("bad.db");
        Connection::open(&bad)
            .unwrap()
            .execute_batch(
                "CREATE TABLE positions (timestamp INTEGER, lat TEXT, lon REAL, s2cell INTEGER)",
            )
            .unwrap();

        let set = ShardSet::open(dir.path(), &Config::default()).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.rejected().len(), 1);
        assert_eq!(set.rejected()[0].path, bad);
        assert!(set.rejected()[0].reason.contains("lat TEXT"));
    }

    #[test]
    fn test_open_skips_garbage_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("garbage.db"), vec![0x42u8; 4096]).unwrap();

        let set = ShardSet::open(dir.path(), &Config::default()).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.rejected().len(), 1);
    }

    #[test]
    fn test_append_goes_to_live_only() {
        let dir = TempDir::new().unwrap();
        write_archive(&dir.path().join("old.db"), &[sample(1, 1.0, 1.0)]);

        let set = ShardSet::open(dir.path(), &Config::default()).unwrap();
        set.append(&sample(2, 1.0, 1.0)).unwrap();

        assert_eq!(set.live().row_count().unwrap(), 1);
        assert_eq!(set.archives()[0].row_count().unwrap(), 1);
    }

    #[test]
    fn test_sources_query_every_shard() {
        let dir = TempDir::new().unwrap();
        write_archive(&dir.path().join("old.db"), &[sample(1, 60.0, 22.0)]);

        let set = ShardSet::open(dir.path(), &Config::default()).unwrap();
        set.append(&sample(2, 60.0, 22.0)).unwrap();

        let bounds = GeoBounds::new(LatLng::new(59.5, 21.5), LatLng::new(60.5, 22.5));
        let predicate = RangePredicate::from_cells(&cover(&bounds, 30, 8)).unwrap();
        let per_shard: Vec<Vec<PositionSample>> = set
            .sources()
            .iter()
            .map(|s| s.query_range(&predicate).unwrap())
            .collect();

        assert_eq!(per_shard.len(), 2);
        assert_eq!(per_shard[0][0].timestamp, 2);
        assert_eq!(per_shard[1][0].timestamp, 1);
    }

    #[test]
    fn test_unreadable_entry_does_not_stop_discovery() {
        let dir = TempDir::new().unwrap();
        let live = dir.path().join("tracks.db");
        let archive = dir.path().join("2023.db");
        for path in [&live, &archive] {
            fs::write(path, b"").unwrap();
        }
        fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let entries = vec![
            Ok(live.clone()),
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied")),
            Ok(dir.path().join("notes.txt")),
            Ok(archive.clone()),
        ];
        assert_eq!(archive_candidates(entries, &live, "db"), vec![archive]);
    }

    #[test]
    fn test_custom_live_file_name() {
        let dir = TempDir::new().unwrap();
        write_archive(&dir.path().join("tracks.db"), &[sample(1, 1.0, 1.0)]);

        let config = Config::default().with_live_file_name("live.db");
        let set = ShardSet::open(dir.path(), &config).unwrap();
        assert_eq!(set.live().path(), dir.path().join("live.db"));
        assert_eq!(set.archives().len(), 1);
    }

    #[test]
    fn test_memory_source_filters_and_sorts() {
        let source: MemorySource = [
            sample(5, 60.0, 22.0),
            sample(1, 60.0, 22.0),
            sample(3, 0.0, 0.0),
        ]
        .into_iter()
        .collect();
        let bounds = GeoBounds::new(LatLng::new(59.5, 21.5), LatLng::new(60.5, 22.5));
        let predicate = RangePredicate::from_cells(&cover(&bounds, 30, 8)).unwrap();

        let rows = source.query_range(&predicate).unwrap();
        let timestamps: Vec<i64> = rows.iter().map(|r| r.timestamp).collect();
        assert_eq!(timestamps, vec![1, 5]);
    }
}
