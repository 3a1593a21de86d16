//! Track database builder
//!
//! Collects the own vessel id, the data directory and configuration before
//! any file is touched.

use crate::config::{Config, ShardOrdering};
use crate::db::TrackDb;
use crate::error::{Result, TrackError};
use crate::storage::ShardSet;
use std::path::PathBuf;

/// Builder for [`TrackDb`] with custom data directory and settings.
#[derive(Debug)]
pub struct TrackDbBuilder {
    self_id: String,
    data_dir: Option<PathBuf>,
    config: Config,
}

impl TrackDbBuilder {
    /// Start a builder for the vessel identified by `self_id`
    /// (e.g. `urn:mrn:imo:mmsi:230099999`).
    pub fn new(self_id: impl Into<String>) -> Self {
        Self {
            self_id: self_id.into(),
            data_dir: None,
            config: Config::default(),
        }
    }

    /// Directory holding the live shard and archive shards. Created if needed.
    pub fn data_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.into());
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn gap_threshold_ms(mut self, gap_ms: i64) -> Self {
        self.config = self.config.with_gap_threshold_ms(gap_ms);
        self
    }

    pub fn shard_ordering(mut self, ordering: ShardOrdering) -> Self {
        self.config = self.config.with_shard_ordering(ordering);
        self
    }

    /// Validate the configuration and open every shard.
    ///
    /// # Errors
    ///
    /// `Config` for an empty vessel id, a missing data directory or an
    /// invalid configuration. Errors opening the live shard are passed on;
    /// unusable archives are skipped.
    pub fn build(self) -> Result<TrackDb> {
        if self.self_id.trim().is_empty() {
            return Err(TrackError::Config("vessel id must not be empty".into()));
        }
        self.config.validate().map_err(TrackError::Config)?;

        let data_dir = self
            .data_dir
            .ok_or_else(|| TrackError::Config("data directory not set".into()))?;
        let shards = ShardSet::open(&data_dir, &self.config)?;

        log::info!(
            "Track database for vessels.{} opened with {} shard(s) from {}",
            self.self_id,
            shards.len(),
            data_dir.display()
        );
        Ok(TrackDb::from_parts(&self.self_id, self.config, shards))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builder_defaults() {
        let builder = TrackDbBuilder::new("urn:mrn:imo:mmsi:230099999");
        assert!(builder.data_dir.is_none());
        assert_eq!(builder.config, Config::default());
    }

    #[test]
    fn test_builder_requires_data_dir() {
        let err = TrackDbBuilder::new("urn:mrn:imo:mmsi:230099999")
            .build()
            .unwrap_err();
        assert!(matches!(err, TrackError::Config(_)));
    }

    #[test]
    fn test_builder_rejects_empty_id() {
        let dir = TempDir::new().unwrap();
        let err = TrackDbBuilder::new("  ")
            .data_dir(dir.path())
            .build()
            .unwrap_err();
        assert!(matches!(err, TrackError::Config(_)));
    }

    #[test]
    fn test_builder_with_config() {
        let dir = TempDir::new().unwrap();
        let config = Config::default()
            .with_live_file_name("live.db")
            .with_highest_quality(true);

        let db = TrackDbBuilder::new("urn:mrn:imo:mmsi:230099999")
            .data_dir(dir.path())
            .config(config)
            .gap_threshold_ms(60_000)
            .shard_ordering(ShardOrdering::MergedByTime)
            .build()
            .unwrap();

        assert!(dir.path().join("live.db").is_file());
        assert_eq!(db.config().gap_threshold_ms, 60_000);
        assert_eq!(db.config().shard_ordering, ShardOrdering::MergedByTime);
        assert!(db.config().highest_quality);
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            cover_max_cells: 0,
            ..Config::default()
        };
        let err = TrackDbBuilder::new("urn:mrn:imo:mmsi:230099999")
            .data_dir(dir.path())
            .config(config)
            .build()
            .unwrap_err();
        assert!(matches!(err, TrackError::Config(_)));
    }
}
