//! Configuration for the track store.
//!
//! Every field has a default, so an empty JSON object is a valid
//! configuration.
use serde::de::Error;

/// How rows from several shards are combined before segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShardOrdering {
    /// Each shard is ordered by timestamp on its own and shard results are
    /// concatenated in shard-open order. Correct only when shards cover
    /// disjoint time ranges.
    #[default]
    PerShard,
    /// Rows of all shards are merged by timestamp into one sequence.
    MergedByTime,
}

/// Track store configuration
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// File name of the writable shard inside the data directory
    #[serde(default = "Config::default_live_file_name")]
    pub live_file_name: String,

    /// Extension (without the dot) of files considered as archive shards
    #[serde(default = "Config::default_archive_extension")]
    pub archive_extension: String,

    /// A gap longer than this (ms) between consecutive rows starts a new track
    #[serde(default = "Config::default_gap_threshold_ms")]
    pub gap_threshold_ms: i64,

    #[serde(default = "Config::default_cover_max_level")]
    pub cover_max_level: u8,

    #[serde(default = "Config::default_cover_max_cells")]
    pub cover_max_cells: usize,

    /// Radius (m) used when a query is centered on the own position without one
    #[serde(default = "Config::default_radius_m")]
    pub default_radius_m: f64,

    /// Window (ms) for `recent_positions`
    #[serde(default = "Config::default_recent_window_ms")]
    pub recent_window_ms: i64,

    /// Skip the radial prefilter and run Douglas-Peucker only
    #[serde(default)]
    pub highest_quality: bool,

    #[serde(default)]
    pub shard_ordering: ShardOrdering,

    /// Entries kept in the cell id cache, 0 disables it
    #[serde(default = "Config::default_cell_cache_capacity")]
    pub cell_cache_capacity: usize,
}

impl Config {
    fn default_live_file_name() -> String {
        "tracks.db".to_string()
    }

    fn default_archive_extension() -> String {
        "db".to_string()
    }

    const fn default_gap_threshold_ms() -> i64 {
        5 * 60 * 1000
    }

    const fn default_cover_max_level() -> u8 {
        30
    }

    const fn default_cover_max_cells() -> usize {
        8
    }

    const fn default_radius_m() -> f64 {
        1000.0
    }

    const fn default_recent_window_ms() -> i64 {
        60 * 60 * 1000
    }

    const fn default_cell_cache_capacity() -> usize {
        4096
    }

    pub fn with_live_file_name(mut self, name: impl Into<String>) -> Self {
        self.live_file_name = name.into();
        self
    }

    pub fn with_gap_threshold_ms(mut self, gap_ms: i64) -> Self {
        assert!(gap_ms > 0, "Gap threshold must be greater than zero");
        self.gap_threshold_ms = gap_ms;
        self
    }

    pub fn with_covering(mut self, max_level: u8, max_cells: usize) -> Self {
        self.cover_max_level = max_level;
        self.cover_max_cells = max_cells;
        self
    }

    pub fn with_default_radius(mut self, radius_m: f64) -> Self {
        self.default_radius_m = radius_m;
        self
    }

    pub fn with_highest_quality(mut self, highest_quality: bool) -> Self {
        self.highest_quality = highest_quality;
        self
    }

    pub fn with_shard_ordering(mut self, ordering: ShardOrdering) -> Self {
        self.shard_ordering = ordering;
        self
    }

    pub fn with_cell_cache_capacity(mut self, capacity: usize) -> Self {
        if capacity > 1_000_000 {
            log::warn!(
                "Cell cache capacity of {} is very large; each entry keeps a 32 byte key",
                capacity
            );
        }
        self.cell_cache_capacity = capacity;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.live_file_name.trim().is_empty() {
            return Err("Live file name must not be empty".to_string());
        }

        if self.archive_extension.is_empty() || self.archive_extension.contains('.') {
            return Err(format!(
                "Archive extension must be a bare extension, got '{}'",
                self.archive_extension
            ));
        }

        if self.gap_threshold_ms <= 0 {
            return Err("Gap threshold must be greater than zero".to_string());
        }

        if self.cover_max_level > 30 {
            return Err(format!(
                "Covering level must be at most 30, got {}",
                self.cover_max_level
            ));
        }

        if self.cover_max_cells == 0 {
            return Err("Covering must allow at least one cell".to_string());
        }

        if !self.default_radius_m.is_finite() || self.default_radius_m <= 0.0 {
            return Err(format!(
                "Default radius must be positive, got {}",
                self.default_radius_m
            ));
        }

        if self.recent_window_ms <= 0 {
            return Err("Recent window must be greater than zero".to_string());
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            live_file_name: Self::default_live_file_name(),
            archive_extension: Self::default_archive_extension(),
            gap_threshold_ms: Self::default_gap_threshold_ms(),
            cover_max_level: Self::default_cover_max_level(),
            cover_max_cells: Self::default_cover_max_cells(),
            default_radius_m: Self::default_radius_m(),
            recent_window_ms: Self::default_recent_window_ms(),
            highest_quality: false,
            shard_ordering: ShardOrdering::default(),
            cell_cache_capacity: Self::default_cell_cache_capacity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.live_file_name, "tracks.db");
        assert_eq!(config.gap_threshold_ms, 300_000);
        assert_eq!(config.cover_max_level, 30);
        assert_eq!(config.cover_max_cells, 8);
        assert_eq!(config.shard_ordering, ShardOrdering::PerShard);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_empty_json_is_default() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default()
            .with_gap_threshold_ms(60_000)
            .with_shard_ordering(ShardOrdering::MergedByTime)
            .with_highest_quality(true);

        let json = config.to_json().unwrap();
        let deserialized = Config::from_json(&json).unwrap();

        assert_eq!(deserialized.gap_threshold_ms, 60_000);
        assert_eq!(deserialized.shard_ordering, ShardOrdering::MergedByTime);
        assert!(deserialized.highest_quality);
    }

    #[test]
    fn test_config_rejects_unknown_fields() {
        assert!(Config::from_json(r#"{"unknown": 1}"#).is_err());
    }

    #[test]
    fn test_config_validation() {
        assert!(Config::from_json(r#"{"cover_max_level": 31}"#).is_err());
        assert!(Config::from_json(r#"{"cover_max_cells": 0}"#).is_err());
        assert!(Config::from_json(r#"{"archive_extension": ".db"}"#).is_err());
        assert!(Config::from_json(r#"{"default_radius_m": -5.0}"#).is_err());
        assert!(Config::from_json(r#"{"shard_ordering": "merged_by_time"}"#).is_ok());
    }

    #[test]
    #[should_panic(expected = "Gap threshold must be greater than zero")]
    fn test_config_zero_gap_panics() {
        let _ = Config::default().with_gap_threshold_ms(0);
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_config_toml_roundtrip() {
        let config = Config::default().with_live_file_name("live.db");
        let text = config.to_toml().unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), config);
    }
}
