//! The track database.
//!
//! `TrackDb` ties the spatial index, the shard set and the reconstructor
//! together. It records positions of the own vessel into the live shard and
//! answers track queries over every shard of the data directory.

use crate::builder::TrackDbBuilder;
use crate::compute::bbox::{QueryBounds, resolve};
use crate::compute::validation::{validate_bounds, validate_position};
use crate::config::Config;
use crate::error::{Result, TrackError};
use crate::index::{CacheStats, SpatialIndex};
use crate::storage::{RejectedShard, ShardSet};
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracklog_types::point::{LatLng, PositionSample};
use tracklog_types::track::{TrackCollection, TrackQuery};

mod reconstruct;

pub use reconstruct::{
    DEGENERATE_TOLERANCE, TrackReconstructor, merge_by_time, segment, tolerance_for,
};

/// Context aliases that always refer to the own vessel.
const SELF_ALIASES: [&str; 2] = ["vessels.self", "self"];

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as i64
}

/// Position history of the own vessel, sharded over SQLite files.
///
/// Only positions of the own vessel are recorded: the shard rows carry no
/// context column, so positions for other contexts are dropped on insert
/// rather than stored under the wrong vessel. Queries always report their
/// tracks under the own context, which is `vessels.<self id>`.
///
/// # Examples
///
/// ```rust
/// use tracklog::{TrackDb, TrackQuery};
/// use tracklog::types::{GeoBounds, LatLng};
///
/// let dir = tempfile::tempdir()?;
/// let mut db = TrackDb::open("urn:mrn:imo:mmsi:230099999", dir.path())?;
///
/// db.insert_position("vessels.self", LatLng::new(60.15, 24.95), Some(1_000))?;
/// db.insert_position("vessels.self", LatLng::new(60.16, 24.96), Some(2_000))?;
///
/// let bbox = GeoBounds::new(LatLng::new(60.0, 24.8), LatLng::new(60.3, 25.1));
/// let tracks = db.query_tracks(&TrackQuery::with_bbox(bbox), None)?;
/// assert_eq!(tracks.track_count(), 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct TrackDb {
    self_context: String,
    config: Config,
    index: SpatialIndex,
    shards: Option<ShardSet>,
}

impl TrackDb {
    /// Open the data directory with default configuration.
    pub fn open<P: AsRef<Path>>(self_id: &str, data_dir: P) -> Result<Self> {
        TrackDbBuilder::new(self_id)
            .data_dir(data_dir.as_ref())
            .build()
    }

    pub fn builder(self_id: &str) -> TrackDbBuilder {
        TrackDbBuilder::new(self_id)
    }

    pub(crate) fn from_parts(self_id: &str, config: Config, shards: ShardSet) -> Self {
        let index = SpatialIndex::new(&config);
        Self {
            self_context: format!("vessels.{}", self_id),
            config,
            index,
            shards: Some(shards),
        }
    }

    /// Context the own vessel's tracks are reported under.
    pub fn self_context(&self) -> &str {
        &self.self_context
    }

    pub fn is_self(&self, context: &str) -> bool {
        context == self.self_context || SELF_ALIASES.contains(&context)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.shards.is_none()
    }

    /// Open shards, live included. Zero once closed.
    pub fn shard_count(&self) -> usize {
        self.shards.as_ref().map_or(0, ShardSet::len)
    }

    /// Archive files that were skipped while opening.
    pub fn rejected_shards(&self) -> &[RejectedShard] {
        match &self.shards {
            Some(shards) => shards.rejected(),
            None => &[],
        }
    }

    fn shards(&self) -> Result<&ShardSet> {
        self.shards.as_ref().ok_or(TrackError::DatabaseClosed)
    }

    /// Record a position for `context`.
    ///
    /// Positions of other vessels are ignored and `Ok(false)` is returned.
    /// Without a timestamp the current time is used.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for out of range coordinates, `DatabaseClosed` after
    /// [`close`](Self::close), `Storage` if the live shard write fails.
    pub fn insert_position(
        &mut self,
        context: &str,
        position: LatLng,
        timestamp: Option<i64>,
    ) -> Result<bool> {
        if self.is_closed() {
            return Err(TrackError::DatabaseClosed);
        }
        if !self.is_self(context) {
            log::debug!("Ignoring position for {}", context);
            return Ok(false);
        }
        validate_position(&position)?;

        let cell_id = self.index.encode(&position);
        let timestamp = timestamp.unwrap_or_else(now_millis);
        let sample = PositionSample::new(timestamp, position, cell_id);
        self.shards()?.append(&sample)?;
        Ok(true)
    }

    /// Tracks of the own vessel inside the query area.
    ///
    /// The area is the explicit bounding box of `query` when present.
    /// Otherwise it is a circle of `query.radius` meters (default from
    /// config) around `self_position`.
    ///
    /// A closed database returns an empty collection.
    ///
    /// # Errors
    ///
    /// `MissingQueryBounds` when neither a bounding box nor a position is
    /// available, `InvalidRadius` for a non-positive radius, `InvalidInput`
    /// for an out of range box or position.
    pub fn query_tracks(
        &self,
        query: &TrackQuery,
        self_position: Option<LatLng>,
    ) -> Result<TrackCollection> {
        let bounds = match (query.bbox, self_position) {
            (Some(bbox), _) => {
                validate_bounds(&bbox)?;
                QueryBounds::Explicit(bbox)
            }
            (None, Some(center)) => {
                validate_position(&center)?;
                QueryBounds::Around {
                    center,
                    radius_m: query.radius.unwrap_or(self.config.default_radius_m),
                }
            }
            (None, None) => return Err(TrackError::MissingQueryBounds),
        };
        let bounds = resolve(bounds)?;

        let mut collection = TrackCollection::new();
        let Some(shards) = &self.shards else {
            log::warn!("Track query on closed database");
            return Ok(collection);
        };

        let tracks = TrackReconstructor::new(&self.index, &self.config)
            .reconstruct(&bounds, &shards.sources())?;
        collection.insert(self.self_context.clone(), tracks);
        Ok(collection)
    }

    /// Positions of the own vessel recorded in the live shard during the
    /// recent window, oldest first. Other contexts have none.
    pub fn recent_positions(&self, context: &str) -> Result<Vec<LatLng>> {
        if !self.is_self(context) {
            return Ok(Vec::new());
        }
        let cutoff = now_millis() - self.config.recent_window_ms;
        let rows = self.shards()?.recent(cutoff)?;
        Ok(rows.iter().map(PositionSample::position).collect())
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.index.cache_stats()
    }

    pub fn reset_cell_cache(&mut self) {
        self.index.reset_cache();
    }

    /// Release all shard handles. Safe to call more than once.
    pub fn close(&mut self) {
        if let Some(shards) = self.shards.take() {
            log::debug!("Closing {} shard(s)", shards.len());
            shards.close_all();
        }
    }
}

impl Drop for TrackDb {
    fn drop(&mut self) {
        self.close();
    }
}
