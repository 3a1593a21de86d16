//! Turning stored positions into simplified track segments.
//!
//! For a query rectangle the reconstructor asks the spatial index for a
//! covering, runs the resulting range predicate against every position
//! source, splits each source's time-ordered rows wherever the vessel went
//! silent for longer than the gap threshold and simplifies every segment.

use crate::compute::simplify::{simplify, sq_dist};
use crate::config::{Config, ShardOrdering};
use crate::error::Result;
use crate::index::SpatialIndex;
use crate::storage::PositionSource;
use tracklog_types::bounds::GeoBounds;
use tracklog_types::point::PositionSample;
use tracklog_types::track::Track;

/// Tolerance used when the query rectangle has no extent.
pub const DEGENERATE_TOLERANCE: f64 = 0.001;

/// Tolerance divisor applied to the squared diagonal of the query rectangle.
const TOLERANCE_DIVISOR: f64 = 100_000.0;

/// Simplification tolerance derived from the size of the query rectangle.
///
/// The squared diagonal scaled down by 100 000, or `0.001` for a rectangle
/// without extent. The returned value is in the same units as `sq_dist` and
/// is squared once more before it reaches the simplifier.
pub fn tolerance_for(bounds: &GeoBounds) -> f64 {
    let tolerance = sq_dist(&bounds.sw, &bounds.ne) / TOLERANCE_DIVISOR;
    if tolerance > 0.0 && tolerance.is_finite() {
        tolerance
    } else {
        DEGENERATE_TOLERANCE
    }
}

/// Split time-ordered rows into tracks.
///
/// A new track starts whenever the time since the previous row is strictly
/// greater than `gap_threshold_ms`. Empty input gives no tracks.
pub fn segment(rows: &[PositionSample], gap_threshold_ms: i64) -> Vec<Track> {
    let mut tracks = Vec::new();
    let mut current: Track = Vec::new();
    let mut prev_ts: Option<i64> = None;

    for row in rows {
        if let Some(prev) = prev_ts
            && row.timestamp.saturating_sub(prev) > gap_threshold_ms
        {
            tracks.push(std::mem::take(&mut current));
        }
        current.push(row.to_track_point());
        prev_ts = Some(row.timestamp);
    }

    if !current.is_empty() {
        tracks.push(current);
    }
    tracks
}

/// Interleave per-source row lists into one list ordered by timestamp.
///
/// Equal timestamps keep source order, then row order within a source.
pub fn merge_by_time(per_source: Vec<Vec<PositionSample>>) -> Vec<PositionSample> {
    let mut merged: Vec<PositionSample> = per_source.into_iter().flatten().collect();
    merged.sort_by_key(|s| s.timestamp);
    merged
}

/// Runs track queries against a set of position sources.
pub struct TrackReconstructor<'a> {
    index: &'a SpatialIndex,
    config: &'a Config,
}

impl<'a> TrackReconstructor<'a> {
    pub fn new(index: &'a SpatialIndex, config: &'a Config) -> Self {
        Self { index, config }
    }

    /// Tracks of every row inside the covering of `bounds`.
    ///
    /// With [`ShardOrdering::PerShard`] each source is segmented on its own
    /// and tracks come out grouped by source in the order given. With
    /// [`ShardOrdering::MergedByTime`] all rows are merged first, so a
    /// voyage spanning two shards forms a single track.
    ///
    /// No sources or no matching rows give an empty list.
    pub fn reconstruct(
        &self,
        bounds: &GeoBounds,
        sources: &[&dyn PositionSource],
    ) -> Result<Vec<Track>> {
        if sources.is_empty() {
            return Ok(Vec::new());
        }

        let predicate = self.index.range_predicate(bounds)?;

        let mut per_source = Vec::with_capacity(sources.len());
        for source in sources {
            let rows = source.query_range(&predicate)?;
            log::debug!("Found {} positions in {}", rows.len(), source.name());
            per_source.push(rows);
        }

        let batches = match self.config.shard_ordering {
            ShardOrdering::PerShard => per_source,
            ShardOrdering::MergedByTime => vec![merge_by_time(per_source)],
        };

        let tolerance = tolerance_for(bounds);
        let sq_tolerance = tolerance * tolerance;
        let gap = self.config.gap_threshold_ms;

        let tracks: Vec<Track> = batches
            .iter()
            .flat_map(|rows| segment(rows, gap))
            .map(|track| simplify(&track, sq_tolerance, self.config.highest_quality))
            .collect();

        log::debug!(
            "Reconstructed {} track(s) from {} source(s), tolerance {}",
            tracks.len(),
            sources.len(),
            tolerance
        );
        Ok(tracks)
    }
}
