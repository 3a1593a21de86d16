use crate::bounds::GeoBounds;
use crate::point::TrackPoint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A time-ordered run of positions with no gap above the segmentation
/// threshold.
pub type Track = Vec<TrackPoint>;

/// Tracks grouped by vessel context (e.g. `vessels.urn:mrn:imo:mmsi:230000000`).
///
/// Serializes as a plain JSON object `{ context: [track, ...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackCollection {
    tracks: BTreeMap<String, Vec<Track>>,
}

impl TrackCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the tracks stored for `context`.
    pub fn insert(&mut self, context: impl Into<String>, tracks: Vec<Track>) {
        self.tracks.insert(context.into(), tracks);
    }

    pub fn get(&self, context: &str) -> Option<&[Track]> {
        self.tracks.get(context).map(Vec::as_slice)
    }

    pub fn contexts(&self) -> impl Iterator<Item = &str> + '_ {
        self.tracks.keys().map(String::as_str)
    }

    /// True when no context holds a single point.
    pub fn is_empty(&self) -> bool {
        self.tracks.values().all(|t| t.iter().all(Vec::is_empty))
    }

    /// Number of tracks across all contexts.
    pub fn track_count(&self) -> usize {
        self.tracks.values().map(Vec::len).sum()
    }

    /// Number of points across all tracks.
    pub fn point_count(&self) -> usize {
        self.tracks
            .values()
            .flat_map(|tracks| tracks.iter())
            .map(Vec::len)
            .sum()
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<Track>> {
        self.tracks
    }
}

/// Parameters of a track query.
///
/// Either `bbox` is given, or the query is centered on the caller's own
/// position with `radius` meters (a default radius applies when `None`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackQuery {
    #[serde(default)]
    pub bbox: Option<GeoBounds>,
    #[serde(default)]
    pub radius: Option<f64>,
}

impl TrackQuery {
    pub fn with_bbox(bbox: GeoBounds) -> Self {
        Self {
            bbox: Some(bbox),
            radius: None,
        }
    }

    pub fn with_radius(radius: f64) -> Self {
        Self {
            bbox: None,
            radius: Some(radius),
        }
    }
}
