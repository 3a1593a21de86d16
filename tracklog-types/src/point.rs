use geo::Point;
use serde::{Deserialize, Serialize};

/// A geographic position in degrees.
///
/// Serialized as a `[lat, lon]` pair, which is the order used throughout the
/// track API (note that `geo::Point` is the other way around, x = lon).
///
/// # Examples
///
/// ```
/// use tracklog_types::point::LatLng;
///
/// let pos = LatLng::new(60.2578, 21.9531);
/// assert_eq!(serde_json::to_string(&pos).unwrap(), "[60.2578,21.9531]");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LatLng {
    pub lat: f64,
    pub lon: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Convert to a `geo::Point` (x = longitude, y = latitude).
    pub fn to_point(&self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

impl From<[f64; 2]> for LatLng {
    fn from([lat, lon]: [f64; 2]) -> Self {
        Self { lat, lon }
    }
}

impl From<LatLng> for [f64; 2] {
    fn from(pos: LatLng) -> Self {
        [pos.lat, pos.lon]
    }
}

impl From<Point<f64>> for LatLng {
    fn from(point: Point<f64>) -> Self {
        Self::new(point.y(), point.x())
    }
}

/// One stored position row.
///
/// `cell_id` is the leaf-level S2 cell containing the position, kept as a full
/// unsigned 64-bit value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub lat: f64,
    pub lon: f64,
    pub cell_id: u64,
}

impl PositionSample {
    pub fn new(timestamp: i64, position: LatLng, cell_id: u64) -> Self {
        Self {
            timestamp,
            lat: position.lat,
            lon: position.lon,
            cell_id,
        }
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lon)
    }

    pub fn to_track_point(&self) -> TrackPoint {
        TrackPoint::new(self.lat, self.lon, self.timestamp)
    }
}

/// A point of a reconstructed track.
///
/// Serialized as `[lat, lon, null, timestamp]`; the third slot is reserved for
/// altitude and always null.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "(f64, f64, Option<f64>, i64)",
    into = "(f64, f64, Option<f64>, i64)"
)]
pub struct TrackPoint {
    pub lat: f64,
    pub lon: f64,
    pub timestamp: i64,
}

impl TrackPoint {
    pub const fn new(lat: f64, lon: f64, timestamp: i64) -> Self {
        Self {
            lat,
            lon,
            timestamp,
        }
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lon)
    }
}

impl From<(f64, f64, Option<f64>, i64)> for TrackPoint {
    fn from((lat, lon, _, timestamp): (f64, f64, Option<f64>, i64)) -> Self {
        Self::new(lat, lon, timestamp)
    }
}

impl From<TrackPoint> for (f64, f64, Option<f64>, i64) {
    fn from(p: TrackPoint) -> Self {
        (p.lat, p.lon, None, p.timestamp)
    }
}
