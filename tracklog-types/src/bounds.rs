use crate::point::LatLng;
use geo::{Rect, coord};
use serde::{Deserialize, Serialize};

/// An axis-aligned lat/lon rectangle given by its south-west and north-east
/// corners.
///
/// When `sw.lon > ne.lon` the rectangle crosses the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub sw: LatLng,
    pub ne: LatLng,
}

impl GeoBounds {
    pub const fn new(sw: LatLng, ne: LatLng) -> Self {
        Self { sw, ne }
    }

    /// The whole globe, `(-90,-180)-(90,180)`.
    pub const fn world() -> Self {
        Self {
            sw: LatLng::new(-90.0, -180.0),
            ne: LatLng::new(90.0, 180.0),
        }
    }

    pub fn south(&self) -> f64 {
        self.sw.lat
    }

    pub fn west(&self) -> f64 {
        self.sw.lon
    }

    pub fn north(&self) -> f64 {
        self.ne.lat
    }

    pub fn east(&self) -> f64 {
        self.ne.lon
    }

    /// True when the longitude span wraps across ±180°.
    pub fn crosses_antimeridian(&self) -> bool {
        self.sw.lon > self.ne.lon
    }

    /// True when both corners are the same position.
    pub fn is_degenerate(&self) -> bool {
        self.sw == self.ne
    }

    /// Check whether a position lies inside the rectangle (edges inclusive).
    pub fn contains(&self, pos: &LatLng) -> bool {
        if pos.lat < self.sw.lat || pos.lat > self.ne.lat {
            return false;
        }
        if self.crosses_antimeridian() {
            pos.lon >= self.sw.lon || pos.lon <= self.ne.lon
        } else {
            pos.lon >= self.sw.lon && pos.lon <= self.ne.lon
        }
    }

    /// Convert to a `geo::Rect` (x = longitude). A rectangle crossing the
    /// antimeridian has no single `Rect` and yields `None`.
    pub fn to_rect(&self) -> Option<Rect<f64>> {
        if self.crosses_antimeridian() {
            return None;
        }
        Some(Rect::new(
            coord! { x: self.sw.lon, y: self.sw.lat },
            coord! { x: self.ne.lon, y: self.ne.lat },
        ))
    }
}

impl From<Rect<f64>> for GeoBounds {
    fn from(rect: Rect<f64>) -> Self {
        Self {
            sw: LatLng::new(rect.min().y, rect.min().x),
            ne: LatLng::new(rect.max().y, rect.max().x),
        }
    }
}
