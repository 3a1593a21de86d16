//! Query rectangle derivation.
//!
//! A track query is either bounded by an explicit rectangle or by a circle
//! around the vessel's own position. Circles are turned into their enclosing
//! lat/lon rectangle on a spherical earth.

use crate::compute::validation::validate_bounds;
use crate::error::{Result, TrackError};
use std::f64::consts::{FRAC_PI_2, PI};
use tracklog_types::bounds::GeoBounds;
use tracklog_types::point::LatLng;

/// Mean earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// The two ways a query area can be given.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QueryBounds {
    Explicit(GeoBounds),
    Around { center: LatLng, radius_m: f64 },
}

/// Resolve query bounds into a concrete rectangle.
///
/// Explicit rectangles pass through unchanged.
///
/// # Errors
///
/// `InvalidRadius` if a circle radius is not a positive finite number.
pub fn resolve(bounds: QueryBounds) -> Result<GeoBounds> {
    match bounds {
        QueryBounds::Explicit(bbox) => Ok(bbox),
        QueryBounds::Around { center, radius_m } => bounds_around(&center, radius_m),
    }
}

/// Enclosing rectangle of the circle of `radius_m` meters around `center`.
///
/// A circle reaching past a pole yields the whole world. Longitudes pushed
/// beyond ±180° wrap around, producing a rectangle that crosses the
/// antimeridian.
///
/// # Examples
///
/// ```
/// use tracklog::compute::bbox::bounds_around;
/// use tracklog::types::{GeoBounds, LatLng};
///
/// let bbox = bounds_around(&LatLng::new(0.0, 0.0), 1000.0).unwrap();
/// assert_eq!(bbox.sw.lat, -bbox.ne.lat);
///
/// let polar = bounds_around(&LatLng::new(89.99, 0.0), 5000.0).unwrap();
/// assert_eq!(polar, GeoBounds::world());
/// ```
pub fn bounds_around(center: &LatLng, radius_m: f64) -> Result<GeoBounds> {
    if !radius_m.is_finite() || radius_m <= 0.0 {
        return Err(TrackError::InvalidRadius(radius_m));
    }

    let lat = center.lat.to_radians();
    let lon = center.lon.to_radians();
    let angular = radius_m / EARTH_RADIUS_M;

    let min_lat = lat - angular;
    let max_lat = lat + angular;
    if min_lat < -FRAC_PI_2 || max_lat > FRAC_PI_2 {
        return Ok(GeoBounds::world());
    }

    let delta_lon = (angular.sin() / lat.cos()).asin();
    if !delta_lon.is_finite() {
        return Ok(GeoBounds::world());
    }

    let mut min_lon = lon - delta_lon;
    let mut max_lon = lon + delta_lon;
    if min_lon < -PI {
        min_lon += 2.0 * PI;
    }
    if max_lon > PI {
        max_lon -= 2.0 * PI;
    }

    Ok(GeoBounds::new(
        LatLng::new(min_lat.to_degrees(), min_lon.to_degrees()),
        LatLng::new(max_lat.to_degrees(), max_lon.to_degrees()),
    ))
}

/// Parse the `south,west,north,east` text form of a bounding box.
pub fn parse_bbox(s: &str) -> Result<GeoBounds> {
    let parts = s
        .split(',')
        .map(|p| {
            p.trim()
                .parse::<f64>()
                .map_err(|e| TrackError::InvalidInput(format!("bbox value '{}': {}", p, e)))
        })
        .collect::<Result<Vec<f64>>>()?;

    let [south, west, north, east] = parts[..] else {
        return Err(TrackError::InvalidInput(format!(
            "bbox needs 4 comma separated values, got {}",
            parts.len()
        )));
    };

    let bounds = GeoBounds::new(LatLng::new(south, west), LatLng::new(north, east));
    validate_bounds(&bounds)?;
    Ok(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_passes_through() {
        let bbox = GeoBounds::new(LatLng::new(59.9, 21.2), LatLng::new(60.3, 23.0));
        assert_eq!(resolve(QueryBounds::Explicit(bbox)).unwrap(), bbox);
    }

    #[test]
    fn test_symmetric_around_origin() {
        let bbox = resolve(QueryBounds::Around {
            center: LatLng::new(0.0, 0.0),
            radius_m: 250_000.0,
        })
        .unwrap();

        assert_eq!(bbox.sw.lat, -bbox.ne.lat);
        assert_eq!(bbox.sw.lon, -bbox.ne.lon);
        assert!(bbox.ne.lat > 2.0 && bbox.ne.lat < 2.5);
        // On the equator the longitude half-width equals the latitude one
        assert!((bbox.ne.lon - bbox.ne.lat).abs() < 1e-9);
    }

    #[test]
    fn test_longitude_widens_with_latitude() {
        let bbox = bounds_around(&LatLng::new(60.0, 22.0), 10_000.0).unwrap();
        let half_lat = (bbox.ne.lat - bbox.sw.lat) / 2.0;
        let half_lon = (bbox.ne.lon - bbox.sw.lon) / 2.0;
        // cos(60°) = 0.5, so roughly twice as wide
        assert!((half_lon / half_lat - 2.0).abs() < 0.01);
    }

    #[test]
    fn test_pole_crossing_is_world() {
        let bbox = bounds_around(&LatLng::new(0.0, 0.0), 10_100_000.0).unwrap();
        assert_eq!(bbox, GeoBounds::world());

        let bbox = bounds_around(&LatLng::new(-89.5, 30.0), 100_000.0).unwrap();
        assert_eq!(bbox, GeoBounds::world());
    }

    #[test]
    fn test_wraps_antimeridian() {
        let bbox = bounds_around(&LatLng::new(0.0, 179.9), 50_000.0).unwrap();
        assert!(bbox.crosses_antimeridian());
        assert!(bbox.sw.lon > 179.0 && bbox.sw.lon < 180.0);
        assert!(bbox.ne.lon < -179.0);

        let bbox = bounds_around(&LatLng::new(0.0, -179.9), 50_000.0).unwrap();
        assert!(bbox.crosses_antimeridian());
        assert!(bbox.sw.lon > 179.0);
    }

    #[test]
    fn test_invalid_radius() {
        let center = LatLng::new(60.0, 22.0);
        for radius in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                bounds_around(&center, radius),
                Err(TrackError::InvalidRadius(_))
            ));
        }
    }

    #[test]
    fn test_parse_bbox() {
        let bbox =
            parse_bbox("59.97455314403678,21.219717207950076,60.31636155920052,23.051687422793826")
                .unwrap();
        assert_eq!(bbox.sw, LatLng::new(59.97455314403678, 21.219717207950076));
        assert_eq!(bbox.ne, LatLng::new(60.31636155920052, 23.051687422793826));

        assert!(parse_bbox("1,2,3").is_err());
        assert!(parse_bbox("1,2,3,x").is_err());
        assert!(parse_bbox("3,2,1,4").is_err());
    }
}
