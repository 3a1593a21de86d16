//! Validation for geographic coordinates.

use crate::error::{Result, TrackError};
use geo::Point;
use tracklog_types::bounds::GeoBounds;
use tracklog_types::point::LatLng;

/// Validates a 2D point has valid longitude and latitude.
///
/// Longitude: [-180.0, 180.0], Latitude: [-90.0, 90.0]
///
/// # Examples
///
/// ```
/// use tracklog::compute::validation::validate_geographic_point;
/// use geo::Point;
///
/// let turku = Point::new(22.2666, 60.4518);
/// assert!(validate_geographic_point(&turku).is_ok());
///
/// let invalid = Point::new(200.0, 40.0);
/// assert!(validate_geographic_point(&invalid).is_err());
/// ```
pub fn validate_geographic_point(point: &Point) -> Result<()> {
    let (x, y) = (point.x(), point.y());

    if !x.is_finite() {
        return Err(TrackError::InvalidInput(format!(
            "Longitude must be finite, got: {}",
            x
        )));
    }

    if !y.is_finite() {
        return Err(TrackError::InvalidInput(format!(
            "Latitude must be finite, got: {}",
            y
        )));
    }

    if !(-180.0..=180.0).contains(&x) {
        return Err(TrackError::InvalidInput(format!(
            "Longitude out of range [-180.0, 180.0]: {}",
            x
        )));
    }

    if !(-90.0..=90.0).contains(&y) {
        return Err(TrackError::InvalidInput(format!(
            "Latitude out of range [-90.0, 90.0]: {}",
            y
        )));
    }

    Ok(())
}

/// Validates a `[lat, lon]` position.
pub fn validate_position(pos: &LatLng) -> Result<()> {
    validate_geographic_point(&pos.to_point())
}

/// Validates both corners of a bounding box and their latitude order.
///
/// Longitudes may be in either order (antimeridian crossing).
pub fn validate_bounds(bounds: &GeoBounds) -> Result<()> {
    validate_position(&bounds.sw)
        .map_err(|e| TrackError::InvalidInput(format!("South-west corner: {}", e)))?;
    validate_position(&bounds.ne)
        .map_err(|e| TrackError::InvalidInput(format!("North-east corner: {}", e)))?;

    if bounds.sw.lat > bounds.ne.lat {
        return Err(TrackError::InvalidInput(format!(
            "South latitude ({}) must be <= north latitude ({})",
            bounds.sw.lat, bounds.ne.lat
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_geographic_point() {
        let turku = Point::new(22.2666, 60.4518);
        assert!(validate_geographic_point(&turku).is_ok());

        // Edge cases
        assert!(validate_geographic_point(&Point::new(180.0, 0.0)).is_ok());
        assert!(validate_geographic_point(&Point::new(-180.0, 0.0)).is_ok());
        assert!(validate_geographic_point(&Point::new(0.0, 90.0)).is_ok());
        assert!(validate_geographic_point(&Point::new(0.0, -90.0)).is_ok());
    }

    #[test]
    fn test_invalid_coordinates() {
        assert!(validate_geographic_point(&Point::new(180.1, 40.0)).is_err());
        assert!(validate_geographic_point(&Point::new(-74.0, -90.1)).is_err());
        assert!(validate_geographic_point(&Point::new(f64::NAN, 40.0)).is_err());
        assert!(validate_geographic_point(&Point::new(-74.0, f64::INFINITY)).is_err());
    }

    #[test]
    fn test_position_axis_order() {
        // lat 80 / lon 170 is valid, swapped it is not
        assert!(validate_position(&LatLng::new(80.0, 170.0)).is_ok());
        assert!(validate_position(&LatLng::new(170.0, 80.0)).is_err());
    }

    #[test]
    fn test_validate_bounds() {
        let ok = GeoBounds::new(LatLng::new(59.0, 21.0), LatLng::new(60.0, 23.0));
        assert!(validate_bounds(&ok).is_ok());

        let wrapping = GeoBounds::new(LatLng::new(-1.0, 179.0), LatLng::new(1.0, -179.0));
        assert!(validate_bounds(&wrapping).is_ok());

        let flipped = GeoBounds::new(LatLng::new(60.0, 21.0), LatLng::new(59.0, 23.0));
        assert!(validate_bounds(&flipped).is_err());

        let out_of_range = GeoBounds::new(LatLng::new(59.0, 21.0), LatLng::new(91.0, 23.0));
        assert!(validate_bounds(&out_of_range).is_err());
    }
}
