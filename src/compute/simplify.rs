//! Track polyline simplification.
//!
//! Two passes over planar lat/lon coordinates:
//! 1. a radial-distance prefilter dropping points closer than the tolerance to
//!    the previously kept point (skipped in highest-quality mode);
//! 2. Douglas-Peucker over what is left.
//!
//! Distances are squared Euclidean distances in degrees, which is only
//! meaningful for small regions. That is all a track view needs.
//!
//! Douglas-Peucker runs on an explicit stack. `geo`'s `Simplify` recurses
//! once per split, and a track whose splits are lopsided recurses once per
//! point. Point-to-segment distances still come from `geo`.

use geo::{Coord, Distance, Euclidean, Line};
use tracklog_types::point::{LatLng, TrackPoint};

/// Squared planar distance between two positions, in degrees².
pub fn sq_dist(a: &LatLng, b: &LatLng) -> f64 {
    let dx = a.lat - b.lat;
    let dy = a.lon - b.lon;
    dx * dx + dy * dy
}

fn sq_point_dist(a: &TrackPoint, b: &TrackPoint) -> f64 {
    let dx = a.lat - b.lat;
    let dy = a.lon - b.lon;
    dx * dx + dy * dy
}

fn coord(p: &TrackPoint) -> Coord<f64> {
    Coord { x: p.lon, y: p.lat }
}

/// Squared distance from `p` to the segment `a`-`b`.
fn sq_seg_dist(p: &TrackPoint, a: &TrackPoint, b: &TrackPoint) -> f64 {
    let d = Euclidean.distance(coord(p), &Line::new(coord(a), coord(b)));
    d * d
}

fn simplify_radial(points: &[TrackPoint], sq_tolerance: f64) -> Vec<TrackPoint> {
    let mut kept = Vec::with_capacity(points.len());
    let mut prev = points[0];
    let mut prev_idx = 0;
    kept.push(prev);

    for (i, point) in points.iter().enumerate().skip(1) {
        if sq_point_dist(point, &prev) > sq_tolerance {
            kept.push(*point);
            prev = *point;
            prev_idx = i;
        }
    }

    let last = points.len() - 1;
    if prev_idx != last {
        kept.push(points[last]);
    }

    kept
}

fn simplify_douglas_peucker(points: &[TrackPoint], sq_tolerance: f64) -> Vec<TrackPoint> {
    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    let mut stack = vec![(0usize, last)];
    while let Some((first, last)) = stack.pop() {
        let mut max_sq_dist = sq_tolerance;
        let mut index = None;

        for i in first + 1..last {
            let d = sq_seg_dist(&points[i], &points[first], &points[last]);
            if d > max_sq_dist {
                index = Some(i);
                max_sq_dist = d;
            }
        }

        if let Some(index) = index {
            keep[index] = true;
            if index - first > 1 {
                stack.push((first, index));
            }
            if last - index > 1 {
                stack.push((index, last));
            }
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

/// Reduce `points` to a shape-preserving subset.
///
/// `sq_tolerance` is compared against squared distances. The first and last
/// input points are always part of the result; inputs of two points or less
/// come back unchanged.
///
/// # Examples
///
/// ```
/// use tracklog::compute::simplify::simplify;
/// use tracklog::types::TrackPoint;
///
/// let line: Vec<TrackPoint> = (0..10)
///     .map(|i| TrackPoint::new(i as f64, 2.0 * i as f64, i * 1000))
///     .collect();
/// let simplified = simplify(&line, 0.01, false);
/// assert_eq!(simplified, vec![line[0], line[9]]);
/// ```
pub fn simplify(
    points: &[TrackPoint],
    sq_tolerance: f64,
    highest_quality: bool,
) -> Vec<TrackPoint> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    if highest_quality {
        simplify_douglas_peucker(points, sq_tolerance)
    } else {
        let prefiltered = simplify_radial(points, sq_tolerance);
        if prefiltered.len() <= 2 {
            return prefiltered;
        }
        simplify_douglas_peucker(&prefiltered, sq_tolerance)
    }
}
