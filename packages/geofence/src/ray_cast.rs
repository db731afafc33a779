//! Ray-casting point-in-polygon test.
//!
//! Latitude is the "x" axis and longitude the "y" axis. A horizontal ray is
//! cast from the query point and every edge it crosses flips the parity.
//!
//! An edge counts when the query's y lies in the half-open span
//! `(min(p1.y, p2.y), max(p1.y, p2.y)]` and the query's x is at or left of
//! the edge's x-intercept at that y. The half-open span keeps a vertex
//! shared by two edges from being counted twice, and it also means a
//! horizontal edge never counts. Points exactly on the boundary may land on
//! either side depending on the edge direction.

use rollcall_geofence_models::{Coordinate, Polygon};

use crate::PolygonError;
use crate::decode::parse_polygon;

/// Returns whether `point` lies inside `polygon`.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn contains(polygon: &Polygon, point: Coordinate) -> bool {
    let (x, y) = (point.latitude, point.longitude);
    let mut inside = false;

    for (p1, p2) in polygon.edges() {
        let (p1x, p1y) = (p1.latitude, p1.longitude);
        let (p2x, p2y) = (p2.latitude, p2.longitude);

        if y > p1y.min(p2y) && y <= p1y.max(p2y) && x <= p1x.max(p2x) {
            // p1y != p2y here: the span test above excludes horizontal edges.
            if p1x == p2x || x <= (y - p1y) * (p2x - p1x) / (p2y - p1y) + p1x {
                inside = !inside;
            }
        }
    }

    inside
}

/// Decodes `encoded` and tests `point` against it.
///
/// # Errors
///
/// Returns [`PolygonError`] if the polygon cannot be decoded, so that a
/// malformed geofence is never mistaken for "outside".
pub fn contains_encoded(encoded: &str, point: Coordinate) -> Result<bool, PolygonError> {
    let polygon = parse_polygon(encoded)?;
    Ok(contains(&polygon, point))
}

/// Fail-closed variant of [`contains_encoded`]: a polygon that cannot be
/// decoded reports every point as outside.
///
/// Callers that need to tell a malformed polygon apart from a point that is
/// really outside must use [`contains_encoded`] instead.
#[must_use]
pub fn contains_encoded_or_outside(encoded: &str, point: Coordinate) -> bool {
    contains_encoded(encoded, point).unwrap_or_else(|e| {
        log::warn!("Geofence error, treating point as outside: {e}");
        false
    })
}
