//! Polygon diagnostics: extent, approximate center, and probe checks.

use geo::BoundingRect;
use rollcall_geofence_models::{Coordinate, Polygon, PolygonBounds, PolygonSummary, ProbeResult};

use crate::ray_cast;

/// Summarizes `polygon` and tests each probe point against it.
#[must_use]
pub fn inspect_polygon(polygon: &Polygon, probes: &[Coordinate]) -> PolygonSummary {
    let vertices = polygon.vertices();

    PolygonSummary {
        vertex_count: vertices.len(),
        bounds: bounds(polygon),
        vertex_mean: vertex_mean(vertices),
        probes: probes
            .iter()
            .map(|&point| ProbeResult {
                point,
                inside: ray_cast::contains(polygon, point),
            })
            .collect(),
    }
}

/// Bounding box in the latitude-as-x convention.
fn bounds(polygon: &Polygon) -> PolygonBounds {
    let ring: geo::LineString<f64> = polygon
        .vertices()
        .iter()
        .map(|v| (v.latitude, v.longitude))
        .collect::<Vec<_>>()
        .into();

    let first = polygon.vertices()[0];
    ring.bounding_rect().map_or(
        PolygonBounds {
            min_latitude: first.latitude,
            max_latitude: first.latitude,
            min_longitude: first.longitude,
            max_longitude: first.longitude,
        },
        |rect| PolygonBounds {
            min_latitude: rect.min().x,
            max_latitude: rect.max().x,
            min_longitude: rect.min().y,
            max_longitude: rect.max().y,
        },
    )
}

#[allow(clippy::cast_precision_loss)]
fn vertex_mean(vertices: &[Coordinate]) -> Coordinate {
    let n = vertices.len() as f64;
    let (lat_sum, lng_sum) = vertices.iter().fold((0.0, 0.0), |(lat, lng), v| {
        (lat + v.latitude, lng + v.longitude)
    });
    Coordinate::new(lat_sum / n, lng_sum / n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::parse_polygon;

    #[test]
    fn summarizes_surveyed_classroom() {
        let polygon = parse_polygon(
            "[[18.76881754282782, 73.69819489513077], \
              [18.767759662681247, 73.70795536566978], \
              [18.758977005226484, 73.70464565967707], \
              [18.760294432999043, 73.69182845430406]]",
        )
        .unwrap();

        let summary = inspect_polygon(
            &polygon,
            &[Coordinate::new(18.7641, 73.7001), Coordinate::new(18.759, 73.704)],
        );

        assert_eq!(summary.vertex_count, 4);
        assert!((summary.bounds.min_latitude - 18.758_977_005_226_484).abs() < 1e-12);
        assert!((summary.bounds.max_latitude - 18.768_817_542_827_82).abs() < 1e-12);
        assert!((summary.bounds.min_longitude - 73.691_828_454_304_06).abs() < 1e-12);
        assert!((summary.bounds.max_longitude - 73.707_955_365_669_78).abs() < 1e-12);
        assert!((summary.vertex_mean.latitude - 18.763_962).abs() < 1e-5);
        assert!((summary.vertex_mean.longitude - 73.700_656).abs() < 1e-5);

        assert_eq!(summary.probes.len(), 2);
        assert!(summary.probes[0].inside);
        assert!(!summary.probes[1].inside);
    }

    #[test]
    fn no_probes_yields_empty_results() {
        let polygon = parse_polygon("[[0, 0], [0, 2], [2, 2], [2, 0]]").unwrap();
        let summary = inspect_polygon(&polygon, &[]);
        assert!(summary.probes.is_empty());
        assert_eq!(summary.vertex_mean, Coordinate::new(1.0, 1.0));
    }
}
