//! Polygon decoding.
//!
//! Two encodings are accepted:
//!
//! * a JSON array of `[latitude, longitude]` pairs, the form sessions
//!   store their geofence in;
//! * a `GeoJSON` `Polygon` geometry (or a `Feature` wrapping one). Only the
//!   exterior ring is used. `GeoJSON` positions are `[longitude, latitude]`,
//!   so they are swapped into the crate's latitude-as-x convention.

use geojson::GeoJson;
use rollcall_geofence_models::{Coordinate, Polygon};
use serde_json::Value;

use crate::PolygonError;

/// Parses an encoded polygon string.
///
/// # Errors
///
/// Returns [`PolygonError`] if the string is not JSON, is not a supported
/// polygon encoding, or describes fewer than three usable vertices.
pub fn parse_polygon(encoded: &str) -> Result<Polygon, PolygonError> {
    let value: Value = serde_json::from_str(encoded)?;
    polygon_from_value(&value)
}

/// Builds a polygon from an already-parsed JSON value.
///
/// # Errors
///
/// Same as [`parse_polygon`], minus JSON syntax errors.
pub fn polygon_from_value(value: &Value) -> Result<Polygon, PolygonError> {
    match value {
        Value::Array(pairs) => from_pairs(pairs),
        Value::Object(_) => from_geojson(value),
        other => Err(PolygonError::Unsupported {
            message: format!("expected an array or GeoJSON object, found {}", kind(other)),
        }),
    }
}

fn from_pairs(pairs: &[Value]) -> Result<Polygon, PolygonError> {
    let vertices = pairs
        .iter()
        .enumerate()
        .map(|(index, pair)| {
            pair_to_coordinate(pair).ok_or(PolygonError::MalformedVertex { index })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Polygon::new(vertices)?)
}

fn pair_to_coordinate(pair: &Value) -> Option<Coordinate> {
    match pair.as_array()?.as_slice() {
        [lat, lng] => Some(Coordinate::new(lat.as_f64()?, lng.as_f64()?)),
        _ => None,
    }
}

fn from_geojson(value: &Value) -> Result<Polygon, PolygonError> {
    let geometry = match GeoJson::from_json_value(value.clone())? {
        GeoJson::Geometry(geometry) => geometry,
        GeoJson::Feature(feature) => {
            feature.geometry.ok_or_else(|| PolygonError::Unsupported {
                message: "GeoJSON feature has no geometry".to_string(),
            })?
        }
        GeoJson::FeatureCollection(_) => {
            return Err(PolygonError::Unsupported {
                message: "GeoJSON feature collections are not supported".to_string(),
            });
        }
    };

    let geo_geom: geo::Geometry<f64> = geometry.try_into()?;
    let geo::Geometry::Polygon(polygon) = geo_geom else {
        return Err(PolygonError::Unsupported {
            message: "GeoJSON geometry is not a Polygon".to_string(),
        });
    };

    // geo closes rings, so the last coordinate repeats the first.
    let mut ring: Vec<Coordinate> = polygon
        .exterior()
        .coords()
        .map(|c| Coordinate::new(c.y, c.x))
        .collect();
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }

    Ok(Polygon::new(ring)?)
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
