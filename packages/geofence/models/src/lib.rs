#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geofence types shared by the evaluator, the attendance layer, and the
//! HTTP API.
//!
//! # Axis convention
//!
//! A [`Polygon`] stores its vertices as `(latitude, longitude)` pairs, and
//! the ray-casting test treats **latitude as the x axis and longitude as
//! the y axis**. The choice is arbitrary but must be the same for polygon
//! storage and for the query point, otherwise inside/outside results
//! silently invert. Anything that ingests `[lng, lat]` data (e.g. `GeoJSON`)
//! must swap into this convention before building a [`Polygon`].

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Minimum number of vertices for a closed polygon.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// A single `(latitude, longitude)` pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    /// Latitude in degrees (the ray-casting "x").
    pub latitude: f64,
    /// Longitude in degrees (the ray-casting "y").
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([latitude, longitude]: [f64; 2]) -> Self {
        Self::new(latitude, longitude)
    }
}

/// A geofence polygon: an ordered, implicitly closed ring of vertices.
///
/// The last vertex connects back to the first. Self-intersection is not
/// checked. Construction guarantees at least [`MIN_POLYGON_VERTICES`]
/// vertices, all with finite coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polygon {
    vertices: Vec<Coordinate>,
}

impl Polygon {
    /// Builds a polygon from its vertices.
    ///
    /// # Errors
    ///
    /// Returns [`PolygonShapeError`] if fewer than three vertices are given
    /// or any coordinate is NaN or infinite.
    pub fn new(vertices: Vec<Coordinate>) -> Result<Self, PolygonShapeError> {
        if vertices.len() < MIN_POLYGON_VERTICES {
            return Err(PolygonShapeError::TooFewVertices {
                count: vertices.len(),
            });
        }

        if let Some(index) = vertices
            .iter()
            .position(|v| !v.latitude.is_finite() || !v.longitude.is_finite())
        {
            return Err(PolygonShapeError::NonFiniteCoordinate { index });
        }

        Ok(Self { vertices })
    }

    /// The polygon's vertices in ring order.
    #[must_use]
    pub fn vertices(&self) -> &[Coordinate] {
        &self.vertices
    }

    /// Iterates over every edge `(p1, p2)`, including the closing edge from
    /// the last vertex back to the first.
    pub fn edges(&self) -> impl Iterator<Item = (Coordinate, Coordinate)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }
}

/// Error returned when a vertex list cannot form a [`Polygon`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonShapeError {
    /// Fewer than [`MIN_POLYGON_VERTICES`] vertices.
    TooFewVertices {
        /// Number of vertices that were provided.
        count: usize,
    },
    /// A vertex has a NaN or infinite coordinate.
    NonFiniteCoordinate {
        /// Zero-based vertex index.
        index: usize,
    },
}

impl std::fmt::Display for PolygonShapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewVertices { count } => write!(
                f,
                "polygon has {count} vertices: expected at least {MIN_POLYGON_VERTICES}"
            ),
            Self::NonFiniteCoordinate { index } => {
                write!(f, "vertex {index} has a non-finite coordinate")
            }
        }
    }
}

impl std::error::Error for PolygonShapeError {}

/// A validated location fix submitted by a student device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Reported horizontal accuracy radius in meters (lower is better).
    pub accuracy: f64,
    /// Client-supplied timestamp. Carried through, never interpreted.
    pub timestamp: Option<String>,
}

impl Sample {
    #[must_use]
    pub const fn position(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// The sample fields checked during validation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SampleField {
    Latitude,
    Longitude,
    Accuracy,
}

/// Why a raw sample was not usable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectionReason {
    /// The sample was not a JSON object.
    NotAnObject,
    /// A required field was absent or `null`.
    MissingField {
        /// The absent field.
        field: SampleField,
    },
    /// A field had the wrong JSON type.
    WrongType {
        /// The offending field.
        field: SampleField,
    },
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject => f.write_str("sample is not an object"),
            Self::MissingField { field } => write!(f, "missing field `{field}`"),
            Self::WrongType { field } => write!(f, "field `{field}` has the wrong type"),
        }
    }
}

/// A sample that failed validation, with its position in the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedSample {
    /// Zero-based index in the submitted batch.
    pub index: usize,
    /// Why it was rejected.
    pub reason: RejectionReason,
}

/// Per-sample result of a geofence check.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleOutcome {
    /// Passed the accuracy filter and lies inside the polygon.
    Inside,
    /// Passed the accuracy filter and lies outside the polygon.
    Outside,
    /// Well-formed but the accuracy radius exceeds the threshold.
    Filtered {
        /// Reported accuracy in meters.
        accuracy: f64,
    },
    /// Failed validation.
    Rejected(RejectionReason),
}

/// Aggregated counts for a batch of samples checked against one polygon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceTally {
    /// Valid samples that fall inside the polygon.
    pub inside_count: usize,
    /// Samples that passed validation and the accuracy filter.
    pub valid_sample_count: usize,
    /// Well-formed samples dropped by the accuracy filter.
    pub filtered_count: usize,
    /// Every sample submitted, including filtered and rejected ones.
    pub total_samples: usize,
    /// Samples that failed validation.
    pub rejected: Vec<RejectedSample>,
}

impl GeofenceTally {
    /// Folds one sample outcome into the tally.
    pub fn record(&mut self, index: usize, outcome: SampleOutcome) {
        self.total_samples += 1;
        match outcome {
            SampleOutcome::Inside => {
                self.valid_sample_count += 1;
                self.inside_count += 1;
            }
            SampleOutcome::Outside => self.valid_sample_count += 1,
            SampleOutcome::Filtered { .. } => self.filtered_count += 1,
            SampleOutcome::Rejected(reason) => {
                self.rejected.push(RejectedSample { index, reason });
            }
        }
    }

    /// The `(inside_count, valid_sample_count)` pair.
    #[must_use]
    pub const fn counts(&self) -> (usize, usize) {
        (self.inside_count, self.valid_sample_count)
    }
}

/// Latitude/longitude extent of a polygon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolygonBounds {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

/// Whether a probe point falls inside the inspected polygon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    pub point: Coordinate,
    pub inside: bool,
}

/// Diagnostic description of a geofence polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolygonSummary {
    /// Number of vertices in the ring (closing vertex not repeated).
    pub vertex_count: usize,
    pub bounds: PolygonBounds,
    /// Mean of the vertices. Only an approximate center; not the area
    /// centroid.
    pub vertex_mean: Coordinate,
    /// Per-probe inside/outside results, in request order.
    pub probes: Vec<ProbeResult>,
}
