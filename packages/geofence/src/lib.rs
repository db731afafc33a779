#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geofence evaluation for batches of noisy location samples.
//!
//! A submission is a list of raw JSON samples (`latitude`, `longitude`,
//! `accuracy`, optional `timestamp`) checked against one [`Polygon`]. Each
//! sample is validated, filtered by its accuracy radius, and then tested
//! with ray casting. [`calculate_inside_count`] folds the per-sample
//! outcomes into a [`GeofenceTally`].
//!
//! Everything here is pure and synchronous. The only side effect is `log`
//! output, so evaluations for independent requests can run concurrently
//! without coordination.

pub mod decode;
pub mod inspect;
pub mod ray_cast;
pub mod sample;

pub use rollcall_geofence_models::{
    Coordinate, GeofenceTally, Polygon, PolygonShapeError, RejectedSample, RejectionReason,
    Sample, SampleOutcome,
};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Samples with an accuracy radius above this many meters are dropped.
pub const DEFAULT_ACCURACY_THRESHOLD_M: f64 = 2000.0;

/// Accuracy assumed for a sample that does not report one.
pub const DEFAULT_MISSING_ACCURACY_M: f64 = 999.0;

/// Errors that can occur while decoding a polygon.
#[derive(Debug, thiserror::Error)]
pub enum PolygonError {
    /// The encoded polygon is not valid JSON.
    #[error("Polygon is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The JSON is a `GeoJSON` object that could not be converted.
    #[error("Invalid GeoJSON polygon: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The JSON is neither a vertex list nor a `GeoJSON` polygon.
    #[error("Unsupported polygon encoding: {message}")]
    Unsupported {
        /// Description of what was found instead.
        message: String,
    },

    /// A vertex is not a `[latitude, longitude]` pair of numbers.
    #[error("Vertex {index} is not a [latitude, longitude] pair")]
    MalformedVertex {
        /// Zero-based vertex index.
        index: usize,
    },

    /// The vertices do not form a usable polygon.
    #[error("Invalid polygon: {0}")]
    Shape(#[from] PolygonShapeError),
}

/// Errors that abort a batch evaluation.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    /// A sample failed validation under [`MalformedSamplePolicy::Reject`].
    #[error("Sample at index {index} is malformed: {reason}")]
    MalformedSample {
        /// Zero-based index in the batch.
        index: usize,
        /// Why the sample was rejected.
        reason: RejectionReason,
    },
}

/// What to do with a sample that fails validation.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MalformedSamplePolicy {
    /// Record the rejection and keep evaluating the rest of the batch.
    #[default]
    Skip,
    /// Fail the whole batch on the first malformed sample.
    Reject,
}

/// Tunables for [`calculate_inside_count`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvaluationOptions {
    /// Maximum accepted accuracy radius in meters (inclusive).
    pub accuracy_threshold_m: f64,
    /// Accuracy assumed when a sample omits the field.
    pub missing_accuracy_m: f64,
    /// Skip-or-abort behavior for malformed samples.
    pub malformed_samples: MalformedSamplePolicy,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            accuracy_threshold_m: DEFAULT_ACCURACY_THRESHOLD_M,
            missing_accuracy_m: DEFAULT_MISSING_ACCURACY_M,
            malformed_samples: MalformedSamplePolicy::default(),
        }
    }
}

impl EvaluationOptions {
    /// Whether a sample's accuracy passes the filter.
    #[must_use]
    pub fn accepts_accuracy(&self, accuracy: f64) -> bool {
        accuracy <= self.accuracy_threshold_m
    }
}

/// Classifies one raw sample against `polygon`.
///
/// Never fails: malformed input becomes [`SampleOutcome::Rejected`].
#[must_use]
pub fn classify_sample(
    raw: &serde_json::Value,
    polygon: &Polygon,
    options: &EvaluationOptions,
) -> SampleOutcome {
    let sample = match sample::validate(raw, options.missing_accuracy_m) {
        Ok(sample) => sample,
        Err(reason) => return SampleOutcome::Rejected(reason),
    };

    if !options.accepts_accuracy(sample.accuracy) {
        return SampleOutcome::Filtered {
            accuracy: sample.accuracy,
        };
    }

    if ray_cast::contains(polygon, sample.position()) {
        SampleOutcome::Inside
    } else {
        SampleOutcome::Outside
    }
}

/// Counts how many samples in a batch fall inside `polygon`.
///
/// Samples are validated first, then dropped if their accuracy exceeds the
/// threshold (they count neither inside nor outside), and the rest are
/// ray-cast. Re-running on the same input always yields the same tally.
///
/// # Errors
///
/// Returns [`EvaluationError::MalformedSample`] for the first invalid
/// sample when `options.malformed_samples` is
/// [`MalformedSamplePolicy::Reject`]. Under
/// [`MalformedSamplePolicy::Skip`] this never fails.
pub fn calculate_inside_count(
    samples: &[serde_json::Value],
    polygon: &Polygon,
    options: &EvaluationOptions,
) -> Result<GeofenceTally, EvaluationError> {
    log::debug!(
        "Checking {} samples against a {}-vertex polygon",
        samples.len(),
        polygon.vertices().len()
    );

    let mut tally = GeofenceTally::default();

    for (index, raw) in samples.iter().enumerate() {
        let outcome = classify_sample(raw, polygon, options);

        match &outcome {
            SampleOutcome::Inside => log::debug!("Sample {}: inside", index + 1),
            SampleOutcome::Outside => log::debug!("Sample {}: outside", index + 1),
            SampleOutcome::Filtered { accuracy } => log::debug!(
                "Sample {}: filtered, accuracy {accuracy}m > {}m",
                index + 1,
                options.accuracy_threshold_m
            ),
            SampleOutcome::Rejected(reason) => {
                log::warn!("Sample {}: rejected, {reason}", index + 1);
                if options.malformed_samples == MalformedSamplePolicy::Reject {
                    return Err(EvaluationError::MalformedSample {
                        index,
                        reason: reason.clone(),
                    });
                }
            }
        }

        tally.record(index, outcome);
    }

    log::info!(
        "{}/{} valid samples inside polygon ({} filtered, {} rejected)",
        tally.inside_count,
        tally.valid_sample_count,
        tally.filtered_count,
        tally.rejected.len()
    );

    Ok(tally)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    /// The default classroom polygon used by the QR generator.
    const CAMPUS: &str = "[[18.77650087426464, 73.69443644062979], \
        [18.757928884141037, 73.66731143492491], \
        [18.74377631173372, 73.6876308776894], \
        [18.762875716118945, 73.7193882307322]]";

    fn campus() -> Polygon {
        decode::parse_polygon(CAMPUS).unwrap()
    }

    fn fix(latitude: f64, longitude: f64, accuracy: f64) -> serde_json::Value {
        json!({
            "latitude": latitude,
            "longitude": longitude,
            "accuracy": accuracy,
            "timestamp": "2024-01-01T10:00:00Z",
        })
    }

    #[test]
    fn twelve_accurate_samples_inside() {
        let samples = vec![fix(18.760, 73.692, 10.0); 12];
        let tally =
            calculate_inside_count(&samples, &campus(), &EvaluationOptions::default()).unwrap();
        assert_eq!(tally.counts(), (12, 12));
        assert_eq!(tally.total_samples, 12);
    }

    #[test]
    fn accuracy_at_or_below_threshold_is_valid() {
        let samples = vec![
            fix(18.760, 73.692, 150.0),
            fix(18.760, 73.692, DEFAULT_ACCURACY_THRESHOLD_M),
        ];
        let tally =
            calculate_inside_count(&samples, &campus(), &EvaluationOptions::default()).unwrap();
        assert_eq!(tally.counts(), (2, 2));
    }

    #[test]
    fn inaccurate_samples_are_neither_inside_nor_outside() {
        let samples = vec![
            fix(18.760, 73.692, 10.0),
            fix(18.800, 73.800, 10.0),
            fix(18.760, 73.692, 2000.5),
        ];
        let tally =
            calculate_inside_count(&samples, &campus(), &EvaluationOptions::default()).unwrap();
        assert_eq!(tally.counts(), (1, 2));
        assert_eq!(tally.filtered_count, 1);
        assert!(tally.rejected.is_empty());
    }

    #[test]
    fn missing_accuracy_uses_default() {
        let samples = vec![json!({ "latitude": 18.760, "longitude": 73.692 })];
        let tally =
            calculate_inside_count(&samples, &campus(), &EvaluationOptions::default()).unwrap();
        assert_eq!(tally.counts(), (1, 1));

        let strict = EvaluationOptions {
            accuracy_threshold_m: 100.0,
            ..EvaluationOptions::default()
        };
        let tally = calculate_inside_count(&samples, &campus(), &strict).unwrap();
        assert_eq!(tally.counts(), (0, 0));
        assert_eq!(tally.filtered_count, 1);
    }

    #[test]
    fn skip_policy_keeps_counting_after_malformed_sample() {
        let samples = vec![
            fix(18.760, 73.692, 10.0),
            json!({ "longitude": 73.692, "accuracy": 10.0 }),
            json!("not a sample"),
            fix(18.760, 73.692, 10.0),
        ];
        let tally =
            calculate_inside_count(&samples, &campus(), &EvaluationOptions::default()).unwrap();

        assert_eq!(tally.counts(), (2, 2));
        assert_eq!(tally.total_samples, 4);
        assert_eq!(
            tally.rejected,
            vec![
                RejectedSample {
                    index: 1,
                    reason: RejectionReason::MissingField {
                        field: rollcall_geofence_models::SampleField::Latitude,
                    },
                },
                RejectedSample {
                    index: 2,
                    reason: RejectionReason::NotAnObject,
                },
            ]
        );
    }

    #[test]
    fn reject_policy_fails_whole_batch() {
        let samples = vec![
            fix(18.760, 73.692, 10.0),
            json!({ "latitude": "18.76", "longitude": 73.692 }),
        ];
        let options = EvaluationOptions {
            malformed_samples: MalformedSamplePolicy::Reject,
            ..EvaluationOptions::default()
        };

        let err = calculate_inside_count(&samples, &campus(), &options).unwrap_err();
        let EvaluationError::MalformedSample { index, reason } = err;
        assert_eq!(index, 1);
        assert_eq!(
            reason,
            RejectionReason::WrongType {
                field: rollcall_geofence_models::SampleField::Latitude,
            }
        );
    }

    #[test]
    fn negative_accuracy_counts_as_valid() {
        let square = decode::parse_polygon("[[0,0],[0,1],[1,1],[1,0]]").unwrap();
        let samples = vec![fix(0.5, 0.5, -1.0)];

        let tally =
            calculate_inside_count(&samples, &square, &EvaluationOptions::default()).unwrap();
        assert_eq!(tally.counts(), (1, 1));
        assert!(tally.rejected.is_empty());
    }

    #[test]
    fn coordinates_beyond_geographic_range_are_still_ray_cast() {
        let polygon = decode::parse_polygon("[[89,0],[89,1],[95,1],[95,0]]").unwrap();
        let samples = vec![fix(91.0, 0.5, 10.0), fix(96.0, 0.5, 10.0)];

        let tally =
            calculate_inside_count(&samples, &polygon, &EvaluationOptions::default()).unwrap();
        assert_eq!(tally.counts(), (1, 2));
        assert!(tally.rejected.is_empty());
    }

    #[test]
    fn reject_policy_accepts_well_formed_negative_accuracy() {
        let mut samples = vec![fix(18.760, 73.692, 10.0); 11];
        samples.push(fix(18.760, 73.692, -0.5));
        let options = EvaluationOptions {
            malformed_samples: MalformedSamplePolicy::Reject,
            ..EvaluationOptions::default()
        };

        let tally = calculate_inside_count(&samples, &campus(), &options).unwrap();
        assert_eq!(tally.counts(), (12, 12));
    }

    #[test]
    fn evaluation_is_idempotent() {
        let samples = vec![
            fix(18.760, 73.692, 10.0),
            fix(18.800, 73.800, 10.0),
            fix(18.7603, 73.6922, 1500.0),
            json!({}),
        ];
        let polygon = campus();
        let options = EvaluationOptions::default();

        let first = calculate_inside_count(&samples, &polygon, &options).unwrap();
        for _ in 0..5 {
            assert_eq!(
                calculate_inside_count(&samples, &polygon, &options).unwrap(),
                first
            );
        }
    }

    #[test]
    fn empty_batch() {
        let tally = calculate_inside_count(&[], &campus(), &EvaluationOptions::default()).unwrap();
        assert_eq!(tally, GeofenceTally::default());
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: EvaluationOptions =
            serde_json::from_value(json!({ "malformed_samples": "reject" })).unwrap();
        assert_eq!(options.malformed_samples, MalformedSamplePolicy::Reject);
        assert!((options.accuracy_threshold_m - DEFAULT_ACCURACY_THRESHOLD_M).abs() < f64::EPSILON);
    }
}
