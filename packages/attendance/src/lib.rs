#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Attendance scoring on top of the geofence evaluator.
//!
//! A submission is a session polygon plus the student's location samples.
//! [`evaluate_submission`] counts the samples inside the polygon under the
//! active [`AttendancePolicy`] and maps the inside count to an
//! [`AttendanceStatus`].

pub mod policy;

pub use policy::{AttendancePolicy, PolicyError};
pub use rollcall_attendance_models::{
    AttendanceEvaluation, AttendanceStatus, SessionStats, StatusThresholds,
};

use rollcall_geofence::{EvaluationError, Polygon, PolygonError, calculate_inside_count, decode};

/// Errors that can occur while scoring a submission.
#[derive(Debug, thiserror::Error)]
pub enum AttendanceError {
    /// The session polygon could not be decoded.
    #[error(transparent)]
    Polygon(#[from] PolygonError),

    /// The sample batch was rejected.
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

/// Maps an inside-sample count to a status using the default buckets.
#[must_use]
pub fn classify(inside_count: usize) -> AttendanceStatus {
    StatusThresholds::default().status_for(inside_count)
}

/// Scores `samples` against an already-decoded polygon.
///
/// # Errors
///
/// Returns [`EvaluationError`] if the policy rejects malformed samples and
/// one is found.
pub fn evaluate_against(
    polygon: &Polygon,
    samples: &[serde_json::Value],
    policy: &AttendancePolicy,
) -> Result<AttendanceEvaluation, EvaluationError> {
    let tally = calculate_inside_count(samples, polygon, &policy.geofence)?;
    let evaluation = AttendanceEvaluation::from_tally(tally, &policy.thresholds);

    log::info!(
        "Attendance status {} ({} inside of {} submitted)",
        evaluation.status,
        evaluation.inside_count,
        evaluation.total_samples
    );

    Ok(evaluation)
}

/// Decodes a polygon from JSON and scores `samples` against it.
///
/// # Errors
///
/// Returns [`AttendanceError::Polygon`] for an undecodable polygon, and
/// [`AttendanceError::Evaluation`] as for [`evaluate_against`].
pub fn evaluate_submission(
    polygon: &serde_json::Value,
    samples: &[serde_json::Value],
    policy: &AttendancePolicy,
) -> Result<AttendanceEvaluation, AttendanceError> {
    let polygon = decode::polygon_from_value(polygon)?;
    Ok(evaluate_against(&polygon, samples, policy)?)
}

/// Like [`evaluate_submission`] for a polygon stored as an encoded string.
///
/// # Errors
///
/// Same as [`evaluate_submission`], plus JSON syntax errors in `polygon`.
pub fn evaluate_encoded(
    polygon: &str,
    samples: &[serde_json::Value],
    policy: &AttendancePolicy,
) -> Result<AttendanceEvaluation, AttendanceError> {
    let polygon = decode::parse_polygon(polygon)?;
    Ok(evaluate_against(&polygon, samples, policy)?)
}
