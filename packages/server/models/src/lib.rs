#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the rollcall server.
//!
//! Polygons and samples are accepted as raw JSON so that malformed input
//! reaches the evaluator, which reports it per sample instead of failing
//! the whole request body.

use chrono::{DateTime, Utc};
use rollcall_attendance_models::{AttendanceEvaluation, AttendanceStatus, StatusThresholds};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Error body returned for any non-2xx response produced by a handler.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub error: String,
}

/// Response of `GET /api/policy`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPolicy {
    pub accuracy_threshold_m: f64,
    pub missing_accuracy_m: f64,
    /// `skip` or `reject`.
    pub malformed_samples: String,
    pub thresholds: StatusThresholds,
}

/// Body of `POST /api/attendance/evaluate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateRequest {
    /// Session geofence: `[[lat, lng], ...]` or a `GeoJSON` polygon.
    pub polygon: serde_json::Value,
    /// Location samples, each `{latitude, longitude, accuracy, timestamp}`.
    pub samples: Vec<serde_json::Value>,
}

/// Response of `POST /api/attendance/evaluate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvaluation {
    #[serde(flatten)]
    pub evaluation: AttendanceEvaluation,
    /// When the server scored the submission.
    pub evaluated_at: DateTime<Utc>,
}

/// Body of `POST /api/geofence/inspect`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectRequest {
    pub polygon: serde_json::Value,
    /// Probe points as `[lat, lng]` pairs.
    #[serde(default)]
    pub points: Vec<[f64; 2]>,
}

/// Body of `POST /api/sessions/stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsRequest {
    /// Statuses of the geofence-evaluated submissions.
    pub statuses: Vec<AttendanceStatus>,
    /// Students marked present by hand.
    #[serde(default)]
    pub manual_count: usize,
}
