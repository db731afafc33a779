//! HTTP handler functions for the rollcall API.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use rollcall_attendance::{SessionStats, evaluate_submission};
use rollcall_geofence::{Coordinate, decode, inspect::inspect_polygon};
use rollcall_server_models::{
    ApiError, ApiEvaluation, ApiHealth, ApiPolicy, EvaluateRequest, InspectRequest, StatsRequest,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/policy`
///
/// Returns the attendance policy the server was started with.
pub async fn policy(state: web::Data<AppState>) -> HttpResponse {
    let geofence = &state.policy.geofence;
    HttpResponse::Ok().json(ApiPolicy {
        accuracy_threshold_m: geofence.accuracy_threshold_m,
        missing_accuracy_m: geofence.missing_accuracy_m,
        malformed_samples: geofence.malformed_samples.to_string(),
        thresholds: state.policy.thresholds,
    })
}

/// `POST /api/attendance/evaluate`
///
/// Scores a batch of location samples against a session polygon.
pub async fn evaluate_attendance(
    state: web::Data<AppState>,
    body: web::Json<EvaluateRequest>,
) -> HttpResponse {
    let request = body.into_inner();

    match evaluate_submission(&request.polygon, &request.samples, &state.policy) {
        Ok(evaluation) => HttpResponse::Ok().json(ApiEvaluation {
            evaluation,
            evaluated_at: Utc::now(),
        }),
        Err(e) => {
            log::warn!("Failed to evaluate attendance submission: {e}");
            unprocessable(e.to_string())
        }
    }
}

/// `POST /api/geofence/inspect`
///
/// Describes a polygon's extent and checks optional probe points.
pub async fn inspect_geofence(body: web::Json<InspectRequest>) -> HttpResponse {
    let request = body.into_inner();

    match decode::polygon_from_value(&request.polygon) {
        Ok(polygon) => {
            let probes: Vec<Coordinate> =
                request.points.into_iter().map(Coordinate::from).collect();
            HttpResponse::Ok().json(inspect_polygon(&polygon, &probes))
        }
        Err(e) => {
            log::warn!("Failed to decode polygon for inspection: {e}");
            unprocessable(e.to_string())
        }
    }
}

/// `POST /api/sessions/stats`
///
/// Tallies per-status head counts for one session.
pub async fn session_stats(body: web::Json<StatsRequest>) -> HttpResponse {
    let request = body.into_inner();
    HttpResponse::Ok().json(SessionStats::tally(
        request.statuses,
        request.manual_count,
    ))
}

fn unprocessable(error: String) -> HttpResponse {
    HttpResponse::UnprocessableEntity().json(ApiError { error })
}
