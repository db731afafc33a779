#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for geofenced attendance evaluation.
//!
//! Exposes the evaluator over JSON: scoring a submission, inspecting a
//! session polygon, and tallying per-session statistics. The server holds
//! no per-request state; the only shared value is the immutable
//! [`AttendancePolicy`] loaded at startup.

mod handlers;

use std::path::Path;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, error, middleware, web};
use rollcall_attendance::{AttendancePolicy, PolicyError};
use rollcall_server_models::ApiError;

/// Bind address used when `BIND_ADDR` is unset.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";

/// Port used when `PORT` is unset or unparseable.
pub const DEFAULT_PORT: u16 = 8080;

/// Shared application state.
pub struct AppState {
    /// Policy applied to every submission.
    pub policy: AttendancePolicy,
}

/// Everything needed to start the server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    pub policy: AttendancePolicy,
}

impl ServerConfig {
    /// Reads `BIND_ADDR`, `PORT`, and `ROLLCALL_POLICY` from the
    /// environment, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] if `ROLLCALL_POLICY` names a policy that
    /// fails to load.
    pub fn from_env() -> Result<Self, PolicyError> {
        Self::from_env_with_policy(None)
    }

    /// Like [`Self::from_env`], but a `policy_path` takes precedence over
    /// `ROLLCALL_POLICY`, which is then never read.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] if the chosen policy fails to load.
    pub fn from_env_with_policy(policy_path: Option<&Path>) -> Result<Self, PolicyError> {
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Ok(Self {
            bind_addr,
            port,
            policy: AttendancePolicy::load(policy_path)?,
        })
    }
}

/// Registers the `/api` routes and the JSON body error handler.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        log::debug!("Rejected request body: {message}");
        error::InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(ApiError { error: message }),
        )
        .into()
    });

    cfg.app_data(json_config).service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/policy", web::get().to(handlers::policy))
            .route(
                "/attendance/evaluate",
                web::post().to(handlers::evaluate_attendance),
            )
            .route("/geofence/inspect", web::post().to(handlers::inspect_geofence))
            .route("/sessions/stats", web::post().to(handlers::session_stats)),
    );
}

/// Starts the API server.
///
/// This is a regular async function; the caller provides the runtime (e.g.
/// via `#[actix_web::main]`). Logging must already be initialized.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    let ServerConfig {
        bind_addr,
        port,
        policy,
    } = config;

    log::info!(
        "Attendance policy: accuracy <= {}m, malformed samples {}, thresholds {}/{}/{}",
        policy.geofence.accuracy_threshold_m,
        policy.geofence.malformed_samples,
        policy.thresholds.present,
        policy.thresholds.late,
        policy.thresholds.short
    );

    let state = web::Data::new(AppState { policy });

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
