#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Standalone entry point for the rollcall API server.
//!
//! Configured entirely from the environment: `BIND_ADDR`, `PORT`,
//! `ROLLCALL_POLICY`, and `RUST_LOG`.

use rollcall_server::{ServerConfig, run_server};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = ServerConfig::from_env()?;
    run_server(config).await?;

    Ok(())
}
