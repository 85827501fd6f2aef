// SPDX-FileCopyrightText: 2026 Mixdown Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP liveness probe.
//!
//! A tiny axum server answering `/` and `/health` so container platforms
//! can see the process is alive. It says nothing about Telegram
//! connectivity or job state.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

use mixdown_config::model::HealthConfig;
use mixdown_core::MixdownError;

async fn health(State(service): State<String>) -> Json<Value> {
    Json(json!({ "status": "ok", "service": service }))
}

fn router(service: String) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .with_state(service)
}

/// Binds the probe and serves it until the process exits.
pub async fn run_probe(config: HealthConfig, service: String) -> Result<(), MixdownError> {
    let app = router(service);
    let addr = format!("{}:{}", config.host, config.port);
    let listener =
        tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| MixdownError::Channel {
                message: format!("failed to bind liveness probe to {addr}: {e}"),
                source: Some(Box::new(e)),
            })?;

    tracing::info!("liveness probe listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| MixdownError::Channel {
            message: format!("liveness probe server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}
