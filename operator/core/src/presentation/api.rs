// Copyright (c) 2026 Pet Operator Contributors
// SPDX-License-Identifier: AGPL-3.0
//! HTTP surface of the gateway.
//!
//! | Route | Description |
//! |-------|-------------|
//! | `GET /healthz` | Liveness plus the bound owner id |
//! | `POST /v1/command` | Authorize and relay one signed command |
//!
//! This is the only place that knows how gateway errors map to HTTP status
//! codes.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::application::gateway::{AuthorizedGateway, COMMANDS_REJECTED_TOTAL, COMMANDS_TOTAL};
use crate::domain::command::{CommandRequest, CommandResponse};
use crate::domain::errors::{GatewayError, SignatureError};

pub struct AppState {
    pub gateway: Arc<AuthorizedGateway>,
}

pub fn app(gateway: Arc<AuthorizedGateway>) -> Router {
    let state = Arc::new(AppState { gateway });

    Router::new()
        .route("/healthz", get(health))
        .route("/v1/command", post(command))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// HTTP status for a gateway failure.
pub fn status_for(err: &GatewayError) -> StatusCode {
    match err {
        GatewayError::MalformedRequest(_) | GatewayError::CommandNotAllowed(_) => StatusCode::BAD_REQUEST,
        GatewayError::Expired
        | GatewayError::Replay
        | GatewayError::SignatureInvalid(SignatureError::Malformed) => StatusCode::UNAUTHORIZED,
        GatewayError::ForbiddenCommand
        | GatewayError::NotOwner
        | GatewayError::SignatureInvalid(SignatureError::Mismatch) => StatusCode::FORBIDDEN,
        GatewayError::NotLoggedIn => StatusCode::CONFLICT,
        GatewayError::UpstreamUnreachable(_) => StatusCode::BAD_GATEWAY,
        GatewayError::UpstreamError { status, .. } => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
        }
    }
}

fn error_response(err: &GatewayError) -> (StatusCode, Json<CommandResponse>) {
    let mut envelope = CommandResponse::failure(err.code(), err.to_string());
    if let GatewayError::UpstreamError { body, .. } = err {
        envelope = envelope.with_data(body.clone());
    }
    (status_for(err), Json(envelope))
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(
        CommandResponse::success(json!({ "owner_user_id": state.gateway.owner_user_id() }))
            .with_message("ok"),
    )
}

async fn command(State(state): State<Arc<AppState>>, body: Bytes) -> impl IntoResponse {
    let request: CommandRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            let err = GatewayError::MalformedRequest(e.to_string());
            warn!(code = err.code(), "Rejected unparseable command body: {}", e);
            metrics::counter!(COMMANDS_TOTAL, "outcome" => "rejected").increment(1);
            metrics::counter!(COMMANDS_REJECTED_TOTAL, "code" => err.code()).increment(1);
            return error_response(&err);
        }
    };

    match state.gateway.handle(request).await {
        Ok(data) => (StatusCode::OK, Json(CommandResponse::success(data))),
        Err(err) => error_response(&err),
    }
}
