//! Relay endpoint handlers.
//!
//! The relay handler is a single straight pass:
//! 1. Reject anything that isn't a POST
//! 2. Log the payload
//! 3. Forward it and wait for the downstream
//! 4. Wrap the downstream text in the envelope

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{FromRequest, Request, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::forward::{ForwardError, Forwarder};
use crate::web::body::parse_body;
use crate::web::error::RelayError;
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub forwarder: Forwarder,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, ForwardError> {
        let forwarder = Forwarder::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            forwarder,
        })
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Relay
// =============================================================================

/// Envelope returned after a completed forward.
#[derive(Debug, Serialize)]
pub struct RelayResponse {
    pub ok: bool,
    pub forwarded: bool,
    /// Downstream body, verbatim.
    pub make_response: String,
}

/// Body of every non-envelope response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Relay endpoint, mounted for every method.
///
/// The body is only buffered once the method is known to be POST, so the
/// body limit never applies to a rejected method.
pub async fn relay(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, RelayError> {
    if request.method() != Method::POST {
        warn!(method = %request.method(), "relay_method_rejected");
        return Ok((
            StatusCode::METHOD_NOT_ALLOWED,
            Json(MessageResponse {
                message: "Method Not Allowed",
            }),
        )
            .into_response());
    }

    let headers = request.headers().clone();
    let body = Bytes::from_request(request, &state).await?;

    let payload = parse_body(&headers, &body).inspect_err(|e| {
        warn!(error = %e, body_length = body.len(), "relay_invalid_body");
    })?;

    info!(body = %payload, "relay_received");

    let make_response = state.forwarder.forward(&payload).await?;

    Ok((
        StatusCode::OK,
        Json(RelayResponse {
            ok: true,
            forwarded: true,
            make_response,
        }),
    )
        .into_response())
}
