//! Handler errors and their HTTP mapping.

use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use super::handlers::MessageResponse;
use crate::forward::ForwardError;

/// Anything that stops a POST from producing the relay envelope.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("failed to read request body: {0}")]
    Body(#[from] BytesRejection),

    #[error("invalid JSON body: {0}")]
    InvalidBody(#[source] serde_json::Error),

    #[error(transparent)]
    Forward(#[from] ForwardError),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::Body(rejection) => rejection.status(),
            RelayError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            RelayError::Forward(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            RelayError::Forward(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            RelayError::Body(_) => "Bad Request",
            RelayError::InvalidBody(_) => "Invalid JSON",
            RelayError::Forward(e) if e.is_timeout() => "Gateway Timeout",
            RelayError::Forward(_) => "Bad Gateway",
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        // Body limit and read failures keep axum's own rejection response.
        if let RelayError::Body(rejection) = self {
            return rejection.into_response();
        }

        (
            self.status(),
            Json(MessageResponse {
                message: self.message(),
            }),
        )
            .into_response()
    }
}
