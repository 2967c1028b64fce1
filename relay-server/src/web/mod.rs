//! Web server module for the relay endpoint.
//!
//! This module provides the inbound side of the relay:
//! - Accepts any method on the relay path, forwards only POST
//! - Decodes the body into a JSON value
//! - Wraps the downstream's raw text in a small JSON envelope
//!
//! The outbound call lives in [`crate::forward`].

pub mod body;
pub mod error;
pub mod handlers;
pub mod router;

pub use error::RelayError;
pub use handlers::{health, relay, AppState, HealthResponse, MessageResponse, RelayResponse};
pub use router::{build_router, RELAY_PATH};
