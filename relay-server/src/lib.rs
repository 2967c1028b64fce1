//! Pantheon Relay - single-endpoint HTTP relay.
//!
//! Accepts a POST, logs its payload, forwards the payload unchanged to one
//! downstream webhook and answers with the downstream's text wrapped in an
//! envelope.
//!
//! ## Architecture
//!
//! ```text
//! Caller → web::relay → forward::Forwarder → Downstream webhook
//!        ←  {"ok":true,"forwarded":true,"make_response":"…"}
//! ```

pub mod config;
pub mod forward;
pub mod web;

// Re-export commonly used types
pub use config::{Config, ConfigError, DEFAULT_WEBHOOK_URL};
pub use forward::{ForwardError, Forwarder};
pub use web::{build_router, AppState, RelayError};
