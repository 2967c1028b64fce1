//! Outbound forwarding to the downstream webhook.

pub mod client;

pub use client::{ForwardError, Forwarder};
