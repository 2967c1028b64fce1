//! Inbound body decoding.
//!
//! The relay never inspects the payload, but it still has to turn raw bytes
//! into a JSON value before re-serializing them. Decoding follows the
//! request's `Content-Type`:
//!
//! | Content-Type                          | Result                         |
//! |---------------------------------------|--------------------------------|
//! | `application/json`, `*/*+json`        | parsed JSON, 400 if malformed  |
//! | `application/x-www-form-urlencoded`   | object of string fields        |
//! | `text/*`                              | JSON string                    |
//! | anything else or missing              | JSON if it parses, else string |
//!
//! An empty body is always `null`.

use axum::http::{header::CONTENT_TYPE, HeaderMap};
use serde_json::{Map, Value};

use super::error::RelayError;

/// Decode an inbound body into the value that will be forwarded.
pub fn parse_body(headers: &HeaderMap, bytes: &[u8]) -> Result<Value, RelayError> {
    if bytes.is_empty() {
        return Ok(Value::Null);
    }

    let content_type = content_type(headers);

    match content_type.as_deref() {
        Some(ct) if is_json(ct) => serde_json::from_slice(bytes).map_err(RelayError::InvalidBody),
        Some("application/x-www-form-urlencoded") => Ok(parse_form(bytes)),
        Some(ct) if ct.starts_with("text/") => {
            Ok(Value::String(String::from_utf8_lossy(bytes).into_owned()))
        }
        _ => Ok(serde_json::from_slice(bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))),
    }
}

/// Media type without parameters, lowercased.
fn content_type(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(CONTENT_TYPE)?.to_str().ok()?;
    let essence = raw.split(';').next().unwrap_or_default().trim();
    if essence.is_empty() {
        None
    } else {
        Some(essence.to_ascii_lowercase())
    }
}

fn is_json(content_type: &str) -> bool {
    content_type == "application/json" || content_type.ends_with("+json")
}

/// Repeated keys collect into an array, in order of appearance.
fn parse_form(bytes: &[u8]) -> Value {
    let mut fields = Map::new();

    for (key, value) in url::form_urlencoded::parse(bytes) {
        let value = Value::String(value.into_owned());
        match fields.get_mut(&*key) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                fields.insert(key.into_owned(), value);
            }
        }
    }

    Value::Object(fields)
}
