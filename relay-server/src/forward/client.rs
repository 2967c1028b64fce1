//! HTTP client that posts a JSON payload to the configured webhook.

use std::time::Duration;

use reqwest::{header::CONTENT_TYPE, Client};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};
use url::Url;

use crate::Config;

/// Failure to complete a forward. A downstream error status is not one of
/// these: any response that arrives with a readable body is a success.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("downstream timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("downstream request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("failed to read downstream response: {0}")]
    ReadBody(#[source] reqwest::Error),
}

impl ForwardError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ForwardError::Timeout(_))
    }

    fn from_send(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ForwardError::Timeout(e)
        } else {
            ForwardError::Transport(e)
        }
    }

    fn from_read(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ForwardError::Timeout(e)
        } else {
            ForwardError::ReadBody(e)
        }
    }
}

/// Posts payloads to a single downstream URL.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: Client,
    url: Url,
    timeout: Option<Duration>,
}

impl Forwarder {
    /// Create a forwarder for the webhook URL and timeout in `config`.
    pub fn new(config: &Config) -> Result<Self, ForwardError> {
        let mut builder = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));

        // Loopback downstreams are reached directly, ignoring HTTP(S)_PROXY.
        if is_loopback(&config.webhook_url) {
            builder = builder.no_proxy();
        }

        let client = builder.build().map_err(ForwardError::Client)?;

        Ok(Self {
            client,
            url: config.webhook_url.clone(),
            timeout: config.forward_timeout,
        })
    }

    /// POST `payload` as JSON and return the downstream body as text.
    ///
    /// The downstream status code is logged and otherwise ignored.
    pub async fn forward(&self, payload: &Value) -> Result<String, ForwardError> {
        let body = serde_json::to_vec(payload)?;
        let body_length = body.len();

        let mut request = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body);

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| {
            let err = ForwardError::from_send(e);
            log_failure(&self.url, &err);
            err
        })?;

        let status = response.status().as_u16();

        let text = response.text().await.map_err(|e| {
            let err = ForwardError::from_read(e);
            log_failure(&self.url, &err);
            err
        })?;

        info!(
            url = %self.url,
            status_code = status,
            request_length = body_length,
            response_length = text.len(),
            "relay_forward_complete"
        );

        Ok(text)
    }
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
        Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
        Some(url::Host::Domain(name)) => name.eq_ignore_ascii_case("localhost"),
        None => false,
    }
}

fn log_failure(url: &Url, err: &ForwardError) {
    if err.is_timeout() {
        error!(url = %url, error = %err, "relay_forward_timeout");
    } else {
        error!(url = %url, error = %err, "relay_forward_failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn forwarder_for(uri: &str, timeout: Option<Duration>) -> Forwarder {
        let mut config = Config::new(Url::parse(uri).unwrap());
        config.forward_timeout = timeout;
        Forwarder::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_forward_posts_json_and_returns_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(header("content-type", "application/json"))
            .and(body_string(r#"{"a":1}"#))
            .respond_with(ResponseTemplate::new(200).set_body_string("received"))
            .expect(1)
            .mount(&server)
            .await;

        let forwarder = forwarder_for(&format!("{}/hook", server.uri()), None);
        let text = forwarder.forward(&json!({"a": 1})).await.unwrap();

        assert_eq!(text, "received");
    }

    #[tokio::test]
    async fn test_forward_preserves_key_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string(r#"{"zeta":1,"alpha":[true,null],"mid":{"y":"b","x":"a"}}"#))
            .respond_with(ResponseTemplate::new(200).set_body_string("Accepted"))
            .expect(1)
            .mount(&server)
            .await;

        let payload: Value =
            serde_json::from_str(r#"{"zeta":1,"alpha":[true,null],"mid":{"y":"b","x":"a"}}"#)
                .unwrap();
        let forwarder = forwarder_for(&server.uri(), None);

        assert_eq!(forwarder.forward(&payload).await.unwrap(), "Accepted");
    }

    #[tokio::test]
    async fn test_forward_error_status_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("error"))
            .mount(&server)
            .await;

        let forwarder = forwarder_for(&server.uri(), None);
        let text = forwarder.forward(&json!({})).await.unwrap();

        assert_eq!(text, "error");
    }

    #[tokio::test]
    async fn test_forward_null_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string("null"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let forwarder = forwarder_for(&server.uri(), None);

        assert_eq!(forwarder.forward(&Value::Null).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_forward_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("too late")
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let forwarder = forwarder_for(&server.uri(), Some(Duration::from_millis(50)));
        let err = forwarder.forward(&Value::Null).await.unwrap_err();

        assert!(err.is_timeout(), "expected timeout, got {err:?}");
    }

    #[tokio::test]
    async fn test_forward_connection_refused() {
        // Grab a free port, then close it so nothing is listening.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let forwarder = forwarder_for(&format!("http://{addr}/hook"), None);
        let err = forwarder.forward(&json!({"a": 1})).await.unwrap_err();

        assert!(matches!(err, ForwardError::Transport(_)), "got {err:?}");
    }

    #[test]
    fn test_is_loopback() {
        assert!(is_loopback(&Url::parse("http://127.0.0.1:8080/hook").unwrap()));
        assert!(is_loopback(&Url::parse("http://[::1]/hook").unwrap()));
        assert!(is_loopback(&Url::parse("http://LOCALHOST/hook").unwrap()));
        assert!(!is_loopback(&Url::parse(crate::DEFAULT_WEBHOOK_URL).unwrap()));
    }
}
