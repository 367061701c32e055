#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! HTTP retry helpers for transient errors.
//!
//! Outbound calls (the dataset download and every geocoding lookup) go
//! through [`send_json`] or [`send_bytes`] instead of calling
//! `reqwest::RequestBuilder::send()` directly. Each attempt is bounded by
//! [`RetryPolicy::timeout`], and transient failures (timeouts, connection
//! errors, HTTP 429, HTTP 5xx) are retried with exponential backoff.
//!
//! ```ignore
//! let policy = RetryPolicy::default();
//! let body: serde_json::Value = send_json(&policy, || client.get(&url)).await?;
//! ```

use std::time::Duration;

use serde::de::DeserializeOwned;

/// Errors returned once all retries are exhausted or a failure is permanent.
#[derive(Debug, thiserror::Error)]
pub enum RetryError {
    /// The request could not be sent or its body could not be read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Final status code.
        status: reqwest::StatusCode,
        /// Requested URL, without its query string.
        url: String,
    },

    /// The response body was not valid JSON for the expected type.
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),
}

/// How many times, and how patiently, a request is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. `0` disables retrying.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each subsequent one.
    pub initial_backoff: Duration,
    /// Timeout applied to each individual attempt.
    pub timeout: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
            timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl RetryPolicy {
    /// Returns the delay to wait before retry number `attempt` (1-based).
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        self.initial_backoff.saturating_mul(1u32 << shift)
    }
}

/// Sends a request and decodes the response body as JSON.
///
/// `build_request` is called once per attempt since builders are consumed
/// by `send()`.
///
/// # Errors
///
/// Returns [`RetryError`] if the request fails after all retries, the
/// server returns a non-retryable status, or the body is not valid JSON.
#[allow(clippy::future_not_send)]
pub async fn send_json<T, F>(policy: &RetryPolicy, build_request: F) -> Result<T, RetryError>
where
    T: DeserializeOwned,
    F: Fn() -> reqwest::RequestBuilder,
{
    let bytes = send_bytes(policy, build_request).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Sends a request and returns the raw response body.
///
/// A body that fails to arrive completely is treated like any other
/// transient failure and the whole request is retried.
///
/// # Errors
///
/// Returns [`RetryError`] if the request fails after all retries or the
/// server returns a non-retryable status.
#[allow(clippy::future_not_send)]
pub async fn send_bytes<F>(policy: &RetryPolicy, build_request: F) -> Result<Vec<u8>, RetryError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut attempt = 0;

    loop {
        let failure = match send_once(policy, &build_request).await {
            Ok(response) => match response.bytes().await {
                Ok(bytes) => return Ok(bytes.to_vec()),
                Err(e) => RetryError::Http(strip_query(e)),
            },
            Err(e) => e,
        };

        if attempt >= policy.max_retries || !is_transient(&failure) {
            if attempt > 0 {
                log::error!("Giving up after {attempt} retries: {failure}");
            }
            return Err(failure);
        }

        attempt += 1;
        let delay = policy.backoff(attempt);
        log::warn!(
            "  {failure} (retry {attempt}/{} in {delay:?})",
            policy.max_retries
        );
        tokio::time::sleep(delay).await;
    }
}

/// Sends a single attempt, converting non-success statuses into errors.
#[allow(clippy::future_not_send)]
async fn send_once<F>(
    policy: &RetryPolicy,
    build_request: &F,
) -> Result<reqwest::Response, RetryError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut request = build_request();
    if let Some(timeout) = policy.timeout {
        request = request.timeout(timeout);
    }

    let response = request
        .send()
        .await
        .map_err(|e| RetryError::Http(strip_query(e)))?;
    let status = response.status();

    if status.is_success() || status.is_redirection() {
        return Ok(response);
    }

    let mut url = response.url().clone();
    url.set_query(None);

    Err(RetryError::Status {
        status,
        url: url.to_string(),
    })
}

/// Removes the query string from the URL carried by a `reqwest` error so
/// that credentials passed as query parameters never reach the logs.
fn strip_query(mut error: reqwest::Error) -> reqwest::Error {
    if let Some(url) = error.url_mut() {
        url.set_query(None);
    }
    error
}

/// Returns `true` if the failure is likely transient and worth retrying.
fn is_transient(error: &RetryError) -> bool {
    match error {
        RetryError::Http(e) => e.is_timeout() || e.is_connect() || e.is_body() || e.is_request(),
        RetryError::Status { status, .. } => {
            *status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
        }
        RetryError::Json(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};
    use tokio::net::TcpListener;

    use super::*;

    /// Serves the canned responses in order, one per connection, repeating
    /// the last one once the list is exhausted.
    async fn serve(responses: Vec<(u16, &'static str)>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let idx = counter.fetch_add(1, Ordering::SeqCst);
                let (status, body) = responses[idx.min(responses.len() - 1)];

                let mut buf = [0u8; 4096];
                let mut request = Vec::new();
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    let Ok(n) = socket.read(&mut buf).await else {
                        break;
                    };
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }

                let reply = format!(
                    "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{addr}/"), hits)
    }

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_backoff: Duration::from_millis(1),
            timeout: Some(Duration::from_secs(5)),
        }
    }

    #[test]
    fn backoff_doubles() {
        let policy = RetryPolicy {
            max_retries: 5,
            initial_backoff: Duration::from_millis(100),
            timeout: None,
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(4), Duration::from_millis(800));
    }

    #[tokio::test]
    async fn retries_server_errors_then_succeeds() {
        let (url, hits) = serve(vec![(503, ""), (500, ""), (200, r#"{"ok":true}"#)]).await;
        let client = reqwest::Client::new();

        let body: serde_json::Value = send_json(&fast_policy(3), || client.get(&url))
            .await
            .unwrap();

        assert_eq!(body["ok"], true);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let (url, hits) = serve(vec![(503, "")]).await;
        let client = reqwest::Client::new();

        let err = send_bytes(&fast_policy(2), || client.get(&url))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RetryError::Status { status, .. } if status.as_u16() == 503
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_client_errors() {
        let (url, hits) = serve(vec![(404, "")]).await;
        let client = reqwest::Client::new();

        let err = send_bytes(&fast_policy(3), || client.get(&url))
            .await
            .unwrap_err();

        assert!(matches!(err, RetryError::Status { .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rate_limit_is_retried() {
        let (url, hits) = serve(vec![(429, ""), (200, "[]")]).await;
        let client = reqwest::Client::new();

        let body: Vec<u32> = send_json(&fast_policy(1), || client.get(&url))
            .await
            .unwrap();

        assert!(body.is_empty());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalid_json_is_permanent() {
        let (url, hits) = serve(vec![(200, "not json")]).await;
        let client = reqwest::Client::new();

        let err = send_json::<serde_json::Value, _>(&fast_policy(3), || client.get(&url))
            .await
            .unwrap_err();

        assert!(matches!(err, RetryError::Json(_)));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
