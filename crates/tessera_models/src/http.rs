//! Shared HTTP plumbing: client construction, credentials and status mapping.

use reqwest::{Client, Response, StatusCode, header::HeaderMap};
use std::time::Duration;
use tessera_error::{TesseraResult, UpstreamError, UpstreamErrorKind};
use tessera_rate_limit::retry_after_from_headers;

/// HTTP client with the configured per-request timeout.
pub(crate) fn client(service: &str, timeout: Duration) -> TesseraResult<Client> {
    Client::builder().timeout(timeout).build().map_err(|e| {
        UpstreamError::new(
            service,
            UpstreamErrorKind::Transport(format!("Failed to build HTTP client: {}", e)),
        )
        .into()
    })
}

/// Read a credential from the environment.
pub(crate) fn credential(service: &str, var: &str) -> TesseraResult<String> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(UpstreamError::new(
            service,
            UpstreamErrorKind::MissingCredential(format!("{} not set", var)),
        )
        .into()),
    }
}

/// Map a request failure that never produced a response.
pub(crate) fn transport(service: &str, err: reqwest::Error) -> UpstreamError {
    UpstreamError::new(service, UpstreamErrorKind::Transport(err.to_string()))
}

/// Map a malformed response body.
pub(crate) fn invalid(service: &str, message: impl Into<String>) -> UpstreamError {
    UpstreamError::new(service, UpstreamErrorKind::InvalidResponse(message.into()))
}

/// Error for a non-success status: 429 is a retryable rate limit, anything
/// else is a plain HTTP error.
pub(crate) fn status_error(
    service: &str,
    status: StatusCode,
    headers: &HeaderMap,
    body: &str,
) -> UpstreamError {
    let message = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("no body").to_string()
    } else {
        body.trim().to_string()
    };
    if status == StatusCode::TOO_MANY_REQUESTS {
        return UpstreamError::new(
            service,
            UpstreamErrorKind::RateLimited {
                message,
                retry_after_secs: retry_after_from_headers(headers),
            },
        );
    }
    UpstreamError::new(
        service,
        UpstreamErrorKind::Http {
            status_code: status.as_u16(),
            message,
        },
    )
}

/// Pass successful responses through, turn the rest into errors.
pub(crate) async fn check(service: &str, response: Response) -> TesseraResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let headers = response.headers().clone();
    let body = response.text().await.unwrap_or_default();
    let err = status_error(service, status, &headers, &body);
    tracing::warn!(service, status = status.as_u16(), error = %err, "Upstream request failed");
    Err(err.into())
}
