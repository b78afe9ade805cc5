//! Rate-limit hints from HTTP response headers.

use reqwest::header::{HeaderMap, RETRY_AFTER};

/// Seconds to wait according to a `Retry-After` header.
///
/// Only the delta-seconds form is understood; HTTP dates yield `None`.
///
/// # Examples
///
/// ```
/// use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};
/// use tessera_rate_limit::retry_after_from_headers;
///
/// let mut headers = HeaderMap::new();
/// headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));
/// assert_eq!(retry_after_from_headers(&headers), Some(7));
/// ```
pub fn retry_after_from_headers(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
