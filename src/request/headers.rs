//! Extra request headers.

use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use uuid::Uuid;

use crate::error::{DispatchError, DispatchResult};

/// Correlation header carried by every dispatched call.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Validate caller headers into a `HeaderMap`.
///
/// Runs once per call, before any host is contacted.
pub fn to_header_map(headers: &BTreeMap<String, String>) -> DispatchResult<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len() + 1);
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| DispatchError::InvalidRequest(format!("header name '{}': {}", name, e)))?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            DispatchError::InvalidRequest(format!("header value for '{}': {}", name, e))
        })?;
        map.insert(name, value);
    }
    Ok(map)
}

/// Ensure `headers` carries a request ID, generating a UUID v4 when absent.
///
/// Returns the ID in use.
pub fn ensure_request_id(headers: &mut HeaderMap) -> String {
    if let Some(existing) = headers.get(X_REQUEST_ID).and_then(|v| v.to_str().ok()) {
        return existing.to_string();
    }
    let id = Uuid::new_v4().to_string();
    // A hyphenated UUID is always a valid header value
    if let Ok(value) = HeaderValue::from_str(&id) {
        headers.insert(X_REQUEST_ID, value);
    }
    id
}
