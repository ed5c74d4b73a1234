//! Response processing shared by all operations.

use reqwest::Response;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{DispatchError, DispatchResult};
use crate::pool::Host;

/// Bytes of a non-2xx body kept for diagnostics.
pub const EXCERPT_LIMIT: usize = 512;

/// Pass 2xx replies through; otherwise fail with `UnsuccessfulStatus`
/// carrying the start of the body.
pub async fn check_status(
    response: Response,
    host: &Host,
    endpoint: &str,
) -> DispatchResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let excerpt = read_excerpt(response).await;
    Err(DispatchError::UnsuccessfulStatus {
        host: host.url().clone(),
        endpoint: endpoint.to_string(),
        status,
        excerpt,
    })
}

/// Read at most `EXCERPT_LIMIT` bytes of the body. Read failures end the excerpt.
async fn read_excerpt(mut response: Response) -> Option<String> {
    let mut buf = Vec::new();
    while buf.len() < EXCERPT_LIMIT {
        match response.chunk().await {
            Ok(Some(chunk)) => buf.extend_from_slice(&chunk),
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(error = %e, "Failed to read error body");
                break;
            }
        }
    }
    buf.truncate(EXCERPT_LIMIT);

    let text = String::from_utf8_lossy(&buf).trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// Check status, read the full body and decode it as JSON.
pub async fn process_response<T: DeserializeOwned>(
    response: Response,
    host: &Host,
    endpoint: &str,
    arguments: &Value,
) -> DispatchResult<T> {
    let response = check_status(response, host, endpoint).await?;

    let text = response.text().await.map_err(|source| DispatchError::Body {
        host: host.url().clone(),
        endpoint: endpoint.to_string(),
        source,
    })?;
    tracing::trace!(response = %text, "Received response");

    decode_body(&text, endpoint, arguments)
}

/// Decode a response body, rejecting empty and whitespace-only bodies.
pub fn decode_body<T: DeserializeOwned>(
    text: &str,
    endpoint: &str,
    arguments: &Value,
) -> DispatchResult<T> {
    if text.trim().is_empty() {
        return Err(DispatchError::EmptyResponse {
            endpoint: endpoint.to_string(),
            arguments: arguments.to_string(),
        });
    }
    serde_json::from_str(text).map_err(|source| DispatchError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Example {
        id: u32,
        description: String,
    }

    #[test]
    fn test_decode_success() {
        let example: Example =
            decode_body(r#"{"id":3,"description":"third"}"#, "/api/example/3", &json!({})).unwrap();
        assert_eq!(
            example,
            Example {
                id: 3,
                description: "third".into()
            }
        );
    }

    #[test]
    fn test_whitespace_body_is_empty_response() {
        let args = json!({"id": "3"});
        let err = decode_body::<Example>(" \r\n\t", "/api/example/3", &args).unwrap_err();
        match err {
            DispatchError::EmptyResponse { endpoint, arguments } => {
                assert_eq!(endpoint, "/api/example/3");
                assert_eq!(arguments, r#"{"id":"3"}"#);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_body_is_decode_error() {
        let err = decode_body::<Example>("{\"id\":", "/e", &json!({})).unwrap_err();
        assert!(matches!(err, DispatchError::Decode { .. }));

        let err = decode_body::<Example>(r#"{"id":"x"}"#, "/e", &json!({})).unwrap_err();
        assert!(matches!(err, DispatchError::Decode { .. }));
    }

    fn reply<B: Into<reqwest::Body>>(status: u16, body: B) -> Response {
        Response::from(
            axum::http::Response::builder()
                .status(status)
                .body(body)
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_check_status_passes_success_through() {
        let host = Host::parse("http://127.0.0.1:1").unwrap();
        let response = check_status(reply(204, ""), &host, "/e").await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_error_status_keeps_excerpt() {
        let host = Host::parse("http://127.0.0.1:1").unwrap();
        let err = check_status(reply(400, " {\"error\":\"bad id\"}\n"), &host, "/e")
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(reqwest::StatusCode::BAD_REQUEST));
        match err {
            DispatchError::UnsuccessfulStatus { excerpt, .. } => {
                assert_eq!(excerpt.as_deref(), Some(r#"{"error":"bad id"}"#));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_excerpt_is_bounded() {
        let host = Host::parse("http://127.0.0.1:1").unwrap();
        let body = "x".repeat(4 * EXCERPT_LIMIT);
        match check_status(reply(502, body), &host, "/e").await.unwrap_err() {
            DispatchError::UnsuccessfulStatus { excerpt, .. } => {
                assert_eq!(excerpt.map(|e| e.len()), Some(EXCERPT_LIMIT));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_error_body_has_no_excerpt() {
        let host = Host::parse("http://127.0.0.1:1").unwrap();
        match check_status(reply(404, ""), &host, "/e").await.unwrap_err() {
            DispatchError::UnsuccessfulStatus { excerpt, .. } => assert!(excerpt.is_none()),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
