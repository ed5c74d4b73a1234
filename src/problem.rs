//! Problem responses for upstream consumers.
//!
//! Services that own a dispatcher translate its failures into their own
//! protocol. `Problem` gives them a uniform starting point: a title, a
//! detail message and the HTTP status the failure most naturally maps to.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

/// A serializable description of a failed call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub title: String,
    pub detail: String,
    pub status: u16,
}

impl Problem {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            title: status
                .canonical_reason()
                .unwrap_or("Unexpected Error")
                .to_string(),
            detail: detail.into(),
            status: status.as_u16(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl Default for Problem {
    fn default() -> Self {
        Self {
            title: "Unexpected Error".to_string(),
            detail: String::new(),
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
        }
    }
}

impl From<&DispatchError> for Problem {
    fn from(err: &DispatchError) -> Self {
        let status = match err {
            DispatchError::Transport { .. } | DispatchError::Body { .. } if err.is_timeout() => {
                StatusCode::GATEWAY_TIMEOUT
            }
            DispatchError::Transport { .. } | DispatchError::Body { .. } => StatusCode::BAD_GATEWAY,
            // A missing resource upstream is a missing resource for our caller too.
            DispatchError::UnsuccessfulStatus { status, .. }
                if *status == StatusCode::NOT_FOUND =>
            {
                StatusCode::NOT_FOUND
            }
            DispatchError::UnsuccessfulStatus { .. }
            | DispatchError::EmptyResponse { .. }
            | DispatchError::Decode { .. } => StatusCode::BAD_GATEWAY,
            DispatchError::Cancelled { .. } => StatusCode::SERVICE_UNAVAILABLE,
            DispatchError::Configuration(_)
            | DispatchError::Encode(_)
            | DispatchError::InvalidRequest(_)
            | DispatchError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Problem::new(status, err.to_string())
    }
}

impl From<DispatchError> for Problem {
    fn from(err: DispatchError) -> Self {
        Problem::from(&err)
    }
}
