//! Call outcome envelope.

use serde_json::Value;
use url::Url;

/// A completed call: what was asked, who answered, and the decoded result.
#[derive(Debug, Clone)]
pub struct CallOutcome<T> {
    /// Endpoint path as given by the caller.
    pub endpoint: String,
    /// Query parameters or payload summary used for the call.
    pub arguments: Value,
    /// Base URL of the host that answered.
    pub host: Url,
    /// Hosts attempted, including the one that answered.
    pub attempts: usize,
    /// Correlation ID sent as `x-request-id`.
    pub request_id: String,
    pub result: T,
}

impl<T> CallOutcome<T> {
    pub fn into_result(self) -> T {
        self.result
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CallOutcome<U> {
        CallOutcome {
            endpoint: self.endpoint,
            arguments: self.arguments,
            host: self.host,
            attempts: self.attempts,
            request_id: self.request_id,
            result: f(self.result),
        }
    }
}
