//! Per-call request description.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::{DispatchError, DispatchResult};
use crate::request::form::{FormEncode, FormFields};
use crate::request::multipart::MultipartBody;
use crate::request::query::encode_query;

/// Body of a call.
#[derive(Debug, Clone, Default)]
pub enum Payload {
    /// No body.
    #[default]
    Empty,
    /// Serialized as `application/json; charset=utf-8`.
    Json(Value),
    /// Serialized as `application/x-www-form-urlencoded`.
    Form(FormFields),
    /// Sent as `multipart/form-data`.
    Multipart(MultipartBody),
}

impl Payload {
    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }

    /// Diagnostic view of the payload. Multipart content is summarized.
    pub fn describe(&self) -> Value {
        match self {
            Payload::Empty => Value::Null,
            Payload::Json(value) => value.clone(),
            Payload::Form(fields) => fields.to_json(),
            Payload::Multipart(body) => body.describe(),
        }
    }
}

/// Everything one dispatcher call needs besides the host.
///
/// ```
/// use multihost_dispatch::request::CallDescriptor;
///
/// let call = CallDescriptor::new("/api/people")
///     .query("page", "2")
///     .header("Accept-Language", "it-IT");
/// assert_eq!(call.query_string(), "page=2");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallDescriptor {
    endpoint: String,
    query: BTreeMap<String, String>,
    headers: BTreeMap<String, String>,
    payload: Payload,
    cancel: Option<CancellationToken>,
}

impl CallDescriptor {
    /// A call to `endpoint`, relative to each host's base URL.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn query_map<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Use `payload` serialized as JSON for the body.
    pub fn json<T: Serialize + ?Sized>(mut self, payload: &T) -> DispatchResult<Self> {
        let value = serde_json::to_value(payload).map_err(DispatchError::Encode)?;
        self.payload = Payload::Json(value);
        Ok(self)
    }

    /// Use the flat field projection of `payload` as a form body.
    pub fn form<F: FormEncode + ?Sized>(mut self, payload: &F) -> Self {
        self.payload = Payload::Form(payload.form_fields());
        self
    }

    pub fn multipart(mut self, body: MultipartBody) -> Self {
        self.payload = Payload::Multipart(body);
        self
    }

    /// Abort the call as soon as `token` is cancelled.
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn query_params(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    pub fn extra_headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancel.as_ref()
    }

    /// Encoded query string, empty when there are no parameters.
    pub fn query_string(&self) -> String {
        encode_query(&self.query)
    }

    /// Arguments of the call: the payload when there is one, otherwise the query.
    pub fn arguments(&self) -> Value {
        if self.payload.is_empty() {
            Value::Object(
                self.query
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            )
        } else {
            self.payload.describe()
        }
    }
}
