//! Encoded request bodies.

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::RequestBuilder;

use crate::error::{DispatchError, DispatchResult};
use crate::request::call::Payload;
use crate::request::multipart::MultipartBody;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A payload encoded once per call and attached to every attempt.
#[derive(Debug, Clone)]
pub enum EncodedBody {
    None,
    Raw {
        content_type: &'static str,
        data: Bytes,
    },
    Multipart(MultipartBody),
}

impl EncodedBody {
    pub fn encode(payload: &Payload) -> DispatchResult<Self> {
        Ok(match payload {
            Payload::Empty => EncodedBody::None,
            Payload::Json(value) => EncodedBody::Raw {
                content_type: JSON_CONTENT_TYPE,
                data: Bytes::from(serde_json::to_vec(value).map_err(DispatchError::Encode)?),
            },
            Payload::Form(fields) => EncodedBody::Raw {
                content_type: FORM_CONTENT_TYPE,
                data: Bytes::from(fields.encode()),
            },
            Payload::Multipart(body) => EncodedBody::Multipart(body.clone()),
        })
    }

    /// Attach the body to one attempt's request.
    pub fn apply(&self, builder: RequestBuilder) -> DispatchResult<RequestBuilder> {
        match self {
            EncodedBody::None => Ok(builder),
            EncodedBody::Raw { content_type, data } => {
                Ok(builder.header(CONTENT_TYPE, *content_type).body(data.clone()))
            }
            EncodedBody::Multipart(body) => Ok(builder.multipart(body.to_form()?)),
        }
    }
}
