//! Live response bodies.

use bytes::{Bytes, BytesMut};
use futures_util::{Stream, StreamExt};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Response, StatusCode};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use url::Url;

use crate::error::{DispatchError, DispatchResult};

/// The not-yet-read body of a reply.
///
/// The caller owns it and decides how much to read; nothing is buffered
/// ahead and no size limit is imposed.
#[derive(Debug)]
pub struct BodyStream {
    response: Response,
    host: Url,
    endpoint: String,
}

impl BodyStream {
    pub(crate) fn new(response: Response, host: Url, endpoint: impl Into<String>) -> Self {
        Self {
            response,
            host,
            endpoint: endpoint.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub fn content_length(&self) -> Option<u64> {
        self.response.content_length()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Next chunk of the body, `None` once it is exhausted.
    pub async fn chunk(&mut self) -> DispatchResult<Option<Bytes>> {
        let chunk = self.response.chunk().await;
        chunk.map_err(|source| self.body_error(source))
    }

    /// Read the remaining body into memory.
    pub async fn bytes(mut self) -> DispatchResult<Bytes> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.chunk().await? {
            buf.extend_from_slice(&chunk);
        }
        Ok(buf.freeze())
    }

    /// Copy the remaining body into `sink`, returning the number of bytes written.
    pub async fn copy_to<W>(mut self, sink: &mut W) -> DispatchResult<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut written = 0u64;
        while let Some(chunk) = self.chunk().await? {
            sink.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        sink.flush().await?;
        Ok(written)
    }

    /// Adapt into a `Stream` of chunks.
    pub fn into_stream(self) -> impl Stream<Item = DispatchResult<Bytes>> + Send {
        let host = self.host;
        let endpoint = self.endpoint;
        self.response.bytes_stream().map(move |chunk| {
            chunk.map_err(|source| DispatchError::Body {
                host: host.clone(),
                endpoint: endpoint.clone(),
                source,
            })
        })
    }

    fn body_error(&self, source: reqwest::Error) -> DispatchError {
        DispatchError::Body {
            host: self.host.clone(),
            endpoint: self.endpoint.clone(),
            source,
        }
    }
}
