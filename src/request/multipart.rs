//! Multipart form bodies.
//!
//! A `reqwest::multipart::Form` is consumed when sent, so the body is kept
//! as plain parts and a fresh form is built for every attempt. This lets
//! failover resend the same upload to the next host.

use std::path::Path;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};

use crate::error::{DispatchError, DispatchResult};

#[derive(Debug, Clone)]
enum Content {
    Text(String),
    Bytes(Bytes),
}

/// One named part of a multipart body.
#[derive(Debug, Clone)]
pub struct MultipartPart {
    name: String,
    content: Content,
    file_name: Option<String>,
    mime: Option<String>,
}

impl MultipartPart {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn size(&self) -> usize {
        match &self.content {
            Content::Text(t) => t.len(),
            Content::Bytes(b) => b.len(),
        }
    }

    fn to_part(&self) -> DispatchResult<Part> {
        let mut part = match &self.content {
            Content::Text(t) => Part::text(t.clone()),
            Content::Bytes(b) => Part::bytes(b.to_vec()),
        };
        if let Some(file_name) = &self.file_name {
            part = part.file_name(file_name.clone());
        }
        if let Some(mime) = &self.mime {
            part = part.mime_str(mime).map_err(|e| {
                let reason = format!("mime type '{}' for part '{}': {}", mime, self.name, e);
                DispatchError::InvalidRequest(reason)
            })?;
        }
        Ok(part)
    }
}

/// Ordered set of parts sent as `multipart/form-data`.
#[derive(Debug, Clone, Default)]
pub struct MultipartBody {
    parts: Vec<MultipartPart>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plain text field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(MultipartPart {
            name: name.into(),
            content: Content::Text(value.into()),
            file_name: None,
            mime: None,
        });
        self
    }

    /// Add a raw binary field.
    pub fn bytes(mut self, name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.parts.push(MultipartPart {
            name: name.into(),
            content: Content::Bytes(data.into()),
            file_name: None,
            mime: None,
        });
        self
    }

    /// Add a file field with its file name and optional mime type.
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        data: impl Into<Bytes>,
        mime: Option<&str>,
    ) -> Self {
        self.parts.push(MultipartPart {
            name: name.into(),
            content: Content::Bytes(data.into()),
            file_name: Some(file_name.into()),
            mime: mime.map(str::to_string),
        });
        self
    }

    /// Read `path` and add it as a file field named `name`.
    pub async fn file_from_path(
        self,
        name: impl Into<String>,
        path: &Path,
    ) -> std::io::Result<Self> {
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(self.file(name, file_name, data, None))
    }

    pub fn parts(&self) -> &[MultipartPart] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Fresh form for one attempt.
    pub fn to_form(&self) -> DispatchResult<Form> {
        let mut form = Form::new();
        for part in &self.parts {
            form = form.part(part.name.clone(), part.to_part()?);
        }
        Ok(form)
    }

    /// Part names and sizes, used for diagnostics instead of the raw content.
    pub fn describe(&self) -> Value {
        Value::Array(
            self.parts
                .iter()
                .map(|p| json!({ "name": p.name, "file_name": p.file_name, "size": p.size() }))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_lists_parts_without_content() {
        let body = MultipartBody::new()
            .text("title", "quarterly report")
            .file("doc", "report.pdf", vec![0u8; 128], Some("application/pdf"));
        assert_eq!(body.len(), 2);
        assert_eq!(
            body.describe(),
            json!([
                { "name": "title", "file_name": null, "size": 16 },
                { "name": "doc", "file_name": "report.pdf", "size": 128 },
            ])
        );
    }

    #[test]
    fn test_form_can_be_built_repeatedly() {
        let body = MultipartBody::new().bytes("blob", Bytes::from_static(b"abc"));
        assert!(body.to_form().is_ok());
        assert!(body.to_form().is_ok());
    }

    #[test]
    fn test_bad_mime_is_invalid_request() {
        let body = MultipartBody::new().file("f", "a.bin", vec![1, 2, 3], Some("not a mime"));
        let err = body.to_form().unwrap_err();
        assert!(matches!(err, DispatchError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_file_from_missing_path() {
        let result = MultipartBody::new()
            .file_from_path("f", Path::new("/definitely/not/here.bin"))
            .await;
        assert!(result.is_err());
    }
}
