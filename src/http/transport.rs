use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use super::request::{FormPart, HttpRequest, Method, RawResponse, RequestBody};
use crate::error::Result;

/// Sends one prepared request and returns whatever came back.
///
/// Implementations must not retry and must not interpret the status: a 500 is
/// a successful send as far as the transport is concerned.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse>;
}

/// [`Transport`] over a pooled `reqwest` client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    fn multipart_form(parts: Vec<FormPart>) -> Result<Form> {
        let mut form = Form::new();
        for part in parts {
            form = match part {
                FormPart::Text {
                    name,
                    value,
                    content_type,
                } => {
                    let mut text = Part::text(value);
                    if let Some(content_type) = content_type {
                        text = text.mime_str(&content_type)?;
                    }
                    form.part(name, text)
                }
                FormPart::File {
                    name,
                    file_name,
                    content_type,
                    bytes,
                } => {
                    let file = Part::bytes(bytes)
                        .file_name(file_name)
                        .mime_str(&content_type)?;
                    form.part(name, file)
                }
            };
        }
        Ok(form)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let builder = match method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        }
        .headers(headers);

        let builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.body(serde_json::to_vec(&value)?),
            RequestBody::Multipart(parts) => builder.multipart(Self::multipart_form(parts)?),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(RawResponse { status, body })
    }
}
