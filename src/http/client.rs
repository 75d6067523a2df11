use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use storefront_api::{ApiEnvelope, ErrorBody};

use super::request::{ApiRequest, HttpRequest, RawResponse};
use super::transport::{ReqwestTransport, Transport};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::storage::SessionStore;

/// HTTP client for the storefront API.
///
/// Every call goes through [`ApiClient::request`]: it attaches the bearer
/// token held by the [`SessionStore`], performs exactly one round trip and
/// unwraps the [`ApiEnvelope`]. No retries, no response caching.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn Transport>,
        session: SessionStore,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            transport,
            session,
        }
    }

    /// Client backed by `reqwest`, using the configured base URL and timeout
    pub fn from_config(config: &ClientConfig, session: SessionStore) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::new(
            config.api_base_url.clone(),
            Arc::new(transport),
            session,
        ))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Absolute URL for an API path
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Sends `request` and returns the envelope's `data`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Transport`] for a non-2xx status
    /// - [`ClientError::Logical`] for a 2xx envelope with `success: false`
    /// - [`ClientError::Network`] / [`ClientError::Decode`] when nothing usable came back
    pub async fn request<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let (prepared, failure_message) = self.prepare(request);
        tracing::debug!(
            method = prepared.method.as_str(),
            url = %prepared.url,
            authorized = prepared.headers.contains_key(AUTHORIZATION),
            "API request"
        );

        let response = self
            .transport
            .send(prepared)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "API Error"))?;

        decode_envelope(&response, &failure_message)
            .inspect_err(|e| tracing::debug!(status = response.status, error = %e, "API call failed"))
    }

    /// Builds the outgoing request. Header precedence: computed defaults,
    /// then caller headers, then the bearer token when one is stored.
    fn prepare(&self, request: ApiRequest) -> (HttpRequest, String) {
        let (method, path, caller_headers, body, failure_message) = request.into_parts();

        let mut headers = HeaderMap::new();
        if let Some(content_type) = body.default_content_type() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        for (name, value) in &caller_headers {
            headers.insert(name.clone(), value.clone());
        }
        if let Some(token) = self.session.read_token() {
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => tracing::warn!("Stored token is not a valid header value, dropping it"),
            }
        }

        let prepared = HttpRequest {
            method,
            url: self.url(&path),
            headers,
            body,
        };
        (prepared, failure_message)
    }
}

/// Turns a raw answer into the envelope's `data`.
///
/// The envelope is read as untyped JSON first so that a failed envelope with
/// `data: null` is reported as a logical failure, not as a decode error.
pub fn decode_envelope<T: DeserializeOwned>(
    response: &RawResponse,
    failure_message: &str,
) -> Result<T> {
    if !response.is_success() {
        let message = ErrorBody::parse(&response.body).and_then(ErrorBody::into_message);
        return Err(ClientError::transport(response.status, message));
    }

    let envelope: ApiEnvelope<serde_json::Value> = serde_json::from_slice(&response.body)?;
    if !envelope.success {
        let message = envelope.message().unwrap_or(failure_message).to_string();
        return Err(ClientError::logical(message));
    }

    let data = envelope.data.unwrap_or(serde_json::Value::Null);
    serde_json::from_value(data).map_err(ClientError::from)
}
