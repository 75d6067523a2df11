use serde::{Deserialize, Serialize};

/// Generic API response envelope
///
/// Every JSON answer of the storefront backend, successful or not, is wrapped
/// in this shape. `success: false` is a failure even when the HTTP status is 2xx.
/// `data` is absent (or `null`) on failures and on endpoints without a payload.
///
/// # Examples
///
/// ```rust
/// use storefront_api::ApiEnvelope;
///
/// // Success envelope
/// let envelope = ApiEnvelope::success(200, "Products successfully fetch", vec![1, 2, 3]);
/// assert!(envelope.success);
///
/// // Failure envelope
/// let envelope: ApiEnvelope<()> = ApiEnvelope::failure(404, "Product not found");
/// assert!(envelope.data.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// Creates a successful envelope carrying data
    pub fn success(status: u16, message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            status,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Creates a failed envelope without data
    pub fn failure(status: u16, message: impl Into<String>) -> Self {
        Self {
            success: false,
            status,
            message: message.into(),
            data: None,
        }
    }

    // === Common status code constructors ===

    /// 200 OK with data
    pub fn ok(data: T) -> Self {
        Self::success(200, "OK", data)
    }

    /// 201 Created with data
    pub fn created(data: T) -> Self {
        Self::success(201, "Created", data)
    }

    /// Message to surface to a user, `None` when the backend left it empty
    pub fn message(&self) -> Option<&str> {
        let trimmed = self.message.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

impl ApiEnvelope<()> {
    /// 200 OK without payload (e.g. after a delete)
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            success: true,
            status: 200,
            message: message.into(),
            data: None,
        }
    }
}
