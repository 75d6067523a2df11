use serde::{Deserialize, Serialize};

// -------- REQUEST DTOs --------

/// Body of `POST /api/auth/login`. The backend keys accounts by email but
/// names the field `username`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    pub username: String,
    pub password: String, // Plain text
}

/// Body of `POST /api/auth/register`. There is no `confirmPassword` field:
/// confirmation is a form concern and never reaches the wire.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String, // Plain text
}

/// Writable product fields, sent on create and update.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub desc: String,
    pub brand: String,
    pub price: f64,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    pub available: bool,
    pub quality: i32,
}

impl ProductDraft {
    /// Quality score the storefront forms submit when the field is not edited.
    pub const DEFAULT_QUALITY: i32 = 95;
}
