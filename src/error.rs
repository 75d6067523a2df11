// src/error.rs

use crate::validation::{FormErrors, messages};

/// Generic fallback when a failed envelope carries no message
pub const GENERIC_FAILURE: &str = "Request failed";

#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    // === Erreurs HTTP ===
    #[error("HTTP error! status: {status}")]
    Transport {
        status: u16,
        message: Option<String>,
    },
    #[error("{message}")]
    Logical { message: String },

    // === Erreurs réseau / décodage ===
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid response: {0}")]
    Decode(String),

    // === Erreurs de session ===
    #[error("Session changed while signing in")]
    Superseded,

    // === Erreurs de validation ===
    #[error("Validation error: {0}")]
    Validation(FormErrors),
}

/// What the user was trying to do when an auth call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    Login,
    Register,
}

impl ClientError {
    /// HTTP status of a transport failure
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the backend rejected the bearer token (or its absence)
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status_code(), Some(401 | 403))
    }

    /// Message for product screens: the backend's own wording when it sent one
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Transport {
                message: Some(message),
                ..
            } => message.clone(),
            ClientError::Logical { message } => message.clone(),
            ClientError::Validation(errors) => errors.to_string(),
            _ => messages::GENERIC_ERROR.to_string(),
        }
    }

    /// Message for login/register screens.
    ///
    /// Backend wording is never shown here so that the answer does not reveal
    /// whether an account exists.
    pub fn auth_message(&self, action: AuthAction) -> String {
        match (self, action) {
            (ClientError::Validation(errors), _) => errors.to_string(),
            (ClientError::Network(_) | ClientError::Superseded, _) => {
                messages::GENERIC_ERROR.to_string()
            }
            (_, AuthAction::Login) => messages::LOGIN_FAILED.to_string(),
            (_, AuthAction::Register) => messages::REGISTER_FAILED.to_string(),
        }
    }

    // === Constructeurs helpers ===
    pub fn transport(status: u16, message: Option<String>) -> Self {
        ClientError::Transport { status, message }
    }

    pub fn logical(message: impl Into<String>) -> Self {
        ClientError::Logical {
            message: message.into(),
        }
    }

    pub fn network(msg: impl Into<String>) -> Self {
        ClientError::Network(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        ClientError::Decode(msg.into())
    }
}

// === Conversions automatiques depuis d'autres types d'erreurs ===

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::decode(err.to_string())
        } else {
            ClientError::network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::decode(format!("JSON error: {err}"))
    }
}

impl From<FormErrors> for ClientError {
    fn from(errors: FormErrors) -> Self {
        ClientError::Validation(errors)
    }
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
