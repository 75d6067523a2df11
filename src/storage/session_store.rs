use std::sync::Arc;

use reqwest::header::HeaderValue;
use storefront_api::UserProfile;

use super::{KeyValueStore, MemoryStore};

/// Key of the bearer token entry
pub const TOKEN_KEY: &str = "ecommerce_token";
/// Key of the JSON-serialized user profile entry
pub const USER_KEY: &str = "ecommerce_user";

/// Persistent half of the session: the bearer token and the cached profile.
///
/// Every operation is best effort. Read failures (including an entry that no
/// longer decodes) come back as `None`, write failures are logged and
/// dropped. Nothing here touches the network.
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Stored bearer token. A token that could not be sent in an
    /// `Authorization` header counts as a corrupted entry.
    pub fn read_token(&self) -> Option<String> {
        let token = match self.backend.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.trim().is_empty())?,
            Err(e) => {
                tracing::error!(error = %e, "Error reading token from storage");
                return None;
            }
        };
        if !is_sendable(&token) {
            tracing::warn!("Ignoring stored token that is not a valid header value");
            return None;
        }
        Some(token)
    }

    pub fn read_user(&self) -> Option<UserProfile> {
        let raw = match self.backend.get(USER_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::error!(error = %e, "Error reading user from storage");
                return None;
            }
        };
        serde_json::from_str(&raw)
            .inspect_err(|e| tracing::warn!(error = %e, "Ignoring undecodable cached user"))
            .ok()
    }

    /// Token and profile together, or nothing: half a session is no session.
    pub fn read_session(&self) -> Option<(String, UserProfile)> {
        let token = self.read_token();
        let user = self.read_user();
        match (token, user) {
            (Some(token), Some(user)) => Some((token, user)),
            (None, None) => None,
            (token, _) => {
                tracing::debug!(
                    has_token = token.is_some(),
                    "Incomplete persisted session, treating as anonymous"
                );
                None
            }
        }
    }

    pub fn write_token(&self, token: &str) {
        if let Err(e) = self.backend.set(TOKEN_KEY, token) {
            tracing::warn!(error = %e, "Error saving token to storage");
        }
    }

    pub fn write_user(&self, user: &UserProfile) {
        let json = match serde_json::to_string(user) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "Error serializing user for storage");
                return;
            }
        };
        if let Err(e) = self.backend.set(USER_KEY, &json) {
            tracing::warn!(error = %e, "Error saving user to storage");
        }
    }

    /// Removes both entries. A failed removal does not stop the other one.
    pub fn clear(&self) {
        for key in [USER_KEY, TOKEN_KEY] {
            if let Err(e) = self.backend.remove(key) {
                tracing::warn!(key, error = %e, "Error removing entry from storage");
            }
        }
    }
}

fn is_sendable(token: &str) -> bool {
    HeaderValue::from_str(&format!("Bearer {token}")).is_ok()
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}
