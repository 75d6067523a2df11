// src/auth/service.rs

use storefront_api::{AuthResponse, UserProfile};
use uuid::Uuid;

use super::forms::{Credentials, RegistrationForm};
use crate::error::Result;
use crate::http::{ApiClient, ApiRequest};

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const REGISTER_PATH: &str = "/api/auth/register";
pub const USERS_PATH: &str = "/api/users";

/// Calls to the authentication endpoints. Holds no state of its own: the
/// session is the [`SessionManager`](super::SessionManager)'s business.
#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Connexion d'un utilisateur
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse> {
        let request = ApiRequest::post(LOGIN_PATH)
            .json(&credentials.to_request())?
            .failure_message("Login failed");
        self.client.request(request).await
    }

    /// Inscription d'un nouvel utilisateur
    pub async fn register(&self, form: &RegistrationForm) -> Result<AuthResponse> {
        let request = ApiRequest::post(REGISTER_PATH)
            .json(&form.to_request())?
            .failure_message("Registration failed");
        self.client.request(request).await
    }

    /// Récupère un utilisateur par son ID (token requis)
    pub async fn fetch_user(&self, user_id: Uuid) -> Result<UserProfile> {
        let request = ApiRequest::get(format!("{USERS_PATH}/{user_id}"))
            .failure_message("Failed to fetch user");
        self.client.request(request).await
    }
}
