use storefront_api::{LoginRequest, RegisterRequest};

/// Login form input. Transient: never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Wire body of the login call: the email goes out as `username`,
    /// trimmed and lower-cased.
    pub fn to_request(&self) -> LoginRequest {
        LoginRequest {
            username: sanitize_email(&self.email),
            password: self.password.clone(),
        }
    }
}

/// Registration form state, confirmation field included
#[derive(Clone, PartialEq, Eq, Default)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationForm {
    /// Wire body of the register call. `confirm_password` stays behind.
    pub fn to_request(&self) -> RegisterRequest {
        RegisterRequest {
            name: self.name.trim().to_string(),
            email: sanitize_email(&self.email),
            username: self.username.trim().to_string(),
            password: self.password.clone(),
        }
    }

    pub fn passwords_match(&self) -> bool {
        !self.password.is_empty() && self.password == self.confirm_password
    }
}

pub fn sanitize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// Passwords stay out of logs and panic messages
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl std::fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"***")
            .field("confirm_password", &"***")
            .finish()
    }
}
