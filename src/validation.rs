//! Client-side validation of the login and registration forms.
//!
//! These checks only spare the backend obviously bad input; the backend
//! remains the authority.

use std::collections::BTreeMap;
use std::fmt;

use crate::auth::forms::{Credentials, RegistrationForm};

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_PASSWORD_LENGTH: usize = 128;
pub const MIN_NAME_LENGTH: usize = 2;
pub const MAX_NAME_LENGTH: usize = 100;
pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 30;

pub mod messages {
    pub const EMAIL_REQUIRED: &str = "Email is required";
    pub const EMAIL_INVALID: &str = "Please enter a valid email address";
    pub const PASSWORD_REQUIRED: &str = "Password is required";
    pub const PASSWORD_MIN_LENGTH: &str = "Password must be at least 6 characters";
    pub const PASSWORD_MAX_LENGTH: &str = "Password must be at most 128 characters";
    pub const PASSWORD_MISMATCH: &str = "Passwords do not match";
    pub const NAME_REQUIRED: &str = "Name is required";
    pub const NAME_MIN_LENGTH: &str = "Name must be at least 2 characters";
    pub const NAME_MAX_LENGTH: &str = "Name must be at most 100 characters";
    pub const USERNAME_REQUIRED: &str = "Username is required";
    pub const USERNAME_MIN_LENGTH: &str = "Username must be at least 3 characters";
    pub const USERNAME_MAX_LENGTH: &str = "Username must be at most 30 characters";
    pub const USERNAME_INVALID: &str =
        "Username can only contain letters, numbers, and underscores";

    pub const LOGIN_FAILED: &str = "Invalid email or password";
    pub const REGISTER_FAILED: &str = "Registration failed. Email or username may already be in use";
    pub const GENERIC_ERROR: &str = "An error occurred. Please try again";
}

/// Field name → first error found for that field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<&'static str, &'static str>);

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.0.get(field).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn insert(&mut self, field: &'static str, message: &'static str) {
        self.0.entry(field).or_insert(message);
    }

    /// `Ok(())` when no field failed
    pub fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Same shape as `^[^\s@]+@[^\s@]+\.[^\s@]+$`
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
}

fn is_valid_username(username: &str) -> bool {
    username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn validate_login(credentials: &Credentials) -> FormErrors {
    let mut errors = FormErrors::default();

    if credentials.email.trim().is_empty() {
        errors.insert("email", messages::EMAIL_REQUIRED);
    } else if !is_valid_email(&credentials.email) {
        errors.insert("email", messages::EMAIL_INVALID);
    }

    if credentials.password.is_empty() {
        errors.insert("password", messages::PASSWORD_REQUIRED);
    }

    errors
}

pub fn validate_registration(form: &RegistrationForm) -> FormErrors {
    let mut errors = FormErrors::default();

    let name_len = form.name.trim().chars().count();
    if name_len == 0 {
        errors.insert("name", messages::NAME_REQUIRED);
    } else if name_len < MIN_NAME_LENGTH {
        errors.insert("name", messages::NAME_MIN_LENGTH);
    } else if name_len > MAX_NAME_LENGTH {
        errors.insert("name", messages::NAME_MAX_LENGTH);
    }

    if form.email.trim().is_empty() {
        errors.insert("email", messages::EMAIL_REQUIRED);
    } else if !is_valid_email(&form.email) {
        errors.insert("email", messages::EMAIL_INVALID);
    }

    let username_len = form.username.chars().count();
    if username_len == 0 {
        errors.insert("username", messages::USERNAME_REQUIRED);
    } else if username_len < MIN_USERNAME_LENGTH {
        errors.insert("username", messages::USERNAME_MIN_LENGTH);
    } else if username_len > MAX_USERNAME_LENGTH {
        errors.insert("username", messages::USERNAME_MAX_LENGTH);
    } else if !is_valid_username(&form.username) {
        errors.insert("username", messages::USERNAME_INVALID);
    }

    if form.password.is_empty() {
        errors.insert("password", messages::PASSWORD_REQUIRED);
    } else if !is_valid_password(&form.password) {
        errors.insert("password", messages::PASSWORD_MIN_LENGTH);
    } else if form.password.chars().count() > MAX_PASSWORD_LENGTH {
        errors.insert("password", messages::PASSWORD_MAX_LENGTH);
    }

    if form.password != form.confirm_password {
        errors.insert("confirmPassword", messages::PASSWORD_MISMATCH);
    }

    errors
}
