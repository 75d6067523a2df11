use storefront_api::UserProfile;

/// Session state as seen by the rest of the application
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    /// Startup rehydration has not run yet
    #[default]
    Unknown,
    Anonymous,
    Authenticated(UserProfile),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, AuthState::Unknown)
    }

    pub fn user(&self) -> Option<&UserProfile> {
        match self {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user().is_some_and(UserProfile::is_admin)
    }

    pub fn label(&self) -> &'static str {
        match self {
            AuthState::Unknown => "unknown",
            AuthState::Anonymous => "anonymous",
            AuthState::Authenticated(_) => "authenticated",
        }
    }
}
