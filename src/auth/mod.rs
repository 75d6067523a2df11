//! Authentication session: who is signed in, and how that changes.

pub mod forms;
mod listeners;
pub mod manager;
pub mod service;
pub mod state;

pub use forms::{Credentials, RegistrationForm};
pub use listeners::Subscription;
pub use manager::SessionManager;
pub use service::AuthService;
pub use state::AuthState;
