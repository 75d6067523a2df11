//! # storefront-api
//!
//! Shared API types for the storefront backend contract.
//! This crate is WASM-compatible and holds only plain data: it can be used by
//! the native client in this repository as well as by a browser front end.
//!
//! ## Features
//!
//! - Request DTOs (`LoginRequest`, `RegisterRequest`, `ProductDraft`)
//! - Response DTOs (`UserProfile`, `AuthResponse`, `Product`)
//! - Error body format (`ErrorBody`)
//! - Generic response envelope (`ApiEnvelope`)
//!
//! ## Example
//!
//! ```rust
//! use storefront_api::LoginRequest;
//!
//! let request = LoginRequest {
//!     username: "user@example.com".to_string(),
//!     password: "password123".to_string(),
//! };
//! ```

pub mod error;
pub mod requests;
pub mod responses;
pub mod result;

// Re-exports for convenient access
pub use error::ErrorBody;
pub use requests::*;
pub use responses::*;
pub use result::ApiEnvelope;
