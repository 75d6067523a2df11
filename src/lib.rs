//! Client side of the storefront REST backend: authentication session,
//! bearer-token HTTP client, route gating and product endpoints.
//!
//! ```no_run
//! use std::sync::Arc;
//! use storefront::auth::{Credentials, SessionManager};
//! use storefront::config::ClientConfig;
//! use storefront::http::ApiClient;
//! use storefront::routes::RouteGuard;
//! use storefront::storage::{FileStore, SessionStore};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = ClientConfig::from_env()?;
//! let store = SessionStore::new(Arc::new(FileStore::new(&config.session_file)));
//! let session = Arc::new(SessionManager::new(ApiClient::from_config(&config, store)?));
//! session.restore();
//!
//! session.login(&Credentials::new("ada@example.com", "secret1")).await?;
//! let decision = RouteGuard::new(session.clone()).check_path("/add-product");
//! println!("{decision:?}");
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod products;
pub mod routes;
pub mod storage;
pub mod validation;

#[cfg(test)]
mod testing;

pub use error::{ClientError, Result};
pub use storefront_api as api;
