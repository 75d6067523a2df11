//! Authorized access to the storefront REST API.

pub mod client;
pub mod request;
pub mod transport;

pub use client::{ApiClient, decode_envelope};
pub use request::{ApiRequest, FormPart, HttpRequest, Method, RawResponse, RequestBody};
pub use transport::{ReqwestTransport, Transport};
