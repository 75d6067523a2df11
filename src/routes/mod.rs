//! Application routes and the gate in front of them.

pub mod guard;

pub use guard::{GuardDecision, RouteGuard, decide};

use std::fmt;

/// Who may see a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    /// Authenticated with the `ADMIN` role
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Register,
    ProductDetail(i64),
    AddProduct,
    EditProduct(i64),
}

impl Route {
    /// Landing view; also where role-gated redirects go
    pub const DEFAULT: Route = Route::Home;
    /// Login entry point for anonymous visitors
    pub const LOGIN: Route = Route::Login;

    /// Maps a location path to a route. Anything unrecognised falls back to
    /// [`Route::Home`], like a catch-all.
    pub fn parse(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["add-product"] => Route::AddProduct,
            ["products", id] => id.parse().map_or(Route::Home, Route::ProductDetail),
            ["products", id, "edit"] => id.parse().map_or(Route::Home, Route::EditProduct),
            _ => Route::Home,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::ProductDetail(id) => format!("/products/{id}"),
            Route::AddProduct => "/add-product".to_string(),
            Route::EditProduct(id) => format!("/products/{id}/edit"),
        }
    }

    pub fn access(&self) -> Access {
        match self {
            Route::Login | Route::Register => Access::Public,
            Route::Home | Route::ProductDetail(_) => Access::Authenticated,
            Route::AddProduct | Route::EditProduct(_) => Access::Admin,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
