use std::sync::Arc;

use super::{Access, Route};
use crate::auth::{AuthState, SessionManager};

/// What to show for a requested route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session not rehydrated yet: neutral placeholder, nothing else
    Loading,
    Redirect(Route),
    Render(Route),
}

/// Gating decision for `route` under `state`.
///
/// UI gating only. The backend enforces the same rules on its side.
pub fn decide(state: &AuthState, route: Route) -> GuardDecision {
    match route.access() {
        Access::Public => GuardDecision::Render(route),
        access => match state {
            AuthState::Unknown => GuardDecision::Loading,
            AuthState::Anonymous => GuardDecision::Redirect(Route::LOGIN),
            AuthState::Authenticated(user) => {
                if access == Access::Admin && !user.is_admin() {
                    GuardDecision::Redirect(Route::DEFAULT)
                } else {
                    GuardDecision::Render(route)
                }
            }
        },
    }
}

/// Route gate reading the live session
#[derive(Debug, Clone)]
pub struct RouteGuard {
    session: Arc<SessionManager>,
}

impl RouteGuard {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    pub fn check(&self, route: Route) -> GuardDecision {
        let decision = decide(&self.session.state(), route);
        if let GuardDecision::Redirect(target) = &decision {
            tracing::debug!(%route, %target, "Route redirected");
        }
        decision
    }

    pub fn check_path(&self, path: &str) -> GuardDecision {
        self.check(Route::parse(path))
    }
}
