//! Navigation guard.
//!
//! Evaluated synchronously before every screen transition, against route
//! metadata and the derived authentication status only - never the network.

use super::{Route, RouteName};

/// Outcome of a guard evaluation. There is no pending state: every
/// transition resolves to exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Let the transition proceed unchanged.
    Allow,
    /// Abort the transition and go to the named route instead.
    RedirectTo(RouteName),
}

/// Decide whether a transition to `target` may proceed.
///
/// Checks run in a fixed order: protected routes bounce unauthenticated
/// users to the login screen; the login screen bounces authenticated users
/// to the landing screen; everything else passes through.
pub fn decide(target: &Route, authenticated: bool) -> Decision {
    if target.requires_auth() && !authenticated {
        return Decision::RedirectTo(RouteName::Login);
    }
    if target.name == RouteName::Login && authenticated {
        return Decision::RedirectTo(RouteName::Dashboard);
    }
    Decision::Allow
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router;

    #[test]
    fn protected_route_redirects_unauthenticated_to_login() {
        let target = router::find(RouteName::Dashboard);
        assert_eq!(decide(target, false), Decision::RedirectTo(RouteName::Login));
    }

    #[test]
    fn login_redirects_authenticated_to_dashboard() {
        let target = router::find(RouteName::Login);
        assert_eq!(
            decide(target, true),
            Decision::RedirectTo(RouteName::Dashboard)
        );
    }

    #[test]
    fn public_route_allows_unauthenticated() {
        let target = router::find(RouteName::Login);
        assert_eq!(decide(target, false), Decision::Allow);
    }

    #[test]
    fn protected_route_allows_authenticated() {
        for name in [
            RouteName::Dashboard,
            RouteName::CredentialNew,
            RouteName::CredentialEdit,
            RouteName::Categories,
            RouteName::AuditLogs,
        ] {
            assert_eq!(decide(router::find(name), true), Decision::Allow);
        }
    }

    #[test]
    fn route_without_metadata_is_treated_as_public() {
        let target = Route {
            name: RouteName::Dashboard,
            requires_auth: None,
        };
        assert_eq!(decide(&target, false), Decision::Allow);
    }
}
