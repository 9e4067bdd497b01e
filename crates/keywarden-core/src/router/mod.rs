//! Screen routing for the client.
//!
//! Routes are a static table defined at startup; each entry carries the
//! access-control metadata the navigation guard consumes. The guard itself
//! (`guard::decide`) is a pure function - callers apply its decision.

pub mod guard;

pub use guard::{decide, Decision};

/// Every screen the client can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteName {
    Login,
    Dashboard,
    CredentialNew,
    CredentialEdit,
    Categories,
    AuditLogs,
}

impl RouteName {
    /// Display title for the screen header.
    pub fn title(&self) -> &'static str {
        match self {
            RouteName::Login => "Login",
            RouteName::Dashboard => "Credentials",
            RouteName::CredentialNew => "New Credential",
            RouteName::CredentialEdit => "Edit Credential",
            RouteName::Categories => "Categories",
            RouteName::AuditLogs => "Audit Log",
        }
    }
}

/// A route table entry. `requires_auth` is optional metadata: a route that
/// declares nothing is publicly accessible.
#[derive(Debug, Clone, Copy)]
pub struct Route {
    pub name: RouteName,
    pub requires_auth: Option<bool>,
}

impl Route {
    pub fn requires_auth(&self) -> bool {
        self.requires_auth.unwrap_or(false)
    }
}

/// The static route table, mirroring the screens the client offers.
pub const ROUTES: [Route; 6] = [
    Route {
        name: RouteName::Login,
        requires_auth: Some(false),
    },
    Route {
        name: RouteName::Dashboard,
        requires_auth: Some(true),
    },
    Route {
        name: RouteName::CredentialNew,
        requires_auth: Some(true),
    },
    Route {
        name: RouteName::CredentialEdit,
        requires_auth: Some(true),
    },
    Route {
        name: RouteName::Categories,
        requires_auth: Some(true),
    },
    Route {
        name: RouteName::AuditLogs,
        requires_auth: Some(true),
    },
];

/// Look up a route table entry by name.
pub fn find(name: RouteName) -> &'static Route {
    match name {
        RouteName::Login => &ROUTES[0],
        RouteName::Dashboard => &ROUTES[1],
        RouteName::CredentialNew => &ROUTES[2],
        RouteName::CredentialEdit => &ROUTES[3],
        RouteName::Categories => &ROUTES[4],
        RouteName::AuditLogs => &ROUTES[5],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_returns_matching_entry_for_every_name() {
        for route in &ROUTES {
            assert_eq!(find(route.name).name, route.name);
        }
    }

    #[test]
    fn only_login_is_public() {
        for route in &ROUTES {
            if route.name == RouteName::Login {
                assert!(!route.requires_auth());
            } else {
                assert!(route.requires_auth());
            }
        }
    }
}
