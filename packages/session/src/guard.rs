//! Route table and the authorization guard for protected views.

use std::fmt;

use crate::{Role, Session};

/// A navigable view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// The login entry point.
    Login,
    /// Admin control panel.
    Admin,
    /// Driver mission dashboard.
    Driver,
    /// Medical officer report form.
    Officer,
}

impl Route {
    /// The dashboard a role lands on after login.
    #[must_use]
    pub const fn for_role(role: Role) -> Self {
        match role {
            Role::Admin => Self::Admin,
            Role::Driver => Self::Driver,
            Role::Officer => Self::Officer,
        }
    }

    /// The role a session needs to open this route, or `None` for the
    /// unprotected login view.
    #[must_use]
    pub const fn required_role(self) -> Option<Role> {
        match self {
            Self::Login => None,
            Self::Admin => Some(Role::Admin),
            Self::Driver => Some(Role::Driver),
            Self::Officer => Some(Role::Officer),
        }
    }

    /// URL-style path for this route.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/",
            Self::Admin => "/admin",
            Self::Driver => "/driver",
            Self::Officer => "/officer",
        }
    }

    /// Resolves a path back to a route.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        [Self::Login, Self::Admin, Self::Driver, Self::Officer]
            .into_iter()
            .find(|route| route.path() == path)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Outcome of a guard decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    /// The protected view may render.
    Allow,
    /// Send the user to another route instead (always the login view).
    Redirect(Route),
}

impl Authorization {
    /// Returns `true` for [`Authorization::Allow`].
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Decides whether a view requiring `required` may render for `session`.
///
/// Pure: the caller reads the session store once per decision and calls
/// this on every navigation to a protected view. The decision must not be
/// cached, so a logout elsewhere takes effect on the next render.
#[must_use]
pub fn authorize(session: Option<&Session>, required: Role) -> Authorization {
    match session {
        Some(session) if session.role == required => Authorization::Allow,
        _ => Authorization::Redirect(Route::Login),
    }
}

/// Guard decision for an arbitrary route. The login route is always
/// allowed.
#[must_use]
pub fn authorize_route(session: Option<&Session>, route: Route) -> Authorization {
    route
        .required_role()
        .map_or(Authorization::Allow, |role| authorize(session, role))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: Role) -> Session {
        Session {
            role,
            identifier: format!("{}1", role.prefix()),
        }
    }

    #[test]
    fn allows_only_matching_role() {
        for held in Role::ALL {
            for required in Role::ALL {
                let decision = authorize(Some(&session(*held)), *required);
                if held == required {
                    assert_eq!(decision, Authorization::Allow);
                } else {
                    assert_eq!(decision, Authorization::Redirect(Route::Login));
                }
            }
        }
    }

    #[test]
    fn absent_session_redirects() {
        for required in Role::ALL {
            assert_eq!(
                authorize(None, *required),
                Authorization::Redirect(Route::Login)
            );
        }
    }

    #[test]
    fn identifier_is_opaque_to_guard() {
        let odd = Session {
            role: Role::Driver,
            identifier: "whatever".to_string(),
        };
        assert!(authorize(Some(&odd), Role::Driver).is_allowed());
    }

    #[test]
    fn login_route_is_unprotected() {
        assert!(authorize_route(None, Route::Login).is_allowed());
        assert!(!authorize_route(None, Route::Officer).is_allowed());
    }

    #[test]
    fn paths_round_trip() {
        for role in Role::ALL {
            let route = Route::for_role(*role);
            assert_eq!(Route::from_path(route.path()), Some(route));
            assert_eq!(route.required_role(), Some(*role));
        }
        assert_eq!(Route::from_path("/"), Some(Route::Login));
        assert_eq!(Route::from_path("/nowhere"), None);
    }
}
