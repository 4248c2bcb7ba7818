//! Roles and the credential prefix rule.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::SessionError;

/// The role a session acts under. Determines which dashboard it may open.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    /// District administrator: heatmap, ranking, inventory.
    Admin,
    /// Mobile unit driver: generated route.
    Driver,
    /// Medical officer: test report submission.
    Officer,
}

impl Role {
    /// All roles in login-selector order.
    pub const ALL: &[Self] = &[Self::Admin, Self::Driver, Self::Officer];

    /// The identifier prefix bound to this role.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Admin => "ADM-",
            Self::Driver => "DRV-",
            Self::Officer => "MED-",
        }
    }

    /// Human-readable label for the login selector.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Driver => "Driver",
            Self::Officer => "Medical Officer",
        }
    }

    /// Uppercase badge text shown in the navigation bar.
    #[must_use]
    pub fn badge(self) -> String {
        self.as_ref().to_uppercase()
    }

    /// Returns `true` if `identifier` carries this role's prefix.
    ///
    /// Case-sensitive and exact: `"adm-7"` is not an admin identifier.
    #[must_use]
    pub fn accepts(self, identifier: &str) -> bool {
        identifier.starts_with(self.prefix())
    }

    /// Parses a role name, mapping failures to [`SessionError::UnknownRole`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownRole`] if `value` is not a role name.
    pub fn parse(value: &str) -> Result<Self, SessionError> {
        value.parse().map_err(|_| SessionError::UnknownRole {
            value: value.to_string(),
        })
    }
}

/// Checks a raw `(role, identifier)` pair from the login form.
///
/// Returns `true` iff `role` names a known role and `identifier` starts
/// with that role's prefix. Unknown roles and empty identifiers yield
/// `false`; surfacing the rejection is the caller's job.
#[must_use]
pub fn validate(role: &str, identifier: &str) -> bool {
    role.parse::<Role>()
        .is_ok_and(|role| role.accepts(identifier))
}
