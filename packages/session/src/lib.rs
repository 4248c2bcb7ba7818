#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Session handling for the rural health console.
//!
//! A session is the `(role, identifier)` pair established at login and
//! persisted locally until logout. This crate provides:
//!
//! - [`validate`]: the identifier prefix rule for each [`Role`]
//! - [`SessionStore`]: the single write path for the persisted session,
//!   with a `watch` subscription for readers
//! - [`authorize`]: the pure guard deciding whether a protected
//!   [`Route`] may render for the current session

pub mod guard;
pub mod role;
pub mod store;

pub use guard::{Authorization, Route, authorize, authorize_route};
pub use role::{Role, validate};
pub use store::{FileBackend, KeyValueBackend, MemoryBackend, Session, SessionStore};

/// Errors that can occur while reading or writing the session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Reading or writing the session file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The session file is not valid TOML.
    #[error("Session decode error: {0}")]
    Decode(#[from] toml::de::Error),

    /// The session could not be encoded.
    #[error("Session encode error: {0}")]
    Encode(#[from] toml::ser::Error),

    /// The identifier does not carry the prefix bound to the role.
    #[error("Invalid ID format for selected role")]
    InvalidCredential {
        /// The role the user selected.
        role: Role,
    },

    /// A role name outside `admin`, `driver`, `officer`.
    #[error("Unknown role: {value}")]
    UnknownRole {
        /// The unrecognised value.
        value: String,
    },
}
