//! Persisted session state.
//!
//! The session lives in a small key/value store (`role`, `userId`). The
//! [`SessionStore`] is the only writer: [`SessionStore::login`] writes both
//! keys together and [`SessionStore::logout`] clears the whole store, so a
//! reader never observes half a session. Readers either call
//! [`SessionStore::current`] (which re-reads the backend) or hold a
//! [`watch::Receiver`] from [`SessionStore::subscribe`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tokio::sync::watch;

use crate::{Role, SessionError};

/// Key holding the role name.
pub const ROLE_KEY: &str = "role";

/// Key holding the raw identifier.
pub const IDENTIFIER_KEY: &str = "userId";

/// The `(role, identifier)` pair established at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Role the session acts under.
    pub role: Role,
    /// Identifier entered at login. Only the credential rule inspects it.
    pub identifier: String,
}

impl Session {
    /// Identifier with everything after the role prefix hidden, for logs.
    #[must_use]
    pub fn masked_identifier(&self) -> String {
        let prefix = self.role.prefix();
        if self.identifier.starts_with(prefix) {
            format!("{prefix}***")
        } else {
            "***".to_string()
        }
    }

    fn to_entries(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (ROLE_KEY.to_string(), self.role.to_string()),
            (IDENTIFIER_KEY.to_string(), self.identifier.clone()),
        ])
    }

    /// Rebuilds a session from stored entries. Anything short of a known
    /// role plus an identifier counts as no session.
    fn from_entries(entries: &BTreeMap<String, String>) -> Option<Self> {
        let role = entries.get(ROLE_KEY)?;
        let identifier = entries.get(IDENTIFIER_KEY)?;

        match Role::parse(role) {
            Ok(role) => Some(Self {
                role,
                identifier: identifier.clone(),
            }),
            Err(e) => {
                log::warn!("Ignoring stored session: {e}");
                None
            }
        }
    }
}

/// Persistent string key/value storage for the session.
///
/// Implementations must make [`KeyValueBackend::replace`] and
/// [`KeyValueBackend::clear`] all-or-nothing.
pub trait KeyValueBackend: Send + Sync {
    /// Reads every stored entry. An empty store yields an empty map.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the store cannot be read or decoded.
    fn load(&self) -> Result<BTreeMap<String, String>, SessionError>;

    /// Replaces the whole store with `entries`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the store cannot be written.
    fn replace(&self, entries: &BTreeMap<String, String>) -> Result<(), SessionError>;

    /// Removes every entry. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the store cannot be cleared.
    fn clear(&self) -> Result<(), SessionError>;
}

/// Session entries kept in a TOML file on disk.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    /// Creates a backend writing to `path`. The file is created on first
    /// login.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the session file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueBackend for FileBackend {
    fn load(&self) -> Result<BTreeMap<String, String>, SessionError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(toml::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn replace(&self, entries: &BTreeMap<String, String>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        // Write-then-rename so a crash mid-write never leaves half a session.
        let tmp = self.path.with_extension("toml.tmp");
        std::fs::write(&tmp, toml::to_string(entries)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Session entries held in memory only.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryBackend {
    /// Creates a backend pre-populated with `entries`.
    #[must_use]
    pub const fn with_entries(entries: BTreeMap<String, String>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl KeyValueBackend for MemoryBackend {
    fn load(&self) -> Result<BTreeMap<String, String>, SessionError> {
        Ok(self.lock().clone())
    }

    fn replace(&self, entries: &BTreeMap<String, String>) -> Result<(), SessionError> {
        *self.lock() = entries.clone();
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        self.lock().clear();
        Ok(())
    }
}

/// Process-wide holder of the current session.
pub struct SessionStore {
    backend: Box<dyn KeyValueBackend>,
    tx: watch::Sender<Option<Session>>,
}

impl SessionStore {
    /// Opens the store, loading any persisted session.
    ///
    /// A backend that cannot be read opens as holding no session, so a
    /// corrupt session file can still be replaced by login or cleared by
    /// logout.
    pub fn open(backend: impl KeyValueBackend + 'static) -> Self {
        let session = match backend.load() {
            Ok(entries) => Session::from_entries(&entries),
            Err(e) => {
                log::warn!("Failed to read session store: {e}");
                None
            }
        };
        let (tx, _) = watch::channel(session);

        Self {
            backend: Box::new(backend),
            tx,
        }
    }

    /// Validates the credential and, if it passes, persists the session.
    ///
    /// A rejected credential leaves any existing session untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidCredential`] if the identifier lacks
    /// the role's prefix, or a storage error if persisting fails.
    pub fn login(&self, role: Role, identifier: &str) -> Result<Session, SessionError> {
        if !role.accepts(identifier) {
            log::info!("Rejected login attempt for role {role}");
            return Err(SessionError::InvalidCredential { role });
        }

        let session = Session {
            role,
            identifier: identifier.to_string(),
        };
        self.backend.replace(&session.to_entries())?;

        log::info!("Logged in as {role} ({})", session.masked_identifier());
        self.tx.send_replace(Some(session.clone()));
        Ok(session)
    }

    /// Clears the session. Calling this with no session is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the backend cannot be cleared.
    pub fn logout(&self) -> Result<(), SessionError> {
        self.backend.clear()?;
        if self.tx.send_replace(None).is_some() {
            log::info!("Logged out");
        }
        Ok(())
    }

    /// Reads the persisted session.
    ///
    /// The backend is re-read on every call so a logout made by another
    /// store instance is seen here too. A backend that cannot be read is
    /// treated as holding no session.
    #[must_use]
    pub fn current(&self) -> Option<Session> {
        let session = match self.backend.load() {
            Ok(entries) => Session::from_entries(&entries),
            Err(e) => {
                log::warn!("Failed to read session store: {e}");
                None
            }
        };

        self.tx.send_if_modified(|held| {
            if *held == session {
                false
            } else {
                held.clone_from(&session);
                true
            }
        });

        session
    }

    /// Subscribes to session changes made through this store.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.tx.subscribe()
    }
}
