//! View lifetime tokens.
//!
//! Fetches are never cancelled once issued; a view that goes away simply
//! stops accepting their results. Completion handlers hold a
//! [`ScopeToken`] and check it before touching view state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Lifetime of one dashboard activation. Closed on drop.
#[derive(Debug)]
pub struct ViewScope {
    active: Arc<AtomicBool>,
}

impl ViewScope {
    /// Opens a new, active scope.
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Hands out a token tied to this scope.
    #[must_use]
    pub fn token(&self) -> ScopeToken {
        ScopeToken {
            active: Arc::clone(&self.active),
        }
    }

    /// Marks the scope torn down. Idempotent.
    pub fn close(&self) {
        self.active.store(false, Ordering::Release);
    }

    /// Returns `true` until [`ViewScope::close`] is called or the scope is
    /// dropped.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.close();
    }
}

/// Read-only handle on a [`ViewScope`].
#[derive(Debug, Clone)]
pub struct ScopeToken {
    active: Arc<AtomicBool>,
}

impl ScopeToken {
    /// Whether the owning view is still active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}
