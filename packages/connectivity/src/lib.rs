#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Online/offline tracking for the console.
//!
//! [`ConnectivityTracker`] holds the single current [`ConnectivityState`].
//! Its only write path is [`ConnectivityTracker::handle_signal`], driven by
//! network status events; views read it through a `watch` subscription
//! and use it purely as a display flag. Nothing here gates fetches.

pub mod probe;
pub mod signals;

use std::sync::Arc;

use futures::{Stream, StreamExt as _};
use strum_macros::{AsRefStr, Display, EnumString, IntoStaticStr};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Whether the network is currently reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ConnectivityState {
    /// Network reachable.
    Online,
    /// Network unreachable.
    Offline,
}

impl ConnectivityState {
    /// Returns `true` when online.
    #[must_use]
    pub const fn is_online(self) -> bool {
        matches!(self, Self::Online)
    }

    /// Status badge text shown on every dashboard.
    #[must_use]
    pub const fn badge(self) -> &'static str {
        match self {
            Self::Online => "Online Mode",
            Self::Offline => "Offline Mode",
        }
    }

    /// Style class applied to the dashboard container.
    #[must_use]
    pub fn css_class(self) -> &'static str {
        self.into()
    }
}

/// A low-level network status event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum NetworkSignal {
    /// The platform reports the network as up.
    #[strum(serialize = "online", serialize = "connected", serialize = "up")]
    Online,
    /// The platform reports the network as down.
    #[strum(serialize = "offline", serialize = "disconnected", serialize = "down")]
    Offline,
}

impl From<NetworkSignal> for ConnectivityState {
    fn from(signal: NetworkSignal) -> Self {
        match signal {
            NetworkSignal::Online => Self::Online,
            NetworkSignal::Offline => Self::Offline,
        }
    }
}

/// Process-wide holder of the current connectivity state.
#[derive(Debug)]
pub struct ConnectivityTracker {
    tx: watch::Sender<ConnectivityState>,
}

impl ConnectivityTracker {
    /// Creates a tracker seeded with the platform's reachability at startup.
    #[must_use]
    pub fn new(initial: ConnectivityState) -> Self {
        log::debug!("Connectivity starts {initial}");
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    /// The current state.
    #[must_use]
    pub fn current(&self) -> ConnectivityState {
        *self.tx.borrow()
    }

    /// Applies a network event. Returns `true` if the state changed.
    ///
    /// Repeating the current state is a no-op and does not wake
    /// subscribers.
    pub fn handle_signal(&self, signal: NetworkSignal) -> bool {
        let next = ConnectivityState::from(signal);
        self.tx.send_if_modified(|state| {
            if *state == next {
                return false;
            }
            log::info!("Connectivity changed: {state} -> {next}");
            *state = next;
            true
        })
    }

    /// Subscribes to state changes. Dropping the receiver deregisters it.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ConnectivityState> {
        self.tx.subscribe()
    }

    /// Feeds every signal from `signals` into the tracker on a background
    /// task.
    ///
    /// The registration lasts as long as the returned [`SignalListener`];
    /// dropping it stops the task.
    pub fn listen<S>(self: &Arc<Self>, signals: S) -> SignalListener
    where
        S: Stream<Item = NetworkSignal> + Send + 'static,
    {
        let tracker = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut signals = std::pin::pin!(signals);
            while let Some(signal) = signals.next().await {
                tracker.handle_signal(signal);
            }
            log::debug!("Network signal source ended");
        });

        SignalListener {
            handle: Some(handle),
        }
    }
}

/// Scoped registration of a network signal source.
///
/// Dropping the listener aborts the task feeding the tracker, so a torn
/// down view never leaves a listener behind.
#[derive(Debug)]
pub struct SignalListener {
    handle: Option<JoinHandle<()>>,
}

impl SignalListener {
    /// Waits for the signal source to end on its own.
    pub async fn finished(mut self) {
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
            && !e.is_cancelled()
        {
            log::warn!("Network signal listener failed: {e}");
        }
    }
}

impl Drop for SignalListener {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
