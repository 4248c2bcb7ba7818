//! Per-source view model slots and the failure policy applied to them.

use std::future::Future;

use rural_health_client::ClientError;
use strum_macros::{AsRefStr, Display};

/// State of one data source within a view model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot<T> {
    /// Fetch issued, no answer yet.
    Pending,
    /// Fetch completed.
    Ready(T),
    /// A required fetch failed. Carries the message to show in place of
    /// the data.
    Failed(String),
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::Pending
    }
}

impl<T> Slot<T> {
    /// `true` while the fetch is outstanding.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// `true` once the fetch has completed either way.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        !self.is_pending()
    }

    /// The fetched value, if any.
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Pending | Self::Failed(_) => None,
        }
    }

    /// The visible error, if this slot failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            Self::Pending | Self::Ready(_) => None,
        }
    }
}

impl<T: Clone + Default> Slot<T> {
    /// The fetched value, or the slot's default while pending or failed.
    #[must_use]
    pub fn value_or_default(&self) -> T {
        self.value().cloned().unwrap_or_default()
    }
}

/// How a source's failure is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum SourcePolicy {
    /// Failure is shown on the slot; the slot keeps its default value.
    Required,
    /// Failure is swallowed; the slot settles to its default with no
    /// visible trace.
    Optional,
}

impl SourcePolicy {
    /// Awaits `fetch` and settles it into a [`Slot`] under this policy.
    pub async fn settle<T, F>(self, source: &'static str, fetch: F) -> Slot<T>
    where
        T: Default,
        F: Future<Output = Result<T, ClientError>>,
    {
        match self {
            Self::Required => required(source, fetch).await,
            Self::Optional => optional(source, fetch).await,
        }
    }
}

/// Awaits a required source and settles it into a [`Slot`].
pub async fn required<T, F>(source: &'static str, fetch: F) -> Slot<T>
where
    F: Future<Output = Result<T, ClientError>>,
{
    match fetch.await {
        Ok(value) => {
            log::debug!("Source {source} loaded");
            Slot::Ready(value)
        }
        Err(e) => {
            log::warn!("Source {source} failed: {e}");
            Slot::Failed(format!("Failed to load {source}"))
        }
    }
}

/// Awaits an optional source and settles it into a [`Slot`], replacing a
/// failure with the default value.
pub async fn optional<T, F>(source: &'static str, fetch: F) -> Slot<T>
where
    T: Default,
    F: Future<Output = Result<T, ClientError>>,
{
    match fetch.await {
        Ok(value) => {
            log::debug!("Source {source} loaded");
            Slot::Ready(value)
        }
        Err(e) => {
            log::debug!("Optional source {source} unavailable: {e}");
            Slot::Ready(T::default())
        }
    }
}
