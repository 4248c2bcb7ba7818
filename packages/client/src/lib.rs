#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Client for the analytics and routing service.
//!
//! Dashboards depend on the [`AnalyticsService`] trait only. The
//! production implementation is [`HttpAnalyticsClient`], a thin `reqwest`
//! wrapper around the service's JSON endpoints. Every call is a single
//! attempt: the console never retries fetches or submissions on its own.

pub mod http;

use async_trait::async_trait;
use rural_health_surveillance_models::{
    CatalogEntry, DashboardStats, Inventory, RankingRecord, RouteResult, TestReport,
    VillageRecord,
};

pub use http::{ClientConfig, HttpAnalyticsClient};

/// Errors that can occur talking to the analytics service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request could not be sent or the body could not be read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Response status code.
        status: u16,
        /// Request URL.
        url: String,
    },

    /// The response body did not match the expected shape.
    #[error("Unexpected response from {url}: {source}")]
    Decode {
        /// Request URL.
        url: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// The client was configured with an unusable base URL.
    #[error("Invalid service URL: {message}")]
    InvalidUrl {
        /// Description of the problem.
        message: String,
    },
}

/// Operations the console consumes from the analytics service.
#[async_trait]
pub trait AnalyticsService: Send + Sync {
    /// Village risk records for the heatmap.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request or decoding fails.
    async fn fetch_heatmap(&self) -> Result<Vec<VillageRecord>, ClientError>;

    /// Priority ranking, already sorted by the service.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request or decoding fails.
    async fn fetch_ranking(&self) -> Result<Vec<RankingRecord>, ClientError>;

    /// Headline counters for the admin dashboard.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request or decoding fails.
    async fn fetch_stats(&self) -> Result<DashboardStats, ClientError>;

    /// Resource inventory. Served from a debug endpoint that may not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request or decoding fails.
    async fn fetch_inventory(&self) -> Result<Inventory, ClientError>;

    /// Village catalog for the report form.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request or decoding fails.
    async fn fetch_villages(&self) -> Result<Vec<CatalogEntry>, ClientError>;

    /// Disease catalog for the report form.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request or decoding fails.
    async fn fetch_diseases(&self) -> Result<Vec<CatalogEntry>, ClientError>;

    /// Asks the routing service for a route covering `batch_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request or decoding fails.
    async fn generate_route(&self, batch_id: i64) -> Result<RouteResult, ClientError>;

    /// Submits test reports. Only success or failure is reported back.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the service rejects the submission or
    /// cannot be reached.
    async fn submit_reports(&self, reports: &[TestReport]) -> Result<(), ClientError>;
}
