//! `reqwest` implementation of [`AnalyticsService`].
//!
//! Requests are sent exactly once. Non-2xx responses become
//! [`ClientError::Status`]; bodies that fail to decode are logged with a
//! short preview before becoming [`ClientError::Decode`].

use std::time::Duration;

use async_trait::async_trait;
use rural_health_surveillance_models::{
    CatalogEntry, DashboardStats, Inventory, RankingRecord, RouteResult, TestReport,
    VillageRecord,
};
use serde::de::DeserializeOwned;

use crate::{AnalyticsService, ClientError};

/// Default analytics service address.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 500;

const HEATMAP_PATH: &str = "/admin/heatmap";
const RANKING_PATH: &str = "/admin/priority-ranking";
const STATS_PATH: &str = "/admin/dashboard";
const INVENTORY_PATH: &str = "/debug/inventory";
const VILLAGES_PATH: &str = "/villages";
const DISEASES_PATH: &str = "/diseases";
const INGEST_PATH: &str = "/ingest";

/// Connection settings for [`HttpAnalyticsClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service root, e.g. `http://127.0.0.1:8000`.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// HTTP client for the analytics service.
#[derive(Debug, Clone)]
pub struct HttpAnalyticsClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAnalyticsClient {
    /// Builds a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if the base URL is not an
    /// `http(s)` URL, or [`ClientError::Http`] if the TLS backend cannot be
    /// initialised.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidUrl {
                message: format!("expected http:// or https://, got {:?}", config.base_url),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client, base_url })
    }

    /// The normalised service root.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `host:port` of the service, for the startup reachability probe.
    #[must_use]
    pub fn authority(&self) -> String {
        let (scheme, rest) = self
            .base_url
            .split_once("://")
            .unwrap_or(("http", self.base_url.as_str()));
        let host = rest.split('/').next().unwrap_or(rest);

        if host.contains(':') && !host.ends_with(']') {
            host.to_string()
        } else if scheme == "https" {
            format!("{host}:443")
        } else {
            format!("{host}:80")
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.url(path);
        log::debug!("GET {url}");
        let response = self.client.get(&url).send().await?;
        decode_json(check_status(response)?).await
    }
}

/// Fails non-success responses with [`ClientError::Status`].
fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ClientError::Status {
            status: status.as_u16(),
            url: response.url().to_string(),
        })
    }
}

/// Reads the body as text, then decodes it, so a malformed body can be
/// logged before it is discarded.
async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let url = response.url().to_string();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|source| {
        log::error!(
            "Failed to decode response.\n  \
             url: {url}\n  \
             content-type: {content_type:?}\n  \
             received: {} bytes\n  \
             error: {source}\n  \
             body preview: {}",
            text.len(),
            preview(&text),
        );
        ClientError::Decode { url, source }
    })
}

fn preview(text: &str) -> String {
    if text.len() <= BODY_PREVIEW_LEN {
        return text.to_string();
    }
    let mut end = BODY_PREVIEW_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[async_trait]
impl AnalyticsService for HttpAnalyticsClient {
    async fn fetch_heatmap(&self) -> Result<Vec<VillageRecord>, ClientError> {
        self.get_json(HEATMAP_PATH).await
    }

    async fn fetch_ranking(&self) -> Result<Vec<RankingRecord>, ClientError> {
        self.get_json(RANKING_PATH).await
    }

    async fn fetch_stats(&self) -> Result<DashboardStats, ClientError> {
        self.get_json(STATS_PATH).await
    }

    async fn fetch_inventory(&self) -> Result<Inventory, ClientError> {
        self.get_json(INVENTORY_PATH).await
    }

    async fn fetch_villages(&self) -> Result<Vec<CatalogEntry>, ClientError> {
        self.get_json(VILLAGES_PATH).await
    }

    async fn fetch_diseases(&self) -> Result<Vec<CatalogEntry>, ClientError> {
        self.get_json(DISEASES_PATH).await
    }

    async fn generate_route(&self, batch_id: i64) -> Result<RouteResult, ClientError> {
        let url = self.url(&format!("/admin/generate-route/{batch_id}"));
        log::debug!("POST {url}");
        let response = self.client.post(&url).send().await?;
        decode_json(check_status(response)?).await
    }

    async fn submit_reports(&self, reports: &[TestReport]) -> Result<(), ClientError> {
        let url = self.url(INGEST_PATH);
        log::debug!("POST {url} ({} reports)", reports.len());
        let response = self.client.post(&url).json(reports).send().await?;
        check_status(response)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{App, HttpResponse, HttpServer, web};
    use serde_json::json;

    use super::*;

    /// Starts a stand-in analytics service on an ephemeral port and returns
    /// its base URL.
    fn spawn_service() -> String {
        let server = HttpServer::new(|| {
            App::new()
                .route(
                    HEATMAP_PATH,
                    web::get().to(|| async {
                        HttpResponse::Ok().json(json!([
                            {"village_id": 5, "latitude": 17.12, "longitude": 78.46,
                             "risk_score": 0.72, "disease_id": 1},
                            {"village_id": 2, "latitude": 17.13, "longitude": 78.47,
                             "risk_score": 0.31, "disease_id": 2}
                        ]))
                    }),
                )
                .route(
                    RANKING_PATH,
                    web::get().to(|| async { HttpResponse::Ok().body("[{\"village_id\": ") }),
                )
                .route(
                    INVENTORY_PATH,
                    web::get().to(|| async { HttpResponse::NotFound().finish() }),
                )
                .route(
                    "/admin/generate-route/{batch}",
                    web::post().to(|batch: web::Path<i64>| async move {
                        HttpResponse::Ok().json(json!({
                            "route_sequence": [5, 9, batch.into_inner()],
                            "total_distance_km": 12.5,
                            "travel_time_minutes": 30.0,
                            "treatment_time_minutes": 45.0,
                            "total_mission_time_minutes": 75.0
                        }))
                    }),
                )
                .route(
                    INGEST_PATH,
                    web::post().to(|reports: web::Json<Vec<TestReport>>| async move {
                        if reports.iter().all(|r| r.positive_cases <= r.tests_done) {
                            HttpResponse::Ok().json(json!({"message": "Data ingested"}))
                        } else {
                            HttpResponse::UnprocessableEntity().finish()
                        }
                    }),
                )
        })
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))
        .unwrap();

        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        format!("http://{addr}")
    }

    fn client(base_url: String) -> HttpAnalyticsClient {
        HttpAnalyticsClient::new(&ClientConfig {
            base_url,
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[actix_web::test]
    async fn fetches_heatmap_records() {
        let client = client(spawn_service());
        let heatmap = client.fetch_heatmap().await.unwrap();
        assert_eq!(heatmap.len(), 2);
        assert_eq!(heatmap[0].village_id, 5);
        assert!((heatmap[1].risk_score - 0.31).abs() < 1e-9);
    }

    #[actix_web::test]
    async fn missing_endpoint_is_status_error() {
        let client = client(spawn_service());
        let err = client.fetch_inventory().await.unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 404, .. }));
    }

    #[actix_web::test]
    async fn truncated_body_is_decode_error() {
        let client = client(spawn_service());
        let err = client.fetch_ranking().await.unwrap_err();
        assert!(matches!(err, ClientError::Decode { .. }));
    }

    #[actix_web::test]
    async fn generates_route_for_batch() {
        let client = client(spawn_service());
        let route = client.generate_route(2).await.unwrap();
        assert_eq!(route.route_sequence, vec![5, 9, 2]);
        assert!((route.total_mission_time_minutes - 75.0).abs() < f64::EPSILON);
    }

    #[actix_web::test]
    async fn submission_reports_success_and_rejection() {
        let client = client(spawn_service());
        let good = TestReport {
            village_id: 3,
            disease_id: 1,
            tests_done: 50,
            positive_cases: 12,
        };
        client.submit_reports(&[good]).await.unwrap();

        let bad = TestReport {
            positive_cases: 60,
            ..good
        };
        let err = client.submit_reports(&[bad]).await.unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 422, .. }));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let err = HttpAnalyticsClient::new(&ClientConfig {
            base_url: "ftp://example.org".to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
        .unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl { .. }));
    }

    #[test]
    fn authority_fills_default_ports() {
        assert_eq!(
            client("http://127.0.0.1:8000/".to_string()).authority(),
            "127.0.0.1:8000"
        );
        assert_eq!(
            client("https://health.example.org/api".to_string()).authority(),
            "health.example.org:443"
        );
        assert_eq!(
            client("http://health.example.org".to_string()).authority(),
            "health.example.org:80"
        );
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        let long = "é".repeat(400);
        let p = preview(&long);
        assert!(p.ends_with("..."));
        assert!(p.len() <= BODY_PREVIEW_LEN + 3);
    }
}
