//! In-memory analytics service for dashboard tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rural_health_client::{AnalyticsService, ClientError};
use rural_health_surveillance_models::{
    CatalogEntry, DashboardStats, Inventory, RankingRecord, RouteResult, TestReport,
    VillageRecord,
};
use tokio::sync::Semaphore;

#[derive(Default)]
pub struct MockService {
    pub heatmap: Vec<VillageRecord>,
    pub ranking: Vec<RankingRecord>,
    pub stats: DashboardStats,
    pub inventory: Inventory,
    pub villages: Vec<CatalogEntry>,
    pub diseases: Vec<CatalogEntry>,
    pub route: Option<RouteResult>,
    /// Sources that answer with HTTP 500.
    pub failing: BTreeSet<&'static str>,
    /// Sources that wait for a permit before answering.
    pub gates: BTreeMap<&'static str, Arc<Semaphore>>,
    pub submitted: Mutex<Vec<TestReport>>,
    pub calls: Mutex<Vec<&'static str>>,
}

impl MockService {
    pub fn failing(mut self, source: &'static str) -> Self {
        self.failing.insert(source);
        self
    }

    /// Holds `source` until the returned semaphore gets a permit.
    pub fn gate(&mut self, source: &'static str) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.gates.insert(source, Arc::clone(&gate));
        gate
    }

    pub fn call_count(&self, source: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| ***c == *source)
            .count()
    }

    async fn answer<T: Clone>(&self, source: &'static str, value: &T) -> Result<T, ClientError> {
        self.calls.lock().unwrap().push(source);
        if let Some(gate) = self.gates.get(source) {
            let _permit = gate.acquire().await.unwrap();
        }
        if self.failing.contains(source) {
            return Err(ClientError::Status {
                status: 500,
                url: format!("http://mock/{source}"),
            });
        }
        Ok(value.clone())
    }
}

#[async_trait]
impl AnalyticsService for MockService {
    async fn fetch_heatmap(&self) -> Result<Vec<VillageRecord>, ClientError> {
        self.answer("heatmap", &self.heatmap).await
    }

    async fn fetch_ranking(&self) -> Result<Vec<RankingRecord>, ClientError> {
        self.answer("ranking", &self.ranking).await
    }

    async fn fetch_stats(&self) -> Result<DashboardStats, ClientError> {
        self.answer("stats", &self.stats).await
    }

    async fn fetch_inventory(&self) -> Result<Inventory, ClientError> {
        self.answer("inventory", &self.inventory).await
    }

    async fn fetch_villages(&self) -> Result<Vec<CatalogEntry>, ClientError> {
        self.answer("villages", &self.villages).await
    }

    async fn fetch_diseases(&self) -> Result<Vec<CatalogEntry>, ClientError> {
        self.answer("diseases", &self.diseases).await
    }

    async fn generate_route(&self, batch_id: i64) -> Result<RouteResult, ClientError> {
        let route = self.route.clone().ok_or_else(|| ClientError::Status {
            status: 404,
            url: format!("http://mock/admin/generate-route/{batch_id}"),
        })?;
        self.answer("route", &route).await
    }

    async fn submit_reports(&self, reports: &[TestReport]) -> Result<(), ClientError> {
        self.answer("ingest", &()).await?;
        self.submitted.lock().unwrap().extend_from_slice(reports);
        Ok(())
    }
}

pub fn village(village_id: i64, risk_score: f64) -> VillageRecord {
    #[allow(clippy::cast_precision_loss)]
    let offset = village_id as f64 * 0.01;
    VillageRecord {
        village_id,
        latitude: 17.1 + offset,
        longitude: 78.4 + offset,
        risk_score,
        disease_id: 1,
    }
}

pub fn ranking(village_id: i64, risk_score: f64) -> RankingRecord {
    RankingRecord {
        village_id,
        risk_score,
        positivity_rate: 0.24,
        spread_velocity: 0.05,
    }
}
