//! Admin control panel: heatmap, priority ranking, counters, inventory.

use std::future::Future;
use std::sync::Arc;

use rural_health_client::{AnalyticsService, ClientError};
use rural_health_surveillance_models::{DashboardStats, Inventory, RankingRecord, VillageRecord};

use crate::slot::{Slot, SourcePolicy};
use crate::source;
use crate::view::{DashboardView, ViewBuilder, ViewModel};

/// Everything the admin panel renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminViewModel {
    /// Village risk records for the outbreak map.
    pub heatmap: Slot<Vec<VillageRecord>>,
    /// Priority ranking, in service order.
    pub ranking: Slot<Vec<RankingRecord>>,
    /// Total villages and reports.
    pub stats: Slot<DashboardStats>,
    /// Doctors and kits on hand. Never shows an error.
    pub inventory: Slot<Inventory>,
}

impl AdminViewModel {
    /// Failure policy for each admin source.
    pub const SOURCES: &[(&str, SourcePolicy)] = &[
        (source::HEATMAP, SourcePolicy::Required),
        (source::RANKING, SourcePolicy::Required),
        (source::STATS, SourcePolicy::Required),
        (source::INVENTORY, SourcePolicy::Optional),
    ];

    /// Failure policy of the named source. Unknown names are required.
    #[must_use]
    pub fn policy(name: &str) -> SourcePolicy {
        Self::SOURCES
            .iter()
            .find(|(source_name, _)| *source_name == name)
            .map_or(SourcePolicy::Required, |(_, policy)| *policy)
    }

    /// Visible slot errors as `(source, message)` pairs.
    #[must_use]
    pub fn errors(&self) -> Vec<(&'static str, &str)> {
        [
            (source::HEATMAP, self.heatmap.error()),
            (source::RANKING, self.ranking.error()),
            (source::STATS, self.stats.error()),
            (source::INVENTORY, self.inventory.error()),
        ]
        .into_iter()
        .filter_map(|(name, error)| error.map(|e| (name, e)))
        .collect()
    }
}

impl ViewModel for AdminViewModel {
    fn is_settled(&self) -> bool {
        self.heatmap.is_settled()
            && self.ranking.is_settled()
            && self.stats.is_settled()
            && self.inventory.is_settled()
    }
}

async fn settle<T, F>(name: &'static str, fetch: F) -> Slot<T>
where
    T: Default,
    F: Future<Output = Result<T, ClientError>>,
{
    AdminViewModel::policy(name).settle(name, fetch).await
}

/// Activates the admin panel, issuing all four fetches at once.
#[must_use]
pub fn activate_admin(service: Arc<dyn AnalyticsService>) -> DashboardView<AdminViewModel> {
    let mut view = ViewBuilder::new();

    let svc = Arc::clone(&service);
    view.source(
        source::HEATMAP,
        async move { settle(source::HEATMAP, svc.fetch_heatmap()).await },
        |m: &mut AdminViewModel, slot| m.heatmap = slot,
    );

    let svc = Arc::clone(&service);
    view.source(
        source::RANKING,
        async move { settle(source::RANKING, svc.fetch_ranking()).await },
        |m: &mut AdminViewModel, slot| m.ranking = slot,
    );

    let svc = Arc::clone(&service);
    view.source(
        source::STATS,
        async move { settle(source::STATS, svc.fetch_stats()).await },
        |m: &mut AdminViewModel, slot| m.stats = slot,
    );

    view.source(
        source::INVENTORY,
        async move { settle(source::INVENTORY, service.fetch_inventory()).await },
        |m: &mut AdminViewModel, slot| m.inventory = slot,
    );

    log::info!("Admin dashboard activated");
    view.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockService, ranking, village};

    fn populated() -> MockService {
        MockService {
            heatmap: vec![village(1, 0.72), village(2, 0.35)],
            ranking: vec![ranking(1, 0.81), ranking(2, 0.44), ranking(3, 0.12)],
            stats: DashboardStats {
                total_villages: 3,
                total_reports: 27,
            },
            inventory: Inventory {
                doctors_available: 4,
                malaria_kits: 120,
            },
            ..MockService::default()
        }
    }

    #[tokio::test]
    async fn all_sources_populate_their_slots() {
        let mut view = activate_admin(Arc::new(populated()));
        let model = view.settled().await;

        assert_eq!(model.heatmap.value().map(Vec::len), Some(2));
        assert_eq!(model.stats.value_or_default().total_reports, 27);
        assert_eq!(model.inventory.value_or_default().malaria_kits, 120);
        assert!(model.errors().is_empty());
    }

    #[tokio::test]
    async fn inventory_failure_is_silent() {
        let service = populated().failing(source::INVENTORY);
        let mut view = activate_admin(Arc::new(service));
        let model = view.settled().await;

        assert!(model.heatmap.value().is_some());
        assert!(model.ranking.value().is_some());
        assert!(model.stats.value().is_some());
        assert_eq!(model.inventory, Slot::Ready(Inventory::default()));
        assert!(model.errors().is_empty());
    }

    #[tokio::test]
    async fn required_failure_is_isolated_to_its_slot() {
        let service = populated().failing(source::RANKING);
        let mut view = activate_admin(Arc::new(service));
        let model = view.settled().await;

        assert_eq!(model.errors(), vec![(source::RANKING, "Failed to load ranking")]);
        assert!(model.ranking.value_or_default().is_empty());
        assert_eq!(model.heatmap.value().map(Vec::len), Some(2));
        assert_eq!(model.stats.value_or_default().total_villages, 3);
    }

    #[tokio::test]
    async fn policy_table_decides_each_failure() {
        let service = AdminViewModel::SOURCES
            .iter()
            .fold(populated(), |service, &(name, _)| service.failing(name));
        let mut view = activate_admin(Arc::new(service));
        let model = view.settled().await;

        let errors = model.errors();
        for (name, policy) in AdminViewModel::SOURCES {
            let shown = errors.iter().any(|(failed, _)| failed == name);
            assert_eq!(shown, *policy == SourcePolicy::Required, "{name} is {policy}");
        }
        assert_eq!(model.inventory, Slot::Ready(Inventory::default()));
        assert!(matches!(model.stats, Slot::Failed(_)));
    }

    #[test]
    fn unknown_source_is_required() {
        assert_eq!(AdminViewModel::policy(source::INVENTORY), SourcePolicy::Optional);
        assert_eq!(AdminViewModel::policy(source::HEATMAP), SourcePolicy::Required);
        assert_eq!(AdminViewModel::policy("weather"), SourcePolicy::Required);
    }

    #[tokio::test]
    async fn ranking_keeps_service_order() {
        let mut view = activate_admin(Arc::new(populated()));
        let model = view.settled().await;
        let ids: Vec<i64> = model
            .ranking
            .value_or_default()
            .iter()
            .map(|r| r.village_id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn renders_partial_state_before_slow_source() {
        let mut service = populated();
        let gate = service.gate(source::HEATMAP);
        let service = Arc::new(service);
        let mut view = activate_admin(Arc::clone(&service) as Arc<dyn AnalyticsService>);

        let mut rx = view.subscribe();
        let partial = rx
            .wait_for(|m| {
                m.ranking.is_settled() && m.stats.is_settled() && m.inventory.is_settled()
            })
            .await
            .unwrap()
            .clone();
        assert!(partial.heatmap.is_pending());
        assert!(!partial.is_settled());

        gate.add_permits(1);
        let model = view.settled().await;
        assert!(model.heatmap.value().is_some());
    }

    #[tokio::test]
    async fn each_source_fetched_once_per_activation() {
        let service = Arc::new(populated());
        let mut view = activate_admin(Arc::clone(&service) as Arc<dyn AnalyticsService>);
        view.settled().await;

        for (name, _) in AdminViewModel::SOURCES {
            assert_eq!(service.call_count(name), 1, "{name} fetched more than once");
        }
    }
}
