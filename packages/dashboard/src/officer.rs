//! Medical officer dashboard: catalogs for the report form.

use std::sync::Arc;

use rural_health_client::AnalyticsService;
use rural_health_surveillance_models::CatalogEntry;

use crate::slot::{Slot, required};
use crate::source;
use crate::view::{DashboardView, ViewBuilder, ViewModel};

/// Selector options for the report form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfficerViewModel {
    /// Villages the officer can report for.
    pub villages: Slot<Vec<CatalogEntry>>,
    /// Diseases the officer can report on.
    pub diseases: Slot<Vec<CatalogEntry>>,
}

impl OfficerViewModel {
    /// Visible slot errors as `(source, message)` pairs.
    #[must_use]
    pub fn errors(&self) -> Vec<(&'static str, &str)> {
        [
            (source::VILLAGES, self.villages.error()),
            (source::DISEASES, self.diseases.error()),
        ]
        .into_iter()
        .filter_map(|(name, error)| error.map(|e| (name, e)))
        .collect()
    }
}

impl ViewModel for OfficerViewModel {
    fn is_settled(&self) -> bool {
        self.villages.is_settled() && self.diseases.is_settled()
    }
}

/// Activates the officer dashboard, loading both catalogs at once.
#[must_use]
pub fn activate_officer(service: Arc<dyn AnalyticsService>) -> DashboardView<OfficerViewModel> {
    let mut view = ViewBuilder::new();

    let svc = Arc::clone(&service);
    view.source(
        source::VILLAGES,
        async move { required(source::VILLAGES, svc.fetch_villages()).await },
        |m: &mut OfficerViewModel, slot| m.villages = slot,
    );

    view.source(
        source::DISEASES,
        async move { required(source::DISEASES, service.fetch_diseases()).await },
        |m: &mut OfficerViewModel, slot| m.diseases = slot,
    );

    log::info!("Officer dashboard activated");
    view.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockService;

    fn entry(id: i64, name: &str) -> CatalogEntry {
        CatalogEntry {
            id,
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn loads_both_catalogs() {
        let service = MockService {
            villages: vec![entry(3, "Kothur"), entry(4, "Shadnagar")],
            diseases: vec![entry(1, "Malaria")],
            ..MockService::default()
        };
        let mut view = activate_officer(Arc::new(service));
        let model = view.settled().await;

        assert_eq!(model.villages.value_or_default().len(), 2);
        assert_eq!(model.diseases.value_or_default()[0].name, "Malaria");
        assert!(model.errors().is_empty());
    }

    #[tokio::test]
    async fn disease_catalog_failure_leaves_villages() {
        let service = MockService {
            villages: vec![entry(3, "Kothur")],
            ..MockService::default()
        }
        .failing(source::DISEASES);
        let mut view = activate_officer(Arc::new(service));
        let model = view.settled().await;

        assert_eq!(model.villages.value_or_default().len(), 1);
        assert!(model.diseases.value_or_default().is_empty());
        assert_eq!(model.errors(), vec![(source::DISEASES, "Failed to load diseases")]);
    }
}
