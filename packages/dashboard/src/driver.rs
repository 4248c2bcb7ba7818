//! Driver mission dashboard: the generated route and its itinerary.

use std::sync::Arc;

use rural_health_client::AnalyticsService;
use rural_health_surveillance_models::RouteResult;

use crate::itinerary::{HeatmapIndex, Itinerary};
use crate::slot::{Slot, required};
use crate::source;
use crate::view::{DashboardView, ViewBuilder, ViewModel};

/// Everything the driver dashboard renders.
#[derive(Debug, Clone, Default)]
pub struct DriverViewModel {
    /// Route for the configured batch.
    pub route: Slot<RouteResult>,
    /// Heatmap, indexed by village as soon as it arrives.
    pub heatmap: Slot<HeatmapIndex>,
}

impl DriverViewModel {
    /// The itinerary, once it can be built.
    ///
    /// Returns `None` until the route has arrived and the heatmap has
    /// settled, or if the route failed. A failed heatmap joins as empty,
    /// giving an itinerary with no stops rather than no itinerary.
    #[must_use]
    pub fn itinerary(&self) -> Option<Itinerary> {
        let route = self.route.value()?;
        match &self.heatmap {
            Slot::Pending => None,
            Slot::Ready(index) => Some(index.reconstruct(route)),
            Slot::Failed(_) => Some(HeatmapIndex::default().reconstruct(route)),
        }
    }

    /// Visible slot errors as `(source, message)` pairs.
    #[must_use]
    pub fn errors(&self) -> Vec<(&'static str, &str)> {
        [
            (source::ROUTE, self.route.error()),
            (source::HEATMAP, self.heatmap.error()),
        ]
        .into_iter()
        .filter_map(|(name, error)| error.map(|e| (name, e)))
        .collect()
    }
}

impl ViewModel for DriverViewModel {
    fn is_settled(&self) -> bool {
        self.route.is_settled() && self.heatmap.is_settled()
    }
}

/// Activates the driver dashboard for `batch_id`, requesting the route
/// and the heatmap at once.
#[must_use]
pub fn activate_driver(
    service: Arc<dyn AnalyticsService>,
    batch_id: i64,
) -> DashboardView<DriverViewModel> {
    let mut view = ViewBuilder::new();

    let svc = Arc::clone(&service);
    view.source(
        source::ROUTE,
        async move { required(source::ROUTE, svc.generate_route(batch_id)).await },
        |m: &mut DriverViewModel, slot| m.route = slot,
    );

    view.source(
        source::HEATMAP,
        async move {
            let records = required(source::HEATMAP, service.fetch_heatmap()).await;
            match records {
                Slot::Ready(records) => Slot::Ready(HeatmapIndex::build(&records)),
                Slot::Failed(message) => Slot::Failed(message),
                Slot::Pending => Slot::Pending,
            }
        },
        |m: &mut DriverViewModel, slot| m.heatmap = slot,
    );

    log::info!("Driver dashboard activated for batch {batch_id}");
    view.build()
}
