//! Route itinerary reconstruction.
//!
//! The routing service returns only an ordered list of village IDs. The
//! coordinates come from the heatmap, which is fetched separately and may
//! not contain every routed village. The join is an order-preserving
//! filter-map over the route: villages missing from the heatmap are
//! skipped, nothing is re-sorted.

use std::collections::HashMap;

use rural_health_surveillance_models::{LatLng, RouteResult, VillageRecord};

/// Heatmap records keyed by village ID, built once per heatmap fetch.
#[derive(Debug, Clone, Default)]
pub struct HeatmapIndex {
    by_id: HashMap<i64, VillageRecord>,
}

impl HeatmapIndex {
    /// Indexes `records`. If an ID repeats, the first record wins.
    #[must_use]
    pub fn build(records: &[VillageRecord]) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        for record in records {
            by_id
                .entry(record.village_id)
                .or_insert_with(|| record.clone());
        }
        Self { by_id }
    }

    /// Looks up a village.
    #[must_use]
    pub fn get(&self, village_id: i64) -> Option<&VillageRecord> {
        self.by_id.get(&village_id)
    }

    /// Number of distinct villages indexed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Joins `route` against this index.
    #[must_use]
    pub fn reconstruct(&self, route: &RouteResult) -> Itinerary {
        let stops: Vec<Stop> = route
            .route_sequence
            .iter()
            .filter_map(|id| self.get(*id))
            .enumerate()
            .map(|(i, village)| Stop {
                stop_index: i + 1,
                village: village.clone(),
            })
            .collect();

        let unresolved = route.route_sequence.len() - stops.len();
        if unresolved > 0 {
            log::debug!(
                "{unresolved} of {} routed villages missing from heatmap",
                route.route_sequence.len()
            );
        }

        let path = stops.iter().map(|stop| stop.village.position()).collect();

        Itinerary {
            stops,
            path,
            summary: MissionSummary::new(route, unresolved),
        }
    }
}

/// One resolved stop.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    /// 1-based position among resolved stops. For labelling only.
    pub stop_index: usize,
    /// The village visited.
    pub village: VillageRecord,
}

impl Stop {
    /// Marker label, e.g. `Stop 2`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("Stop {}", self.stop_index)
    }
}

/// Route totals shown alongside the itinerary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MissionSummary {
    /// Total road distance.
    pub total_distance_km: f64,
    /// Driving time.
    pub travel_time_minutes: f64,
    /// Treatment time across all stops.
    pub treatment_time_minutes: f64,
    /// Travel plus treatment.
    pub total_mission_time_minutes: f64,
    /// Villages in the route sequence.
    pub routed_stops: usize,
    /// Routed villages the heatmap had no record for.
    pub unresolved_stops: usize,
}

impl MissionSummary {
    const fn new(route: &RouteResult, unresolved_stops: usize) -> Self {
        Self {
            total_distance_km: route.total_distance_km,
            travel_time_minutes: route.travel_time_minutes,
            treatment_time_minutes: route.treatment_time_minutes,
            total_mission_time_minutes: route.total_mission_time_minutes,
            routed_stops: route.route_sequence.len(),
            unresolved_stops,
        }
    }
}

/// A route joined with heatmap geometry.
///
/// `stops` and `path` always have the same length and follow the route's
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    stops: Vec<Stop>,
    path: Vec<LatLng>,
    summary: MissionSummary,
}

impl Itinerary {
    /// Resolved stops in visit order.
    #[must_use]
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// Coordinates of the resolved stops, for drawing the route line.
    #[must_use]
    pub fn path(&self) -> &[LatLng] {
        &self.path
    }

    /// Route totals.
    #[must_use]
    pub const fn summary(&self) -> &MissionSummary {
        &self.summary
    }

    /// Number of resolved stops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Whether no routed village could be resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}

/// Joins a route with a heatmap in one call.
///
/// Prefer [`HeatmapIndex::reconstruct`] when the same heatmap serves
/// several routes.
#[must_use]
pub fn reconstruct(route: &RouteResult, heatmap: &[VillageRecord]) -> Itinerary {
    HeatmapIndex::build(heatmap).reconstruct(route)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn village(village_id: i64, latitude: f64, longitude: f64) -> VillageRecord {
        VillageRecord {
            village_id,
            latitude,
            longitude,
            risk_score: 0.5,
            disease_id: 1,
        }
    }

    fn route(sequence: Vec<i64>) -> RouteResult {
        RouteResult {
            route_sequence: sequence,
            total_distance_km: 18.4,
            travel_time_minutes: 42.0,
            treatment_time_minutes: 90.0,
            total_mission_time_minutes: 132.0,
        }
    }

    #[test]
    fn drops_unknown_ids_in_order() {
        let heatmap = vec![village(2, 17.10, 78.40), village(5, 17.15, 78.45)];
        let itinerary = reconstruct(&route(vec![5, 9, 2]), &heatmap);

        let ids: Vec<i64> = itinerary.stops().iter().map(|s| s.village.village_id).collect();
        assert_eq!(ids, vec![5, 2]);
        assert_eq!(itinerary.path().len(), 2);
        assert_eq!(
            itinerary.path()[0],
            LatLng {
                latitude: 17.15,
                longitude: 78.45
            }
        );
        assert_eq!(itinerary.summary().unresolved_stops, 1);
        assert_eq!(itinerary.summary().routed_stops, 3);
    }

    #[test]
    fn stop_indices_count_resolved_positions() {
        let heatmap = vec![village(1, 17.0, 78.0), village(3, 17.2, 78.2)];
        let itinerary = reconstruct(&route(vec![8, 3, 7, 1]), &heatmap);

        let labels: Vec<String> = itinerary.stops().iter().map(Stop::label).collect();
        assert_eq!(labels, vec!["Stop 1", "Stop 2"]);
        assert_eq!(itinerary.stops()[0].village.village_id, 3);
    }

    #[test]
    fn empty_route_yields_empty_itinerary() {
        let heatmap = vec![village(1, 17.0, 78.0)];
        let itinerary = reconstruct(&route(Vec::new()), &heatmap);
        assert!(itinerary.is_empty());
        assert!(itinerary.path().is_empty());
    }

    #[test]
    fn empty_heatmap_yields_empty_itinerary() {
        let itinerary = reconstruct(&route(vec![1, 2, 3]), &[]);
        assert_eq!(itinerary.len(), 0);
        assert!(itinerary.path().is_empty());
        assert_eq!(itinerary.summary().unresolved_stops, 3);
    }

    #[test]
    fn preserves_route_order_not_heatmap_order() {
        let heatmap = vec![village(1, 1.0, 1.0), village(2, 2.0, 2.0), village(3, 3.0, 3.0)];
        let itinerary = reconstruct(&route(vec![3, 1, 2]), &heatmap);
        let lats: Vec<f64> = itinerary.path().iter().map(|p| p.latitude).collect();
        assert_eq!(lats, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn revisited_village_appears_twice() {
        let heatmap = vec![village(4, 17.0, 78.0)];
        let itinerary = reconstruct(&route(vec![4, 4]), &heatmap);
        assert_eq!(itinerary.len(), 2);
        assert_eq!(itinerary.stops()[1].stop_index, 2);
    }

    #[test]
    fn duplicate_heatmap_ids_keep_first() {
        let heatmap = vec![village(6, 10.0, 10.0), village(6, 20.0, 20.0)];
        let index = HeatmapIndex::build(&heatmap);
        assert_eq!(index.len(), 1);
        assert!((index.get(6).unwrap().latitude - 10.0).abs() < f64::EPSILON);
    }
}
