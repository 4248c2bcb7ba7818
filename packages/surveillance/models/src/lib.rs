#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Surveillance data types exchanged with the analytics service.
//!
//! These are the JSON shapes the console consumes: village risk records
//! for the heatmap, the priority ranking, generated routes, dashboard
//! counters, and the test reports medical officers submit. Field names
//! match the service's `snake_case` wire format.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Map centre used by the admin and driver map views.
pub const MAP_CENTER: LatLng = LatLng {
    latitude: 17.125,
    longitude: 78.46,
};

/// Initial zoom level for the map views.
pub const MAP_ZOOM: u8 = 13;

/// Risk score above which a village is drawn as high risk.
pub const HIGH_RISK_THRESHOLD: f64 = 0.6;

/// A geographic coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// A heatmap entry: one village's location and current risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VillageRecord {
    /// Village ID, unique within one heatmap fetch.
    pub village_id: i64,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Risk score in `[0, 1]`.
    pub risk_score: f64,
    /// Disease driving the risk score.
    pub disease_id: i64,
}

impl VillageRecord {
    /// Returns the village position.
    #[must_use]
    pub const fn position(&self) -> LatLng {
        LatLng {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// Returns the risk band used for marker colouring.
    #[must_use]
    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_score(self.risk_score)
    }

    /// Returns the heatmap marker radius in pixels.
    ///
    /// The radius scales with risk but never drops below 8 so that
    /// low-risk villages stay clickable.
    #[must_use]
    pub fn marker_radius(&self) -> f64 {
        (self.risk_score * 25.0).max(8.0)
    }
}

/// Coarse risk band derived from a risk score.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RiskLevel {
    /// Score above [`HIGH_RISK_THRESHOLD`].
    High,
    /// Anything at or below the threshold.
    Elevated,
}

impl RiskLevel {
    /// Classifies a risk score.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score > HIGH_RISK_THRESHOLD {
            Self::High
        } else {
            Self::Elevated
        }
    }

    /// Marker colour for this band.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::High => "red",
            Self::Elevated => "orange",
        }
    }
}

/// One row of the priority ranking.
///
/// The service returns rankings pre-sorted; consumers render them in the
/// order received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingRecord {
    /// Village ID.
    pub village_id: i64,
    /// Composite risk score.
    pub risk_score: f64,
    /// Fraction of tests that came back positive, `[0, 1]`.
    pub positivity_rate: f64,
    /// Change in positivity since the previous report, `[0, 1]`.
    pub spread_velocity: f64,
}

/// A route generated for an allocation batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    /// Village IDs in visit order. May reference villages missing from a
    /// concurrently fetched heatmap.
    pub route_sequence: Vec<i64>,
    /// Total road distance.
    pub total_distance_km: f64,
    /// Driving time.
    pub travel_time_minutes: f64,
    /// Time spent treating at stops.
    pub treatment_time_minutes: f64,
    /// Travel plus treatment.
    pub total_mission_time_minutes: f64,
}

/// Headline counters for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardStats {
    /// Number of villages under surveillance.
    pub total_villages: u64,
    /// Number of test reports received.
    pub total_reports: u64,
}

/// Medical resource inventory snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Inventory {
    /// Doctors currently available for deployment.
    pub doctors_available: u64,
    /// Malaria rapid test kits in stock.
    pub malaria_kits: u64,
}

/// An `{id, name}` pair from the village or disease catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Catalog ID.
    pub id: i64,
    /// Display name.
    pub name: String,
}

/// A single test report submitted by a medical officer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestReport {
    /// Village the tests were run in.
    pub village_id: i64,
    /// Disease tested for.
    pub disease_id: i64,
    /// Number of tests conducted.
    pub tests_done: i64,
    /// Number of positive results.
    pub positive_cases: i64,
}
