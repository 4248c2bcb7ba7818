#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Role dashboards for the rural health console.
//!
//! Activating a dashboard issues every one of its source fetches at once.
//! Each completion is written into its own [`Slot`] of the view model as
//! soon as it arrives, in whatever order the service answers, and readers
//! are notified through a `watch` channel so they can render partial
//! state. Failures are handled per source: required sources leave a
//! visible error in their slot, the optional inventory source is silently
//! defaulted.
//!
//! Views own a [`ViewScope`]. Once the view is torn down, late
//! completions are dropped instead of being written into its state.
//!
//! The driver view joins the generated route with the heatmap through
//! [`itinerary::reconstruct`]; the officer view carries the
//! [`report::ReportForm`].

pub mod admin;
pub mod driver;
pub mod itinerary;
pub mod officer;
pub mod report;
pub mod scope;
pub mod slot;
pub mod view;

#[cfg(test)]
mod testing;

pub use admin::{AdminViewModel, activate_admin};
pub use driver::{DriverViewModel, activate_driver};
pub use itinerary::{HeatmapIndex, Itinerary, MissionSummary, Stop, reconstruct};
pub use officer::{OfficerViewModel, activate_officer};
pub use report::{FormError, FormField, ReportForm, SubmitError};
pub use scope::{ScopeToken, ViewScope};
pub use slot::{Slot, SourcePolicy};
pub use view::{DashboardView, ViewModel};

/// Names of the data sources, as used in logs and slot errors.
pub mod source {
    /// Village risk records.
    pub const HEATMAP: &str = "heatmap";
    /// Priority ranking.
    pub const RANKING: &str = "ranking";
    /// Dashboard counters.
    pub const STATS: &str = "stats";
    /// Resource inventory (optional).
    pub const INVENTORY: &str = "inventory";
    /// Village catalog.
    pub const VILLAGES: &str = "villages";
    /// Disease catalog.
    pub const DISEASES: &str = "diseases";
    /// Generated route.
    pub const ROUTE: &str = "route";
}
