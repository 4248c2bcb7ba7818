//! Text rendering of the role dashboards.
//!
//! Everything here is a pure function of a (possibly partial) view model,
//! so each panel can be printed at any point while its sources load.

use std::fmt::{Display, Write as _};

use console::style;
use rural_health_connectivity::ConnectivityState;
use rural_health_dashboard::{AdminViewModel, DriverViewModel, OfficerViewModel, Slot};
use rural_health_session::Session;
use rural_health_surveillance_models::{
    CatalogEntry, MAP_CENTER, MAP_ZOOM, RankingRecord, RiskLevel, VillageRecord,
};

/// Connectivity badge with its style class.
#[must_use]
pub fn status_badge(state: ConnectivityState) -> String {
    let badge = if state.is_online() {
        style(state.badge()).green().bold()
    } else {
        style(state.badge()).red().bold()
    };
    format!("{badge} [{}]", state.css_class())
}

/// Navigation bar. The logout hint only appears with a session.
#[must_use]
pub fn navbar(session: Option<&Session>) -> String {
    match session {
        Some(session) => format!(
            "{} {}  (logout: rural_health_console logout)",
            style(format!("[{}]", session.role.badge())).cyan().bold(),
            session.masked_identifier()
        ),
        None => "Not signed in".to_string(),
    }
}

/// A single KPI card.
#[must_use]
pub fn kpi_card(label: &str, value: impl Display) -> String {
    format!("  {label:<20} {}", style(value).bold())
}

fn heading(out: &mut String, title: &str, state: ConnectivityState) {
    let _ = writeln!(out, "{}  {}", style(title).bold().underlined(), status_badge(state));
}

fn slot_errors(out: &mut String, errors: &[(&'static str, &str)]) {
    for (_, message) in errors {
        let _ = writeln!(out, "  {}", style(message).red());
    }
}

/// One heatmap marker.
#[must_use]
pub fn marker_line(record: &VillageRecord) -> String {
    let level = record.risk_level();
    let color = match level {
        RiskLevel::High => style(level.color()).red(),
        RiskLevel::Elevated => style(level.color()).yellow(),
    };
    format!(
        "  Village {:<6} ({:.4}, {:.4})  disease {}  risk {:.2}  radius {:.1}  {color}",
        record.village_id,
        record.latitude,
        record.longitude,
        record.disease_id,
        record.risk_score,
        record.marker_radius(),
    )
}

/// One row of the priority ranking table.
#[must_use]
pub fn ranking_row(rank: usize, record: &RankingRecord) -> String {
    format!(
        "  {rank:>3}  {:<8} {:>7.3} {:>10.1}% {:>8.1}%",
        record.village_id,
        record.risk_score,
        record.positivity_rate * 100.0,
        record.spread_velocity * 100.0,
    )
}

/// The admin control panel.
#[must_use]
pub fn admin_panel(model: &AdminViewModel, state: ConnectivityState) -> String {
    let mut out = String::new();
    heading(&mut out, "District Control Panel", state);
    slot_errors(&mut out, &model.errors());

    let stats = model.stats.value_or_default();
    let inventory = model.inventory.value_or_default();
    let _ = writeln!(out, "{}", kpi_card("Total Villages", stats.total_villages));
    let _ = writeln!(out, "{}", kpi_card("Total Reports", stats.total_reports));
    let _ = writeln!(out, "{}", kpi_card("Doctors Available", inventory.doctors_available));
    let _ = writeln!(out, "{}", kpi_card("Malaria Kits", inventory.malaria_kits));

    let _ = writeln!(
        out,
        "\nOutbreak heatmap (centre {}, {}, zoom {MAP_ZOOM})",
        MAP_CENTER.latitude, MAP_CENTER.longitude
    );
    let markers = records_or_empty(&model.heatmap);
    if model.heatmap.is_pending() {
        let _ = writeln!(out, "  Loading heatmap...");
    } else if markers.is_empty() {
        let _ = writeln!(out, "  No villages");
    }
    for record in markers {
        let _ = writeln!(out, "{}", marker_line(record));
    }

    let _ = writeln!(
        out,
        "\nPriority ranking\n  {:>3}  {:<8} {:>7} {:>11} {:>9}",
        "#", "Village", "Risk", "Positivity", "Spread"
    );
    if model.ranking.is_pending() {
        let _ = writeln!(out, "  Loading ranking...");
    }
    for (i, record) in model.ranking.value().into_iter().flatten().enumerate() {
        let _ = writeln!(out, "{}", ranking_row(i + 1, record));
    }

    out
}

fn records_or_empty<T>(slot: &Slot<Vec<T>>) -> &[T] {
    slot.value().map_or(&[], Vec::as_slice)
}

/// The driver mission dashboard.
#[must_use]
pub fn driver_panel(model: &DriverViewModel, batch_id: i64, state: ConnectivityState) -> String {
    let mut out = String::new();
    heading(&mut out, &format!("Mission Control: batch {batch_id}"), state);
    slot_errors(&mut out, &model.errors());

    let Some(route) = model.route.value() else {
        if model.route.is_pending() {
            let _ = writeln!(out, "  Loading route...");
        }
        return out;
    };

    let cards = [
        ("Distance", format!("{:.1} km", route.total_distance_km)),
        ("Travel Time", format!("{:.0} min", route.travel_time_minutes)),
        ("Treatment Time", format!("{:.0} min", route.treatment_time_minutes)),
        ("Mission Time", format!("{:.0} min", route.total_mission_time_minutes)),
    ];
    for (label, value) in cards {
        let _ = writeln!(out, "{}", kpi_card(label, value));
    }

    let Some(itinerary) = model.itinerary() else {
        let _ = writeln!(out, "\n  Loading village locations...");
        return out;
    };

    let _ = writeln!(out, "\nItinerary");
    if itinerary.is_empty() {
        let _ = writeln!(out, "  No stops could be placed on the map");
    }
    for stop in itinerary.stops() {
        let _ = writeln!(
            out,
            "  {:<8} Village {:<6} ({:.4}, {:.4})",
            stop.label(),
            stop.village.village_id,
            stop.village.latitude,
            stop.village.longitude,
        );
    }

    let unresolved = itinerary.summary().unresolved_stops;
    if unresolved > 0 {
        let _ = writeln!(out, "  {unresolved} routed village(s) missing from the heatmap");
    }

    if !itinerary.path().is_empty() {
        let path: Vec<String> = itinerary
            .path()
            .iter()
            .map(|p| format!("({:.4}, {:.4})", p.latitude, p.longitude))
            .collect();
        let _ = writeln!(out, "\nRoute: {}", path.join(" -> "));
    }

    out
}

fn catalog(out: &mut String, title: &str, slot: &Slot<Vec<CatalogEntry>>) {
    let _ = writeln!(out, "\n{title}");
    if slot.is_pending() {
        let _ = writeln!(out, "  Loading {}...", title.to_lowercase());
    }
    for entry in records_or_empty(slot) {
        let _ = writeln!(out, "  [{:>3}] {}", entry.id, entry.name);
    }
}

/// The medical officer's catalogs.
#[must_use]
pub fn officer_panel(model: &OfficerViewModel, state: ConnectivityState) -> String {
    let mut out = String::new();
    heading(&mut out, "Field Report", state);
    slot_errors(&mut out, &model.errors());
    catalog(&mut out, "Villages", &model.villages);
    catalog(&mut out, "Diseases", &model.diseases);
    out
}
