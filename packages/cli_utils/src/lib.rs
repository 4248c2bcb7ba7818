#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for the rural health console.
//!
//! [`init_logger`] sets up `pretty_env_logger` behind
//! `indicatif-log-bridge` so that `log::info!` and friends are suspended
//! while loading spinners redraw. [`SourceSpinners`] shows one spinner per
//! dashboard data source until that source settles.

use std::collections::BTreeMap;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

/// One spinner per named data source.
pub struct SourceSpinners {
    bars: BTreeMap<&'static str, ProgressBar>,
}

impl SourceSpinners {
    /// Starts a spinner for each of `sources`.
    #[must_use]
    pub fn start(multi: &MultiProgress, sources: &[&'static str]) -> Self {
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        let bars = sources
            .iter()
            .map(|name| {
                let bar = multi.add(ProgressBar::new_spinner());
                bar.enable_steady_tick(Duration::from_millis(100));
                bar.set_style(style.clone());
                bar.set_message(format!("Loading {name}..."));
                (*name, bar)
            })
            .collect();

        Self { bars }
    }

    /// Stops the spinner for `source`, leaving `outcome` in its place.
    pub fn settle(&self, source: &str, outcome: &str) {
        if let Some(bar) = self.bars.get(source)
            && !bar.is_finished()
        {
            bar.finish_with_message(format!("{source}: {outcome}"));
        }
    }

    /// Whether `source` has been settled.
    #[must_use]
    pub fn is_settled(&self, source: &str) -> bool {
        self.bars.get(source).is_none_or(ProgressBar::is_finished)
    }

    /// Removes every spinner from the terminal.
    pub fn clear(&self) {
        for bar in self.bars.values() {
            bar.finish_and_clear();
        }
    }
}

/// Initializes the global logger wrapped in `indicatif-log-bridge` so that
/// `log::info!` and friends are suspended while spinners redraw.
///
/// Returns the [`MultiProgress`] that all spinners must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    // Build the pretty-env-logger logger manually so we can wrap it.
    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok(); // Ignore error if logger was already set (e.g., in tests)

    log::set_max_level(level);

    multi
}
