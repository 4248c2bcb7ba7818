#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line console for the rural health surveillance service.
//!
//! Signing in stores a `(role, identifier)` session on disk; each role then
//! opens its own dashboard: the admin control panel, the driver's mission
//! itinerary, or the medical officer's report form. Dashboards fetch all
//! of their sources at once and show a spinner per source until it
//! settles.
//!
//! Uses `indicatif-log-bridge` (via [`rural_health_cli_utils::init_logger`])
//! so log lines and spinners never fight for the terminal.

mod commands;
mod config;
mod render;

use clap::{Parser, Subcommand};
use rural_health_session::{Role, Route};

use crate::commands::{Context, ReportArgs};
use crate::config::ConsoleConfig;

/// Rural health surveillance console.
#[derive(Parser)]
#[command(name = "rural_health_console")]
#[command(about = "Field console for rural health surveillance")]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Sign in and open the role's dashboard.
    Login {
        /// Role to sign in as (`admin`, `driver`, `officer`).
        #[arg(long)]
        role: Option<Role>,

        /// Identifier carrying the role's prefix (e.g. `ADM-7`).
        #[arg(long)]
        id: Option<String>,
    },

    /// Clear the stored session.
    Logout,

    /// Show the navigation bar for the current session.
    Whoami,

    /// Open the admin control panel.
    Admin,

    /// Open the driver mission dashboard.
    Driver {
        /// Allocation batch to route (defaults to the configured batch).
        #[arg(long)]
        batch: Option<i64>,
    },

    /// Open the medical officer dashboard.
    Officer {
        #[command(subcommand)]
        action: Option<OfficerAction>,
    },

    /// Track connectivity from network signal lines on stdin.
    Monitor,
}

/// Actions for the `officer` subcommand.
#[derive(Subcommand)]
enum OfficerAction {
    /// Submit a test report.
    Submit(ReportArgs),
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let multi = rural_health_cli_utils::init_logger();
    let config = ConsoleConfig::load()?;
    let ctx = Context::open(config, multi);

    match cli.command {
        Commands::Login { role, id } => commands::login(&ctx, role, id).await?,
        Commands::Logout => commands::logout(&ctx)?,
        Commands::Whoami => commands::whoami(&ctx)?,
        Commands::Admin => commands::navigate(&ctx, Route::Admin, None).await?,
        Commands::Driver { batch } => commands::navigate(&ctx, Route::Driver, batch).await?,
        Commands::Officer { action: None } => {
            commands::navigate(&ctx, Route::Officer, None).await?;
        }
        Commands::Officer {
            action: Some(OfficerAction::Submit(args)),
        } => commands::submit(&ctx, args).await?,
        Commands::Monitor => commands::monitor(&ctx).await?,
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{}", console::style(e).red());
        std::process::exit(1);
    }
}
