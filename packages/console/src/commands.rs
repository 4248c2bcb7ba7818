//! Subcommand handlers.
//!
//! Every dashboard is reached through [`navigate`], which re-reads the
//! session and runs the guard before anything is fetched.

use std::sync::Arc;

use console::style;
use dialoguer::{Input, Select};
use rural_health_cli_utils::{MultiProgress, SourceSpinners};
use rural_health_client::{AnalyticsService, ClientError, HttpAnalyticsClient};
use rural_health_connectivity::probe::{DEFAULT_PROBE_TIMEOUT, probe_reachability};
use rural_health_connectivity::signals::line_signals;
use rural_health_connectivity::{ConnectivityState, ConnectivityTracker};
use rural_health_dashboard::{
    AdminViewModel, DashboardView, DriverViewModel, FormField, OfficerViewModel, ReportForm, Slot,
    ViewModel, activate_admin, activate_driver, activate_officer, source,
};
use rural_health_session::{
    Authorization, FileBackend, Role, Route, Session, SessionError, SessionStore, authorize_route,
};
use rural_health_surveillance_models::CatalogEntry;
use tokio::io::BufReader;

use crate::config::ConsoleConfig;
use crate::render;

type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Raw report fields given on the command line. Missing fields are
/// prompted for.
#[derive(Debug, Default, clap::Args)]
pub struct ReportArgs {
    /// Village ID.
    #[arg(long)]
    pub village: Option<String>,

    /// Disease ID.
    #[arg(long)]
    pub disease: Option<String>,

    /// Number of tests conducted.
    #[arg(long)]
    pub tests: Option<String>,

    /// Number of positive results.
    #[arg(long)]
    pub positive: Option<String>,
}

/// State shared by every command.
pub struct Context {
    config: ConsoleConfig,
    store: SessionStore,
    multi: MultiProgress,
}

impl Context {
    /// Opens the session store named by `config`.
    #[must_use]
    pub fn open(config: ConsoleConfig, multi: MultiProgress) -> Self {
        let store = SessionStore::open(FileBackend::new(&config.session_path));
        Self {
            config,
            store,
            multi,
        }
    }

    /// Builds the analytics client and probes the service once for the
    /// status badge.
    async fn connect(&self) -> Result<(Arc<dyn AnalyticsService>, ConnectivityState), ClientError> {
        let client = HttpAnalyticsClient::new(&self.config.client_config())?;
        let state = probe_reachability(&client.authority(), DEFAULT_PROBE_TIMEOUT).await;
        log::debug!("Using analytics service at {} ({state})", client.base_url());
        Ok((Arc::new(client), state))
    }
}

/// Runs the guard for `route` against the session as stored right now.
#[must_use]
pub fn guard(store: &SessionStore, route: Route) -> Authorization {
    authorize_route(store.current().as_ref(), route)
}

/// What to print instead of a dashboard the session may not open.
#[must_use]
pub fn redirect_notice(requested: Route, target: Route) -> String {
    let role = requested
        .required_role()
        .map_or("an authorized user", Role::label);
    format!(
        "{requested} requires signing in as {role}. \
         Redirecting to {target}: run `rural_health_console login`."
    )
}

/// Opens `route` if the current session is allowed to.
#[allow(clippy::future_not_send)]
pub async fn navigate(ctx: &Context, route: Route, batch: Option<i64>) -> CommandResult {
    if let Authorization::Redirect(target) = guard(&ctx.store, route) {
        println!("{}", style(redirect_notice(route, target)).yellow());
        return Ok(());
    }

    match route {
        Route::Login => whoami(ctx),
        Route::Admin => admin(ctx).await,
        Route::Driver => driver(ctx, batch.unwrap_or(ctx.config.batch_id)).await,
        Route::Officer => officer(ctx).await,
    }
}

/// Signs in, prompting for whatever was not given, then opens the role's
/// dashboard.
#[allow(clippy::future_not_send)]
pub async fn login(ctx: &Context, role: Option<Role>, id: Option<String>) -> CommandResult {
    let session = match (role, id) {
        (Some(role), Some(id)) => ctx.store.login(role, &id)?,
        (role, id) => prompt_login(&ctx.store, role, id)?,
    };

    let route = Route::for_role(session.role);
    println!("Signed in as {}. Navigating to {route}", session.role.label());
    navigate(ctx, route, None).await
}

fn prompt_login(
    store: &SessionStore,
    role: Option<Role>,
    mut id: Option<String>,
) -> Result<Session, Box<dyn std::error::Error>> {
    let role = if let Some(role) = role {
        role
    } else {
        let labels: Vec<&str> = Role::ALL.iter().map(|role| role.label()).collect();
        let idx = Select::new()
            .with_prompt("Role")
            .items(&labels)
            .default(0)
            .interact()?;
        Role::ALL[idx]
    };

    let hint: Vec<&str> = Role::ALL.iter().map(|role| role.prefix()).collect();
    loop {
        let identifier = match id.take() {
            Some(id) => id,
            None => Input::<String>::new()
                .with_prompt(format!("ID ({})", hint.join("/")))
                .interact_text()?,
        };

        match store.login(role, identifier.trim()) {
            Ok(session) => return Ok(session),
            Err(e @ SessionError::InvalidCredential { .. }) => {
                eprintln!("{}", style(e).red());
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Clears the session.
///
/// # Errors
///
/// Returns [`SessionError`] if the session file cannot be removed.
pub fn logout(ctx: &Context) -> Result<(), SessionError> {
    ctx.store.logout()?;
    println!("Signed out");
    Ok(())
}

/// Prints the navigation bar for the current session.
#[allow(clippy::unnecessary_wraps)]
pub fn whoami(ctx: &Context) -> CommandResult {
    println!("{}", render::navbar(ctx.store.current().as_ref()));
    Ok(())
}

fn outcome<T>(slot: &Slot<T>) -> Option<String> {
    match slot {
        Slot::Pending => None,
        Slot::Ready(_) => Some("ready".to_string()),
        Slot::Failed(message) => Some(message.clone()),
    }
}

/// Shows a spinner per source until the view settles, ticking each one
/// off as its slot fills.
/// Settles the spinner of every source with an outcome that has not been
/// settled yet, returning the sources settled by this call.
fn settle_spinners(
    spinners: &SourceSpinners,
    outcomes: Vec<(&'static str, Option<String>)>,
) -> Vec<&'static str> {
    let mut settled = Vec::new();
    for (name, outcome) in outcomes {
        if spinners.is_settled(name) {
            continue;
        }
        if let Some(outcome) = outcome {
            log::debug!("Source {name} settled: {outcome}");
            spinners.settle(name, &outcome);
            settled.push(name);
        }
    }
    settled
}

async fn follow<M, F>(view: &mut DashboardView<M>, spinners: &SourceSpinners, slots: F) -> M
where
    M: ViewModel,
    F: Fn(&M) -> Vec<(&'static str, Option<String>)>,
{
    loop {
        let model = view.snapshot();
        settle_spinners(spinners, slots(&model));

        if model.is_settled() {
            spinners.clear();
            return model;
        }
        if !view.changed().await {
            spinners.clear();
            return view.snapshot();
        }
    }
}

#[allow(clippy::future_not_send)]
async fn admin(ctx: &Context) -> CommandResult {
    let (service, state) = ctx.connect().await?;
    let mut view = activate_admin(service);

    let names: Vec<&'static str> = AdminViewModel::SOURCES.iter().map(|(name, _)| *name).collect();
    let spinners = SourceSpinners::start(&ctx.multi, &names);
    let model = follow(&mut view, &spinners, |m: &AdminViewModel| {
        vec![
            (source::HEATMAP, outcome(&m.heatmap)),
            (source::RANKING, outcome(&m.ranking)),
            (source::STATS, outcome(&m.stats)),
            (source::INVENTORY, outcome(&m.inventory)),
        ]
    })
    .await;

    print!("{}", render::admin_panel(&model, state));
    Ok(())
}

#[allow(clippy::future_not_send)]
async fn driver(ctx: &Context, batch_id: i64) -> CommandResult {
    let (service, state) = ctx.connect().await?;
    let mut view = activate_driver(service, batch_id);

    let spinners = SourceSpinners::start(&ctx.multi, &[source::ROUTE, source::HEATMAP]);
    let model = follow(&mut view, &spinners, |m: &DriverViewModel| {
        vec![
            (source::ROUTE, outcome(&m.route)),
            (source::HEATMAP, outcome(&m.heatmap)),
        ]
    })
    .await;

    print!("{}", render::driver_panel(&model, batch_id, state));
    Ok(())
}

async fn load_catalogs(ctx: &Context, service: Arc<dyn AnalyticsService>) -> OfficerViewModel {
    let mut view = activate_officer(service);
    let spinners = SourceSpinners::start(&ctx.multi, &[source::VILLAGES, source::DISEASES]);
    follow(&mut view, &spinners, |m: &OfficerViewModel| {
        vec![
            (source::VILLAGES, outcome(&m.villages)),
            (source::DISEASES, outcome(&m.diseases)),
        ]
    })
    .await
}

#[allow(clippy::future_not_send)]
async fn officer(ctx: &Context) -> CommandResult {
    let (service, state) = ctx.connect().await?;
    let model = load_catalogs(ctx, service).await;
    print!("{}", render::officer_panel(&model, state));
    Ok(())
}

/// Submits one test report, prompting for any field not given.
#[allow(clippy::future_not_send)]
pub async fn submit(ctx: &Context, args: ReportArgs) -> CommandResult {
    if let Authorization::Redirect(target) = guard(&ctx.store, Route::Officer) {
        println!("{}", style(redirect_notice(Route::Officer, target)).yellow());
        return Ok(());
    }

    let (service, _) = ctx.connect().await?;
    let catalogs = if args.village.is_none() || args.disease.is_none() {
        load_catalogs(ctx, Arc::clone(&service)).await
    } else {
        OfficerViewModel::default()
    };

    let mut form = ReportForm::new();
    let villages = catalogs.villages.value().map(Vec::as_slice);
    let diseases = catalogs.diseases.value().map(Vec::as_slice);
    fill(&mut form, FormField::VillageId, args.village, villages)?;
    fill(&mut form, FormField::DiseaseId, args.disease, diseases)?;
    fill(&mut form, FormField::TestsDone, args.tests, None)?;
    fill(&mut form, FormField::PositiveCases, args.positive, None)?;

    form.submit(service.as_ref()).await?;
    println!("{}", style("Report submitted successfully!").green());
    Ok(())
}

fn fill(
    form: &mut ReportForm,
    field: FormField,
    given: Option<String>,
    options: Option<&[CatalogEntry]>,
) -> Result<(), dialoguer::Error> {
    let value = match (given, options) {
        (Some(value), _) => value,
        (None, Some(options)) if !options.is_empty() => {
            let labels: Vec<String> = options
                .iter()
                .map(|entry| format!("{} ({})", entry.name, entry.id))
                .collect();
            let idx = Select::new()
                .with_prompt(field.label())
                .items(&labels)
                .default(0)
                .interact()?;
            options[idx].id.to_string()
        }
        (None, _) => Input::<String>::new()
            .with_prompt(field.label())
            .interact_text()?,
    };

    form.set(field, value);
    Ok(())
}

/// Prints the connectivity badge and every transition read from stdin.
///
/// The initial state comes from a single probe of the analytics service;
/// after that only the signal lines move it.
#[allow(clippy::future_not_send)]
pub async fn monitor(ctx: &Context) -> CommandResult {
    let client = HttpAnalyticsClient::new(&ctx.config.client_config())?;
    let initial = probe_reachability(&client.authority(), DEFAULT_PROBE_TIMEOUT).await;
    let tracker = Arc::new(ConnectivityTracker::new(initial));
    println!("{}", render::status_badge(tracker.current()));

    let mut rx = tracker.subscribe();
    let printer = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = *rx.borrow_and_update();
            println!("{}", render::status_badge(state));
        }
    });

    let listener = tracker.listen(line_signals(BufReader::new(tokio::io::stdin())));
    listener.finished().await;

    // Last sender gone: the printer drains any unseen state, then exits.
    drop(tracker);
    printer.await?;
    Ok(())
}
