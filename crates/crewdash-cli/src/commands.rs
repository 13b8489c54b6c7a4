//! Command handlers

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tracing::debug;

use crewdash_app::config::Config;
use crewdash_app::export::export_to_excel;
use crewdash_app::import::import_employees_csv;
use crewdash_app::repository::{open_api_client, open_api_client_at};
use crewdash_app::{
    spawn_refresh, DashboardState, LogNotifier, Notification, NotificationLevel, Notifier,
    OverheadService, ParameterService, SharedDashboard, Slider,
};
use crewdash_domain::model::{NewEmployee, ParameterUpdate, TruckDraft};
use crewdash_domain::repository::{
    DashboardSource, EmployeeRepository, OverheadGateway, ParameterGateway, TruckRepository,
};
use crewdash_domain::service::{fleet_metrics, truck_metrics};
use crewdash_infra::ApiClient;
use crewdash_types::{Error, OutputFormat, Result};

use crate::cli::{
    Cli, Commands, EmployeeFields, EmployeesAction, OverheadAction, ParamsAction, TruckFields,
    TrucksAction,
};
use crate::output;

/// Prints notifications to stderr and logs them.
///
/// Errors from a one-shot command come back as `Err` and are printed once by
/// `main`, so they are only shown here when `show_errors` is set (watch mode,
/// where refresh failures never reach `main`).
struct CliNotifier {
    show_errors: bool,
}

impl CliNotifier {
    fn for_command() -> Self {
        Self { show_errors: false }
    }

    fn for_watch() -> Self {
        Self { show_errors: true }
    }

    /// Line to print for `notification`, if any
    fn render(&self, notification: &Notification) -> Option<String> {
        let prefix = match notification.level {
            NotificationLevel::Success => "OK",
            NotificationLevel::Info => "Info",
            NotificationLevel::Error if self.show_errors => "Error",
            NotificationLevel::Error => return None,
        };
        Some(format!("{}: {}", prefix, notification.message))
    }
}

impl Notifier for CliNotifier {
    fn notify(&self, notification: Notification) {
        match self.render(&notification) {
            Some(line) => eprintln!("{}", line),
            None => debug!(message = %notification.message, "error left to the caller"),
        }
        if notification.level != NotificationLevel::Error {
            LogNotifier.notify(notification);
        }
    }
}

struct Context {
    config: Config,
    client: ApiClient,
    format: OutputFormat,
    notifier: CliNotifier,
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let Cli {
        command,
        api_url,
        format,
        verbose: _,
    } = cli;

    // config needs no API client
    let command = match command {
        Commands::Config {
            show,
            set_api_url,
            set_interval,
            set_timeout,
            set_output,
            reset,
        } => return cmd_config(show, set_api_url, set_interval, set_timeout, set_output, reset),
        other => other,
    };

    let config = Config::load()?;
    let client = match api_url {
        Some(ref url) => open_api_client_at(url, &config)?,
        None => open_api_client(&config)?,
    };
    let ctx = Context {
        format: format.unwrap_or(config.output_format),
        config,
        client,
        notifier: CliNotifier::for_command(),
    };
    debug!(api = %ctx.client.base_url(), format = %ctx.format, "client ready");

    match command {
        Commands::Dashboard { watch, interval } => {
            let interval = interval
                .map(Duration::from_secs)
                .unwrap_or_else(|| ctx.config.refresh_interval());
            if watch {
                cmd_dashboard_watch(ctx, interval).await
            } else {
                cmd_dashboard(&ctx).await
            }
        }

        Commands::Metrics => cmd_metrics(&ctx).await,

        Commands::Params { action } => match action {
            ParamsAction::Show => cmd_params_show(&ctx).await,
            ParamsAction::Set {
                efficiency,
                margin,
                rate,
                toggle_lock,
            } => cmd_params_set(&ctx, efficiency, margin, rate, toggle_lock).await,
            ParamsAction::Lock => cmd_params_lock(&ctx).await,
            ParamsAction::Slide { slider, position } => {
                cmd_params_slide(&ctx, slider, position).await
            }
        },

        Commands::Employees { action } => match action {
            EmployeesAction::List => cmd_employees_list(&ctx).await,
            EmployeesAction::Show { id } => cmd_employees_show(&ctx, &id).await,
            EmployeesAction::Add { fields } => cmd_employees_add(&ctx, fields).await,
            EmployeesAction::Update { id, fields } => cmd_employees_update(&ctx, &id, fields).await,
            EmployeesAction::Delete { id } => cmd_employees_delete(&ctx, &id).await,
            EmployeesAction::Import { file } => cmd_employees_import(&ctx, &file).await,
        },

        Commands::Trucks { action } => match action {
            TrucksAction::List => cmd_trucks_list(&ctx).await,
            TrucksAction::Show { id } => cmd_trucks_show(&ctx, &id).await,
            TrucksAction::Add { fields } => cmd_trucks_add(&ctx, fields).await,
            TrucksAction::Update { id, fields } => cmd_trucks_update(&ctx, &id, fields).await,
            TrucksAction::Delete { id } => cmd_trucks_delete(&ctx, &id).await,
        },

        Commands::Overhead { action } => match action {
            OverheadAction::Show => cmd_overhead_show(&ctx).await,
            OverheadAction::Set { key, amount } => cmd_overhead_set(&ctx, &key, amount).await,
            OverheadAction::Remove { key } => cmd_overhead_remove(&ctx, &key).await,
        },

        Commands::Export { output } => cmd_export(&ctx, output).await,

        // handled before the client is opened
        Commands::Config { .. } => Ok(()),
    }
}

async fn load_dashboard(ctx: &Context) -> Result<DashboardState> {
    let data = ctx.client.fetch_dashboard().await?;
    Ok(DashboardState::from_dashboard(data))
}

async fn cmd_dashboard(ctx: &Context) -> Result<()> {
    let state = load_dashboard(ctx).await?;
    output::print_dashboard(ctx.format, &state)
}

async fn cmd_dashboard_watch(ctx: Context, interval: Duration) -> Result<()> {
    if interval.is_zero() {
        return Err(Error::InvalidInput("interval must be at least 1 second".to_string()));
    }

    let shared = SharedDashboard::default();
    let source: Arc<dyn DashboardSource> = Arc::new(ctx.client.clone());
    let handle = spawn_refresh(source, shared.clone(), Arc::new(CliNotifier::for_watch()), interval);
    let mut updates = handle.subscribe();

    eprintln!(
        "Refreshing every {}s from {} (Ctrl-C to stop)",
        interval.as_secs(),
        ctx.client.base_url()
    );

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let result = loop {
        tokio::select! {
            _ = &mut ctrl_c => break Ok(()),
            changed = updates.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                if let Err(e) = output::print_dashboard(ctx.format, &shared.current()) {
                    break Err(e);
                }
            }
        }
    };

    handle.shutdown().await;
    result
}

async fn cmd_metrics(ctx: &Context) -> Result<()> {
    let state = load_dashboard(ctx).await?;
    let trucks = fleet_metrics(
        &state.snapshot.trucks,
        &state.snapshot.employees,
        state.parameters.efficiency_rate,
        state.metrics.hourly_rate,
    );
    output::print_metrics(ctx.format, &state, &trucks)
}

async fn cmd_params_show(ctx: &Context) -> Result<()> {
    let params = ctx.client.fetch_parameters().await?;
    output::print_parameters(ctx.format, &params)
}

async fn cmd_params_set(
    ctx: &Context,
    efficiency: Option<f64>,
    margin: Option<f64>,
    rate: Option<f64>,
    toggle_lock: bool,
) -> Result<()> {
    let mut update = ParameterUpdate::new().preserving_lock(!toggle_lock);
    if let Some(v) = efficiency {
        update = update.with_efficiency_rate(v);
    }
    if let Some(v) = margin {
        update = update.with_profit_margin_multiplier(v);
    }
    if let Some(v) = rate {
        update = update.with_hourly_rate(v);
    }

    let state = loaded_state(ctx).await?;
    let service = ParameterService::new(&ctx.client, &state, &ctx.notifier);
    service.save(&update).await?;
    output::print_parameters(ctx.format, &state.current().parameters)
}

/// Display state freshly loaded from the server
async fn loaded_state(ctx: &Context) -> Result<SharedDashboard> {
    Ok(SharedDashboard::new(load_dashboard(ctx).await?))
}

async fn cmd_params_lock(ctx: &Context) -> Result<()> {
    let state = loaded_state(ctx).await?;
    let service = ParameterService::new(&ctx.client, &state, &ctx.notifier);
    service.toggle_lock().await?;
    output::print_parameters(ctx.format, &state.current().parameters)
}

async fn cmd_params_slide(ctx: &Context, slider: Slider, position: f64) -> Result<()> {
    let state = loaded_state(ctx).await?;
    let service = ParameterService::new(&ctx.client, &state, &ctx.notifier);
    service.slide(slider, position).await?;
    let params = state.current().parameters;
    if ctx.format == OutputFormat::Table {
        println!("{}: {}", slider.label(), slider.display(&params));
    }
    output::print_parameters(ctx.format, &params)
}

async fn cmd_employees_list(ctx: &Context) -> Result<()> {
    let employees = EmployeeRepository::find_all(&ctx.client).await?;
    output::print_employees(ctx.format, &employees)
}

async fn cmd_employees_show(ctx: &Context, id: &str) -> Result<()> {
    let employee = EmployeeRepository::find_by_id(&ctx.client, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("employee {}", id)))?;
    output::print_employee(ctx.format, &employee)
}

fn apply_employee_fields(mut employee: NewEmployee, fields: EmployeeFields) -> NewEmployee {
    if let Some(name) = fields.name {
        employee.name = name;
    }
    if let Some(phone) = fields.phone {
        employee.phone = phone;
    }
    if let Some(email) = fields.email {
        employee.email = email;
    }
    if let Some(position) = fields.position {
        employee.position = position;
    }
    if let Some(hours) = fields.hours {
        employee.hours_per_week = hours;
    }
    if let Some(wage) = fields.wage {
        employee.hourly_wage = wage;
    }
    employee
}

async fn cmd_employees_add(ctx: &Context, fields: EmployeeFields) -> Result<()> {
    let employee = apply_employee_fields(NewEmployee::default(), fields);
    let id = EmployeeRepository::add(&ctx.client, &employee).await?;
    ctx.notifier
        .notify(Notification::success(format!("Employee {} added", employee.name)));
    if ctx.format == OutputFormat::Json {
        println!("{}", serde_json::json!({ "employee_id": id }));
    } else {
        println!("Employee ID: {}", id);
    }
    Ok(())
}

async fn cmd_employees_update(ctx: &Context, id: &str, fields: EmployeeFields) -> Result<()> {
    let existing = EmployeeRepository::find_by_id(&ctx.client, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("employee {}", id)))?;
    let employee = apply_employee_fields(NewEmployee::from(&existing), fields);
    EmployeeRepository::update(&ctx.client, id, &employee).await?;
    ctx.notifier
        .notify(Notification::success(format!("Employee {} updated", employee.name)));
    Ok(())
}

async fn cmd_employees_delete(ctx: &Context, id: &str) -> Result<()> {
    EmployeeRepository::delete(&ctx.client, id).await?;
    ctx.notifier
        .notify(Notification::success(format!("Employee {} deleted", id)));
    Ok(())
}

async fn cmd_employees_import(ctx: &Context, file: &Path) -> Result<()> {
    let report = import_employees_csv(&ctx.client, file, &ctx.notifier).await?;
    output::print_import_report(ctx.format, &report)?;
    if report.is_clean() {
        Ok(())
    } else {
        Err(Error::Csv(format!(
            "{} row(s) could not be imported",
            report.failed.len()
        )))
    }
}

async fn cmd_trucks_list(ctx: &Context) -> Result<()> {
    let trucks = TruckRepository::find_all(&ctx.client).await?;
    let roster = EmployeeRepository::find_all(&ctx.client).await?;
    output::print_trucks(ctx.format, &trucks, &roster)
}

async fn cmd_trucks_show(ctx: &Context, id: &str) -> Result<()> {
    let truck = TruckRepository::find_by_id(&ctx.client, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("truck {}", id)))?;
    let roster = EmployeeRepository::find_all(&ctx.client).await?;
    let state = load_dashboard(ctx).await?;
    let metrics = truck_metrics(
        &truck,
        &roster,
        state.parameters.efficiency_rate,
        state.metrics.hourly_rate,
    );
    output::print_truck(ctx.format, &truck, &roster, &metrics)
}

fn apply_truck_fields(mut draft: TruckDraft, fields: TruckFields) -> TruckDraft {
    if let Some(name) = fields.name {
        draft.name = name;
    }
    if let Some(status) = fields.status {
        draft.status = status;
    }
    if let Some(make) = fields.make {
        draft.make = make;
    }
    if let Some(model) = fields.model {
        draft.model = model;
    }
    if let Some(year) = fields.year {
        draft.year = year;
    }
    if let Some(plate) = fields.plate {
        draft.license_plate = plate;
    }
    if let Some(v) = fields.loan {
        draft.loan_payment = v;
    }
    if let Some(v) = fields.insurance {
        draft.insurance = v;
    }
    if let Some(v) = fields.fuel {
        draft.fuel_budget = v;
    }
    if let Some(v) = fields.maintenance {
        draft.maintenance_budget = v;
    }
    if let Some(v) = fields.other {
        draft.other_expenses = v;
    }
    if let Some(hours) = fields.hours {
        draft.effective_hours = Some(hours);
    }
    if let Some(crew) = fields.crew {
        draft.employee_ids = crew.into_iter().filter(|id| !id.trim().is_empty()).collect();
    }
    if let Some(area) = fields.service_area {
        draft.service_area = area;
    }
    if let Some(notes) = fields.notes {
        draft.notes = notes;
    }
    draft
}

async fn cmd_trucks_add(ctx: &Context, fields: TruckFields) -> Result<()> {
    let draft = apply_truck_fields(TruckDraft::default(), fields);
    let id = TruckRepository::add(&ctx.client, &draft).await?;
    ctx.notifier
        .notify(Notification::success(format!("Truck {} added", draft.name)));
    if ctx.format == OutputFormat::Json {
        println!("{}", serde_json::json!({ "truck_id": id }));
    } else {
        println!("Truck ID: {}", id);
    }
    Ok(())
}

async fn cmd_trucks_update(ctx: &Context, id: &str, fields: TruckFields) -> Result<()> {
    let existing = TruckRepository::find_by_id(&ctx.client, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("truck {}", id)))?;
    let draft = apply_truck_fields(TruckDraft::from(&existing), fields);
    TruckRepository::update(&ctx.client, id, &draft).await?;
    ctx.notifier
        .notify(Notification::success(format!("Truck {} updated", draft.name)));
    Ok(())
}

async fn cmd_trucks_delete(ctx: &Context, id: &str) -> Result<()> {
    TruckRepository::delete(&ctx.client, id).await?;
    ctx.notifier
        .notify(Notification::success(format!("Truck {} deleted", id)));
    Ok(())
}

async fn cmd_overhead_show(ctx: &Context) -> Result<()> {
    let costs = ctx.client.fetch_overhead().await?;
    output::print_overhead(ctx.format, &costs)
}

async fn cmd_overhead_set(ctx: &Context, key: &str, amount: f64) -> Result<()> {
    let service = OverheadService::new(&ctx.client, &ctx.notifier);
    let costs = service.set(key, amount).await?;
    output::print_overhead(ctx.format, &costs)
}

async fn cmd_overhead_remove(ctx: &Context, key: &str) -> Result<()> {
    let service = OverheadService::new(&ctx.client, &ctx.notifier);
    let costs = service.remove(key).await?;
    output::print_overhead(ctx.format, &costs)
}

async fn cmd_export(ctx: &Context, output: Option<PathBuf>) -> Result<()> {
    let state = load_dashboard(ctx).await?;
    let output_path = output.unwrap_or_else(|| {
        PathBuf::from(format!(
            "crewdash_{}.xlsx",
            Local::now().format("%Y%m%d_%H%M%S")
        ))
    });

    export_to_excel(&state, &output_path)?;
    ctx.notifier.notify(Notification::success(format!(
        "Exported dashboard to {}",
        output_path.display()
    )));
    Ok(())
}

fn cmd_config(
    show: bool,
    set_api_url: Option<String>,
    set_interval: Option<u64>,
    set_timeout: Option<u64>,
    set_output: Option<OutputFormat>,
    reset: bool,
) -> Result<()> {
    if reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        println!("\n{}", config);
        return Ok(());
    }

    let mut config = Config::load()?;
    let mut modified = false;

    if let Some(url) = set_api_url {
        config.api_base_url = url.trim().trim_end_matches('/').to_string();
        modified = true;
    }

    if let Some(secs) = set_interval {
        config.refresh_interval_secs = secs;
        modified = true;
    }

    if let Some(secs) = set_timeout {
        config.request_timeout_secs = secs;
        modified = true;
    }

    if let Some(output_format) = set_output {
        config.output_format = output_format;
        modified = true;
    }

    if modified {
        config.save()?;
        println!("Configuration updated");
    }

    if show || !modified {
        println!("{}", config);
    }

    Ok(())
}
