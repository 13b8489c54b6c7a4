//! Output formatting module

use serde::Serialize;
use serde_json::json;

use crewdash_app::import::ImportReport;
use crewdash_app::view::{
    metric_fields, parameter_fields, server_metric_fields, truck_rows, truck_summary_fields,
    DisplayField, Tone,
};
use crewdash_app::DashboardState;
use crewdash_domain::model::{is_excluded_key, BusinessParameters, Employee, OverheadCosts, Truck};
use crewdash_domain::service::TruckMetrics;
use crewdash_types::{format_currency, format_number, OutputFormat, Result};

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    println!("{}", content);
    Ok(())
}

fn print_heading(title: &str) {
    println!("\n{}", title);
    println!("{}", "=".repeat(title.chars().count()));
}

fn print_field_table(fields: &[DisplayField]) {
    for f in fields {
        let marker = match f.tone {
            Tone::Negative => " (!)",
            _ => "",
        };
        println!("{:<32} {:>16}{}", format!("{}:", f.label), f.value, marker);
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        s.to_string()
    }
}

pub fn print_dashboard(format: OutputFormat, state: &DashboardState) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(&json!({
            "parameters": state.parameters,
            "metrics": state.server_metrics,
            "truck_summary": state.truck_summary,
            "last_updated": state.last_updated,
        }));
    }

    print_heading("Dashboard");
    if let Some(updated) = state.last_updated {
        println!("As of {}", updated.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    println!();
    print_field_table(&server_metric_fields(&state.server_metrics));

    print_heading("Parameters");
    print_field_table(&parameter_fields(&state.parameters));

    print_heading("Fleet");
    print_field_table(&truck_summary_fields(&state.truck_summary));
    Ok(())
}

pub fn print_metrics(
    format: OutputFormat,
    state: &DashboardState,
    trucks: &[TruckMetrics],
) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(&json!({
            "metrics": state.metrics,
            "trucks": trucks,
            "server_total_expenses": state.server_metrics.total_expenses,
        }));
    }

    print_heading("Metrics (computed locally)");
    print_field_table(&metric_fields(&state.metrics));

    let server_total = state.server_metrics.total_expenses;
    if (server_total - state.metrics.total_expenses).abs() >= 0.005 {
        println!(
            "\nNote: server reports total expenses of {}",
            format_currency(server_total)
        );
    }

    print_heading("Per Truck (monthly)");
    if trucks.is_empty() {
        println!("No trucks found.");
        return Ok(());
    }
    println!(
        "{:<24} {:>10} {:>10} {:>14} {:>14} {:>14}",
        "Truck", "Wk Hours", "Billable", "Revenue", "Expenses", "Profit"
    );
    println!("{}", "-".repeat(91));
    for row in truck_rows(trucks) {
        println!(
            "{:<24} {:>10} {:>10} {:>14} {:>14} {:>14}",
            truncate(&row.name, 24),
            row.weekly_hours,
            row.billable_hours,
            row.revenue,
            row.expenses,
            row.profit
        );
    }
    Ok(())
}

pub fn print_parameters(format: OutputFormat, params: &BusinessParameters) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(params);
    }
    print_heading("Business Parameters");
    print_field_table(&parameter_fields(params));
    Ok(())
}

pub fn print_overhead(format: OutputFormat, costs: &OverheadCosts) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(&json!({
            "overhead_costs": costs,
            "counted_total": costs.generic_total(),
            "raw_total": costs.raw_total(),
        }));
    }

    print_heading("Monthly Overhead");
    if costs.is_empty() {
        println!("No overhead categories.");
        return Ok(());
    }
    for (key, amount) in costs.iter() {
        let marker = if is_excluded_key(key) { "  (not counted)" } else { "" };
        println!("{:<32} {:>14}{}", truncate(key, 32), format_currency(amount), marker);
    }
    println!("{}", "-".repeat(47));
    println!("{:<32} {:>14}", "Counted in expenses:", format_currency(costs.generic_total()));
    Ok(())
}

pub fn print_employees(format: OutputFormat, employees: &[Employee]) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(employees);
    }

    print_heading("Employees");
    if employees.is_empty() {
        println!("No employees found.");
        return Ok(());
    }
    println!(
        "{:<38} {:<22} {:<16} {:>8} {:>10} {:>12}",
        "ID", "Name", "Position", "Hrs/Wk", "Wage", "Monthly"
    );
    println!("{}", "-".repeat(111));
    for e in employees {
        println!(
            "{:<38} {:<22} {:<16} {:>8} {:>10} {:>12}",
            truncate(&e.id, 38),
            truncate(&e.name, 22),
            truncate(&e.position, 16),
            format_number(e.hours_per_week),
            format_currency(e.hourly_wage),
            format_currency(e.monthly_wage())
        );
    }
    println!("\nTotal: {} employee(s)", employees.len());
    Ok(())
}

pub fn print_employee(format: OutputFormat, e: &Employee) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(e);
    }
    print_heading(&format!("Employee {}", e.name));
    println!("ID:            {}", e.id);
    println!("Position:      {}", e.position);
    println!("Phone:         {}", e.phone);
    println!("Email:         {}", e.email);
    println!("Hours/week:    {}", format_number(e.hours_per_week));
    println!("Hourly wage:   {}", format_currency(e.hourly_wage));
    println!("Monthly wage:  {}", format_currency(e.monthly_wage()));
    if let Some(ref created) = e.created_at {
        println!("Created:       {}", created);
    }
    Ok(())
}

pub fn print_trucks(format: OutputFormat, trucks: &[Truck], roster: &[Employee]) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(trucks);
    }

    print_heading("Trucks");
    if trucks.is_empty() {
        println!("No trucks found.");
        return Ok(());
    }
    println!(
        "{:<38} {:<20} {:<12} {:>6} {:>10} {:>14}",
        "ID", "Name", "Status", "Crew", "Wk Hours", "Monthly Cost"
    );
    println!("{}", "-".repeat(105));
    for t in trucks {
        println!(
            "{:<38} {:<20} {:<12} {:>6} {:>10} {:>14}",
            truncate(&t.id, 38),
            truncate(&t.name, 20),
            truncate(&t.status, 12),
            t.crew(roster).len(),
            format_number(t.weekly_hours(roster)),
            format_currency(t.monthly_expense(roster))
        );
    }
    println!("\nTotal: {} truck(s)", trucks.len());
    Ok(())
}

pub fn print_truck(
    format: OutputFormat,
    truck: &Truck,
    roster: &[Employee],
    metrics: &TruckMetrics,
) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(&json!({ "truck": truck, "metrics": metrics }));
    }

    print_heading(&format!("Truck {}", truck.name));
    println!("ID:               {}", truck.id);
    println!("Status:           {}", truck.status);
    let vehicle: Vec<&str> = [truck.year.as_str(), truck.make.as_str(), truck.model.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();
    if !vehicle.is_empty() {
        println!("Vehicle:          {}", vehicle.join(" "));
    }
    if !truck.license_plate.is_empty() {
        println!("License plate:    {}", truck.license_plate);
    }
    if !truck.service_area.is_empty() {
        println!("Service area:     {}", truck.service_area);
    }

    println!("\n--- Monthly costs ---");
    println!("Loan payment:     {:>12}", format_currency(truck.loan_payment));
    println!("Insurance:        {:>12}", format_currency(truck.insurance));
    println!("Fuel:             {:>12}", format_currency(truck.fuel_budget));
    println!("Maintenance:      {:>12}", format_currency(truck.maintenance_budget));
    println!("Other:            {:>12}", format_currency(truck.other_expenses));
    println!("Crew wages:       {:>12}", format_currency(metrics.crew_wages));
    println!("Total:            {:>12}", format_currency(metrics.total_monthly_expenses));

    println!("\n--- Crew ---");
    let crew = truck.crew(roster);
    if crew.is_empty() {
        println!("(no crew assigned)");
    }
    for e in crew {
        println!(
            "  {:<24} {:>8} h/wk  {:>10}/h",
            truncate(&e.name, 24),
            format_number(e.hours_per_week),
            format_currency(e.hourly_wage)
        );
    }

    println!("\n--- Projection ---");
    println!("Weekly hours:     {:>12}", format_number(metrics.weekly_hours));
    println!("Billable hours:   {:>12}", format_number(metrics.monthly_billable_hours));
    println!("Revenue:          {:>12}", format_currency(metrics.monthly_revenue));
    println!("Profit:           {:>12}", format_currency(metrics.monthly_profit));

    if !truck.notes.is_empty() {
        println!("\nNotes: {}", truck.notes);
    }
    Ok(())
}

pub fn print_import_report(format: OutputFormat, report: &ImportReport) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(report);
    }

    print_heading("Employee Import");
    for added in &report.added {
        println!("  row {:>4}  added   {} ({})", added.row, added.name, added.id);
    }
    for failed in &report.failed {
        println!("  row {:>4}  FAILED  {}: {}", failed.row, failed.name, failed.error);
    }
    println!(
        "\n{} added, {} failed",
        report.added.len(),
        report.failed.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long truck name", 10), "a very ...");
    }
}
