//! Excel export of the dashboard

use std::path::Path;

use chrono::Utc;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crewdash_domain::service::fleet_metrics;
use crewdash_types::{Error, Result};

use crate::dashboard::DashboardState;

const CURRENCY_FORMAT: &str = "$#,##0.00";
const HOURS_FORMAT: &str = "#,##0.00";

fn excel_err(e: XlsxError) -> Error {
    Error::Excel(e.to_string())
}

enum Cell {
    Currency(f64),
    Hours(f64),
    Percent(f64),
    Text(String),
}

/// Export the current dashboard to an `.xlsx` file
pub fn export_to_excel(state: &DashboardState, output_path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    let summary_sheet = workbook.add_worksheet();
    write_summary_sheet(summary_sheet, state)?;

    let trucks_sheet = workbook.add_worksheet();
    write_trucks_sheet(trucks_sheet, state)?;

    workbook.save(output_path).map_err(excel_err)?;

    Ok(())
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, cell: &Cell) -> Result<()> {
    match cell {
        Cell::Currency(v) => {
            let format = Format::new().set_num_format(CURRENCY_FORMAT);
            sheet.write_number_with_format(row, col, *v, &format)
        }
        Cell::Hours(v) => {
            let format = Format::new().set_num_format(HOURS_FORMAT);
            sheet.write_number_with_format(row, col, *v, &format)
        }
        Cell::Percent(v) => {
            // stored as a fraction so Excel shows it as a percentage
            let format = Format::new().set_num_format("0.00%");
            sheet.write_number_with_format(row, col, *v / 100.0, &format)
        }
        Cell::Text(s) => sheet.write_string(row, col, s),
    }
    .map_err(excel_err)?;
    Ok(())
}

fn write_section(
    sheet: &mut Worksheet,
    start_row: u32,
    title: &str,
    rows: &[(&str, Cell)],
) -> Result<u32> {
    let header_format = Format::new().set_bold();
    sheet
        .write_string_with_format(start_row, 0, title, &header_format)
        .map_err(excel_err)?;

    let mut row = start_row + 1;
    for (label, cell) in rows {
        sheet.write_string(row, 0, *label).map_err(excel_err)?;
        write_cell(sheet, row, 1, cell)?;
        row += 1;
    }
    Ok(row + 1)
}

fn write_summary_sheet(sheet: &mut Worksheet, state: &DashboardState) -> Result<()> {
    sheet.set_name("Summary").map_err(excel_err)?;

    let title_format = Format::new().set_bold();
    sheet
        .write_string_with_format(0, 0, "Crew Operations Dashboard", &title_format)
        .map_err(excel_err)?;
    sheet.write_string(1, 0, "Generated:").map_err(excel_err)?;
    sheet
        .write_string(1, 1, Utc::now().to_rfc3339())
        .map_err(excel_err)?;
    if let Some(updated) = state.last_updated {
        sheet.write_string(2, 0, "Data as of:").map_err(excel_err)?;
        sheet
            .write_string(2, 1, updated.to_rfc3339())
            .map_err(excel_err)?;
    }

    let p = &state.parameters;
    let parameters = [
        ("Efficiency rate", Cell::Percent(p.efficiency_rate * 100.0)),
        (
            "Profit margin multiplier",
            Cell::Percent(p.profit_margin_multiplier * 100.0),
        ),
        ("Hourly rate", Cell::Currency(p.hourly_rate)),
        ("Rate lock", Cell::Text(p.lock_state.label().to_string())),
    ];
    let row = write_section(sheet, 4, "Parameters", &parameters)?;

    let m = &state.metrics;
    let expenses = [
        ("Overhead", Cell::Currency(m.overhead_total)),
        ("Overhead excluded", Cell::Currency(m.excluded_overhead_total)),
        ("Truck expenses", Cell::Currency(m.truck_expense_total)),
        ("Unassigned staff wages", Cell::Currency(m.unassigned_wage_total)),
        ("Total monthly expenses", Cell::Currency(m.total_expenses)),
        ("All employee wages", Cell::Currency(m.wage_total)),
    ];
    let row = write_section(sheet, row, "Expenses", &expenses)?;

    let pricing = [
        ("Weekly hours", Cell::Hours(m.weekly_hours)),
        ("Available hours", Cell::Hours(m.available_hours)),
        ("Billable hours", Cell::Hours(m.billable_hours)),
        ("Cost per hour", Cell::Currency(m.cost_per_hour)),
        ("Recommended rate", Cell::Currency(m.recommended_rate)),
        ("Hourly rate", Cell::Currency(m.hourly_rate)),
    ];
    let row = write_section(sheet, row, "Pricing", &pricing)?;

    let projections = [
        ("Monthly revenue", Cell::Currency(m.monthly_revenue)),
        ("Yearly revenue", Cell::Currency(m.yearly_revenue)),
        ("Monthly profit", Cell::Currency(m.monthly_profit)),
        ("Yearly profit", Cell::Currency(m.yearly_profit)),
        ("Monthly margin", Cell::Percent(m.monthly_margin_percent)),
        ("Yearly margin", Cell::Percent(m.yearly_margin_percent)),
    ];
    write_section(sheet, row, "Projections", &projections)?;

    sheet.set_column_width(0, 28).map_err(excel_err)?;
    sheet.set_column_width(1, 18).map_err(excel_err)?;

    Ok(())
}

fn write_trucks_sheet(sheet: &mut Worksheet, state: &DashboardState) -> Result<()> {
    sheet.set_name("Trucks").map_err(excel_err)?;

    let header_format = Format::new().set_bold();
    let headers = [
        "Truck",
        "Status",
        "Weekly Hours",
        "Monthly Hours",
        "Billable Hours",
        "Revenue",
        "Vehicle Expenses",
        "Crew Wages",
        "Total Expenses",
        "Profit",
    ];
    for (col, header) in headers.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(excel_err)?;
    }

    let trucks = &state.snapshot.trucks;
    let metrics = fleet_metrics(
        trucks,
        &state.snapshot.employees,
        state.parameters.efficiency_rate,
        state.metrics.hourly_rate,
    );

    for (idx, (truck, m)) in trucks.iter().zip(&metrics).enumerate() {
        let row = (idx + 1) as u32;
        let cells = [
            Cell::Text(m.name.clone()),
            Cell::Text(truck.status.clone()),
            Cell::Hours(m.weekly_hours),
            Cell::Hours(m.monthly_hours),
            Cell::Hours(m.monthly_billable_hours),
            Cell::Currency(m.monthly_revenue),
            Cell::Currency(m.vehicle_expenses),
            Cell::Currency(m.crew_wages),
            Cell::Currency(m.total_monthly_expenses),
            Cell::Currency(m.monthly_profit),
        ];
        for (col, cell) in cells.iter().enumerate() {
            write_cell(sheet, row, col as u16, cell)?;
        }
    }

    sheet.set_column_width(0, 24).map_err(excel_err)?;
    for col in 1..headers.len() as u16 {
        sheet.set_column_width(col, 16).map_err(excel_err)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::testing::sample_dashboard;

    #[test]
    fn test_export_writes_xlsx() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.xlsx");
        let state = DashboardState::from_dashboard(sample_dashboard());

        export_to_excel(&state, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        // xlsx is a zip container
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_export_empty_dashboard() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");
        export_to_excel(&DashboardState::default(), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("out.xlsx");
        let err = export_to_excel(&DashboardState::default(), &path).unwrap_err();
        assert!(matches!(err, Error::Excel(_)));
    }
}
