//! Display fields for the dashboard view
//!
//! Maps metrics onto `(key, label, formatted value)` rows. Currency is
//! `$X,XXX.XX`, hours use grouped decimals, margins are percentages.

use serde::Serialize;

use crewdash_domain::model::{BusinessParameters, ServerMetrics, TruckSummary};
use crewdash_domain::service::{margin_percent, Metrics, TruckMetrics};
use crewdash_types::{format_currency, format_number, format_percent};

/// Sign of a value, used to colour profit figures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    Negative,
    Neutral,
}

impl Tone {
    pub fn of(value: f64) -> Self {
        if value > 0.0 {
            Tone::Positive
        } else if value < 0.0 {
            Tone::Negative
        } else {
            Tone::Neutral
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayField {
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
    pub tone: Tone,
}

impl DisplayField {
    fn plain(key: &'static str, label: &'static str, value: String) -> Self {
        Self {
            key,
            label,
            value,
            tone: Tone::Neutral,
        }
    }

    fn signed(key: &'static str, label: &'static str, value: String, raw: f64) -> Self {
        Self {
            key,
            label,
            value,
            tone: Tone::of(raw),
        }
    }
}

/// Fields for the metrics reported by the server
pub fn server_metric_fields(m: &ServerMetrics) -> Vec<DisplayField> {
    let monthly_margin = margin_percent(m.monthly_profit, m.monthly_revenue_potential);
    let yearly_margin = margin_percent(m.yearly_profit, m.yearly_revenue_potential);
    vec![
        DisplayField::plain("total_expenses", "Total monthly expenses", format_currency(m.total_expenses)),
        DisplayField::plain("available_hours", "Available hours", format_number(m.available_hours)),
        DisplayField::plain("billable_hours", "Billable hours", format_number(m.billable_hours)),
        DisplayField::plain("cost_per_hour", "Cost per hour", format_currency(m.cost_per_hour)),
        DisplayField::plain("hourly_rate", "Hourly rate", format_currency(m.hourly_rate)),
        DisplayField::plain("recommended_rate", "Recommended rate", format_currency(m.recommended_rate)),
        DisplayField::plain("rate_lock", "Rate lock", m.lock_state().label().to_string()),
        DisplayField::plain(
            "monthly_revenue_potential",
            "Monthly revenue",
            format_currency(m.monthly_revenue_potential),
        ),
        DisplayField::plain(
            "yearly_revenue_potential",
            "Yearly revenue",
            format_currency(m.yearly_revenue_potential),
        ),
        DisplayField::signed("monthly_profit", "Monthly profit", format_currency(m.monthly_profit), m.monthly_profit),
        DisplayField::signed("yearly_profit", "Yearly profit", format_currency(m.yearly_profit), m.yearly_profit),
        DisplayField::signed("monthly_margin", "Monthly margin", format_percent(monthly_margin), monthly_margin),
        DisplayField::signed("yearly_margin", "Yearly margin", format_percent(yearly_margin), yearly_margin),
    ]
}

/// Fields for locally computed metrics, including the expense breakdown
pub fn metric_fields(m: &Metrics) -> Vec<DisplayField> {
    vec![
        DisplayField::plain("overhead_total", "Overhead", format_currency(m.overhead_total)),
        DisplayField::plain(
            "excluded_overhead_total",
            "Overhead excluded (vehicle/wage)",
            format_currency(m.excluded_overhead_total),
        ),
        DisplayField::plain("truck_expense_total", "Truck expenses", format_currency(m.truck_expense_total)),
        DisplayField::plain(
            "unassigned_wage_total",
            "Unassigned staff wages",
            format_currency(m.unassigned_wage_total),
        ),
        DisplayField::plain("total_expenses", "Total monthly expenses", format_currency(m.total_expenses)),
        DisplayField::plain("wage_total", "All employee wages", format_currency(m.wage_total)),
        DisplayField::plain("weekly_hours", "Weekly hours", format_number(m.weekly_hours)),
        DisplayField::plain("available_hours", "Available hours", format_number(m.available_hours)),
        DisplayField::plain("billable_hours", "Billable hours", format_number(m.billable_hours)),
        DisplayField::plain("cost_per_hour", "Cost per hour", format_currency(m.cost_per_hour)),
        DisplayField::plain("recommended_rate", "Recommended rate", format_currency(m.recommended_rate)),
        DisplayField::plain("hourly_rate", "Hourly rate", format_currency(m.hourly_rate)),
        DisplayField::plain("rate_lock", "Rate lock", m.lock_state.label().to_string()),
        DisplayField::plain("monthly_revenue", "Monthly revenue", format_currency(m.monthly_revenue)),
        DisplayField::plain("yearly_revenue", "Yearly revenue", format_currency(m.yearly_revenue)),
        DisplayField::signed("monthly_profit", "Monthly profit", format_currency(m.monthly_profit), m.monthly_profit),
        DisplayField::signed("yearly_profit", "Yearly profit", format_currency(m.yearly_profit), m.yearly_profit),
        DisplayField::signed(
            "monthly_margin",
            "Monthly margin",
            format_percent(m.monthly_margin_percent),
            m.monthly_margin_percent,
        ),
        DisplayField::signed(
            "yearly_margin",
            "Yearly margin",
            format_percent(m.yearly_margin_percent),
            m.yearly_margin_percent,
        ),
    ]
}

pub fn parameter_fields(p: &BusinessParameters) -> Vec<DisplayField> {
    vec![
        DisplayField::plain(
            "efficiency_rate",
            "Efficiency rate",
            format!("{}%", (p.efficiency_rate * 100.0).round()),
        ),
        DisplayField::plain(
            "profit_margin_multiplier",
            "Profit margin multiplier",
            format!("{}%", (p.profit_margin_multiplier * 100.0).round()),
        ),
        DisplayField::plain("hourly_rate", "Hourly rate", format_currency(p.hourly_rate)),
        DisplayField::plain("rate_lock", "Rate lock", p.lock_state.label().to_string()),
    ]
}

pub fn truck_summary_fields(s: &TruckSummary) -> Vec<DisplayField> {
    vec![
        DisplayField::plain("total_trucks", "Trucks", s.total_trucks.to_string()),
        DisplayField::plain("active_trucks", "Active trucks", s.active_trucks.to_string()),
        DisplayField::plain("total_weekly_hours", "Weekly hours", format_number(s.total_weekly_hours)),
        DisplayField::plain(
            "total_monthly_expenses",
            "Truck expenses (monthly)",
            format_currency(s.total_monthly_expenses),
        ),
        DisplayField::plain("crew_count", "Crew members", s.crew_count.to_string()),
    ]
}

/// One formatted row per truck
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TruckRow {
    pub name: String,
    pub weekly_hours: String,
    pub billable_hours: String,
    pub revenue: String,
    pub expenses: String,
    pub profit: String,
    pub tone: Tone,
}

pub fn truck_rows(metrics: &[TruckMetrics]) -> Vec<TruckRow> {
    metrics
        .iter()
        .map(|m| TruckRow {
            name: m.name.clone(),
            weekly_hours: format_number(m.weekly_hours),
            billable_hours: format_number(m.monthly_billable_hours),
            revenue: format_currency(m.monthly_revenue),
            expenses: format_currency(m.total_monthly_expenses),
            profit: format_currency(m.monthly_profit),
            tone: Tone::of(m.monthly_profit),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::testing::sample_dashboard;
    use crate::dashboard::DashboardState;

    fn field<'a>(fields: &'a [DisplayField], key: &str) -> &'a DisplayField {
        fields.iter().find(|f| f.key == key).unwrap()
    }

    #[test]
    fn test_server_fields_format_currency_and_margin() {
        let state = DashboardState::from_dashboard(sample_dashboard());
        let fields = server_metric_fields(&state.server_metrics);
        assert_eq!(field(&fields, "total_expenses").value, "$5,950.00");
        assert_eq!(field(&fields, "monthly_profit").value, "$2,050.00");
        assert_eq!(field(&fields, "monthly_profit").tone, Tone::Positive);
        assert!(field(&fields, "monthly_margin").value.starts_with("25.6"));
        assert_eq!(field(&fields, "rate_lock").value, "locked");
        // yearly revenue absent -> zero revenue -> zero margin
        assert_eq!(field(&fields, "yearly_margin").value, "0.00%");
    }

    #[test]
    fn test_negative_profit_tone() {
        let m = Metrics {
            monthly_profit: -2500.0,
            ..Default::default()
        };
        let fields = metric_fields(&m);
        let profit = field(&fields, "monthly_profit");
        assert_eq!(profit.value, "-$2,500.00");
        assert_eq!(profit.tone, Tone::Negative);
        assert_eq!(field(&fields, "yearly_profit").tone, Tone::Neutral);
    }

    #[test]
    fn test_local_breakdown_fields() {
        let state = DashboardState::from_dashboard(sample_dashboard());
        let fields = metric_fields(&state.metrics);
        assert_eq!(field(&fields, "overhead_total").value, "$1,200.00");
        assert_eq!(field(&fields, "truck_expense_total").value, "$4,350.00");
        assert_eq!(field(&fields, "unassigned_wage_total").value, "$400.00");
        assert_eq!(field(&fields, "billable_hours").value, "80.00");
    }

    #[test]
    fn test_parameter_fields() {
        let fields = parameter_fields(&BusinessParameters::default());
        assert_eq!(field(&fields, "efficiency_rate").value, "55%");
        assert_eq!(field(&fields, "profit_margin_multiplier").value, "70%");
        assert_eq!(field(&fields, "hourly_rate").value, "$125.00");
        assert_eq!(field(&fields, "rate_lock").value, "unlocked");
    }
}
