//! Business metrics aggregation
//!
//! Recomputes the dashboard figures from a snapshot of trucks, employees,
//! overhead and parameters:
//! 1. Generic overhead (vehicle/truck/wage keys filtered out)
//! 2. Truck costs including each truck's crew wages
//! 3. Wages of staff not assigned to any truck
//! 4. Hours -> billable hours -> cost per hour -> recommended rate
//! 5. Revenue, profit and margins at the effective hourly rate
//!
//! All values are kept at full precision; rounding is a display concern.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::{DashboardSnapshot, Employee, LockState, OverheadCosts, Truck};
use crate::model::{MONTHS_PER_YEAR, WEEKS_PER_MONTH};

/// Aggregated financial metrics for one snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Overhead after removing vehicle/truck/wage duplicates
    pub overhead_total: f64,
    /// Overhead entries left out of `overhead_total`
    pub excluded_overhead_total: f64,
    /// Vehicle costs plus assigned crew wages, all trucks
    pub truck_expense_total: f64,
    /// Monthly wages of every employee (display value)
    pub wage_total: f64,
    /// Monthly wages of employees on no truck
    pub unassigned_wage_total: f64,
    pub total_expenses: f64,

    pub weekly_hours: f64,
    /// Monthly hours before the efficiency rate
    pub available_hours: f64,
    pub billable_hours: f64,

    pub cost_per_hour: f64,
    pub recommended_rate: f64,
    /// Rate used for revenue: the stored rate when locked, else recommended
    pub hourly_rate: f64,
    pub lock_state: LockState,

    pub monthly_revenue: f64,
    pub yearly_revenue: f64,
    pub monthly_profit: f64,
    pub yearly_profit: f64,
    pub monthly_margin_percent: f64,
    pub yearly_margin_percent: f64,
}

/// Generic overhead subtotal
pub fn filtered_overhead_total(costs: &OverheadCosts) -> f64 {
    costs.generic_total()
}

/// Sum of every truck's monthly expense (vehicle costs + crew wages)
pub fn truck_expense_total(trucks: &[Truck], roster: &[Employee]) -> f64 {
    trucks.iter().map(|t| t.monthly_expense(roster)).sum()
}

/// Sum of every employee's monthly wage
pub fn wage_total(employees: &[Employee]) -> f64 {
    employees.iter().map(Employee::monthly_wage).sum()
}

/// Employees that appear on no truck's crew
pub fn unassigned_employees<'a>(trucks: &'a [Truck], roster: &'a [Employee]) -> Vec<&'a Employee> {
    let assigned: HashSet<&str> = trucks
        .iter()
        .flat_map(|t| t.crew(roster))
        .map(|e| e.id.as_str())
        .collect();
    roster
        .iter()
        .filter(|e| !assigned.contains(e.id.as_str()))
        .collect()
}

/// Weekly hours summed over the fleet
pub fn fleet_weekly_hours(trucks: &[Truck], roster: &[Employee]) -> f64 {
    trucks.iter().map(|t| t.weekly_hours(roster)).sum()
}

pub fn billable_hours(available_hours: f64, efficiency_rate: f64) -> f64 {
    available_hours * efficiency_rate
}

/// Monthly cost spread over billable hours; `0` without billable hours
pub fn cost_per_billable_hour(total_expenses: f64, billable_hours: f64) -> f64 {
    if billable_hours > 0.0 {
        total_expenses / billable_hours
    } else {
        0.0
    }
}

/// Rate that covers cost at the configured multiplier; `0` for a zero multiplier
pub fn recommended_rate(cost_per_hour: f64, profit_margin_multiplier: f64) -> f64 {
    if profit_margin_multiplier > 0.0 {
        cost_per_hour / profit_margin_multiplier
    } else {
        0.0
    }
}

/// `profit / revenue * 100`, `0.0` when revenue is zero
pub fn margin_percent(profit: f64, revenue: f64) -> f64 {
    if revenue == 0.0 {
        0.0
    } else {
        profit / revenue * 100.0
    }
}

/// Compute all dashboard metrics from a snapshot.
///
/// Never fails: malformed inputs were already coerced to `0` when the
/// snapshot was deserialized.
pub fn compute_metrics(snapshot: &DashboardSnapshot) -> Metrics {
    let params = &snapshot.business_parameters;
    let trucks = &snapshot.trucks;
    let roster = &snapshot.employees;

    let overhead_total = filtered_overhead_total(&snapshot.overhead_costs);
    let excluded_overhead_total: f64 = snapshot
        .overhead_costs
        .excluded_entries()
        .map(|(_, v)| v)
        .sum();
    let truck_expense_total = truck_expense_total(trucks, roster);
    let wage_total = wage_total(roster);
    let unassigned_wage_total: f64 = unassigned_employees(trucks, roster)
        .iter()
        .map(|e| e.monthly_wage())
        .sum();
    let total_expenses = overhead_total + truck_expense_total + unassigned_wage_total;

    let weekly_hours = fleet_weekly_hours(trucks, roster);
    let available_hours = weekly_hours * WEEKS_PER_MONTH;
    let billable_hours = billable_hours(available_hours, params.efficiency_rate);

    let cost_per_hour = cost_per_billable_hour(total_expenses, billable_hours);
    let recommended_rate = recommended_rate(cost_per_hour, params.profit_margin_multiplier);
    let hourly_rate = match params.lock_state {
        LockState::Locked => params.hourly_rate,
        LockState::Unlocked => recommended_rate,
    };

    let monthly_revenue = hourly_rate * billable_hours;
    let yearly_revenue = monthly_revenue * MONTHS_PER_YEAR;
    let monthly_profit = monthly_revenue - total_expenses;
    let yearly_profit = monthly_profit * MONTHS_PER_YEAR;

    Metrics {
        overhead_total,
        excluded_overhead_total,
        truck_expense_total,
        wage_total,
        unassigned_wage_total,
        total_expenses,
        weekly_hours,
        available_hours,
        billable_hours,
        cost_per_hour,
        recommended_rate,
        hourly_rate,
        lock_state: params.lock_state,
        monthly_revenue,
        yearly_revenue,
        monthly_profit,
        yearly_profit,
        monthly_margin_percent: margin_percent(monthly_profit, monthly_revenue),
        yearly_margin_percent: margin_percent(yearly_profit, yearly_revenue),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BusinessParameters;
    use serde_json::json;

    fn snapshot(value: serde_json::Value) -> DashboardSnapshot {
        serde_json::from_value(value).unwrap()
    }

    fn example_snapshot(lock: bool) -> DashboardSnapshot {
        snapshot(json!({
            "overhead_costs": {
                "rent": 1000,
                "vehicle_expenses": 500,
                "employee_wages": 2000,
                "utilities": 200
            },
            "employees": [
                {"employee_id": "e1", "hourly_wage": 20, "hours_per_week": 40},
                {"employee_id": "e2", "hourly_wage": 10, "hours_per_week": 10}
            ],
            "trucks": [{
                "truck_id": "t1",
                "loan_payment": 500,
                "insurance": 200,
                "fuel_budget": 300,
                "maintenance_budget": 100,
                "other_expenses": 50,
                "employee_ids": ["e1"]
            }],
            "business_parameters": {
                "efficiency_rate": 0.5,
                "profit_margin_multiplier": 0.8,
                "hourly_rate": 100,
                "lock_state": lock
            }
        }))
    }

    #[test]
    fn test_totals_without_double_counting() {
        let m = compute_metrics(&example_snapshot(false));
        assert!((m.overhead_total - 1200.0).abs() < 1e-9);
        assert!((m.excluded_overhead_total - 2500.0).abs() < 1e-9);
        assert!((m.truck_expense_total - 4350.0).abs() < 1e-9);
        assert!((m.wage_total - 3600.0).abs() < 1e-9);
        assert!((m.unassigned_wage_total - 400.0).abs() < 1e-9);
        assert!((m.total_expenses - 5950.0).abs() < 1e-9);
    }

    #[test]
    fn test_unlocked_rate_is_recommended() {
        let m = compute_metrics(&example_snapshot(false));
        // 40 h/week from the crew -> 160 h/month -> 80 billable
        assert!((m.available_hours - 160.0).abs() < 1e-9);
        assert!((m.billable_hours - 80.0).abs() < 1e-9);
        let cost = 5950.0 / 80.0;
        assert!((m.cost_per_hour - cost).abs() < 1e-9);
        assert!((m.recommended_rate - cost / 0.8).abs() < 1e-9);
        assert_eq!(m.hourly_rate, m.recommended_rate);
        // revenue = cost / 0.8 * 80 -> margin is 20%
        assert!((m.monthly_margin_percent - 20.0).abs() < 1e-9);
        assert!((m.yearly_revenue - m.monthly_revenue * 12.0).abs() < 1e-6);
    }

    #[test]
    fn test_locked_rate_is_used_for_revenue() {
        let m = compute_metrics(&example_snapshot(true));
        assert_eq!(m.lock_state, LockState::Locked);
        assert!((m.hourly_rate - 100.0).abs() < 1e-9);
        assert!((m.monthly_revenue - 8000.0).abs() < 1e-9);
        assert!((m.monthly_profit - 2050.0).abs() < 1e-9);
        assert!((m.yearly_profit - 24600.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_revenue_margin_is_zero() {
        let snap = DashboardSnapshot {
            business_parameters: BusinessParameters::default(),
            ..Default::default()
        };
        let m = compute_metrics(&snap);
        assert_eq!(m.monthly_revenue, 0.0);
        assert_eq!(m.monthly_margin_percent, 0.0);
        assert_eq!(m.yearly_margin_percent, 0.0);
        assert_eq!(m.cost_per_hour, 0.0);
    }

    #[test]
    fn test_zero_multiplier_gives_zero_recommendation() {
        assert_eq!(recommended_rate(50.0, 0.0), 0.0);
        assert_eq!(cost_per_billable_hour(1000.0, 0.0), 0.0);
        assert_eq!(margin_percent(-100.0, 0.0), 0.0);
    }

    #[test]
    fn test_malformed_inputs_count_as_zero() {
        let snap = snapshot(json!({
            "overhead_costs": {"rent": "n/a", "insurance": "$300"},
            "trucks": [{"truck_id": "t", "loan_payment": "bad", "fuel_budget": "250"}]
        }));
        let m = compute_metrics(&snap);
        assert!((m.overhead_total - 300.0).abs() < 1e-9);
        assert!((m.truck_expense_total - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_recompute_is_deterministic() {
        let snap = example_snapshot(false);
        assert_eq!(compute_metrics(&snap), compute_metrics(&snap));
    }
}
