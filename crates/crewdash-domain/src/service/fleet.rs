//! Per-truck metrics and fleet summary

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::{Employee, Truck, TruckSummary};

/// Monthly figures for a single truck
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TruckMetrics {
    pub truck_id: String,
    pub name: String,
    pub weekly_hours: f64,
    pub monthly_hours: f64,
    pub monthly_billable_hours: f64,
    pub monthly_revenue: f64,
    pub vehicle_expenses: f64,
    pub crew_wages: f64,
    pub total_monthly_expenses: f64,
    pub monthly_profit: f64,
}

pub fn truck_metrics(
    truck: &Truck,
    roster: &[Employee],
    efficiency_rate: f64,
    hourly_rate: f64,
) -> TruckMetrics {
    let weekly_hours = truck.weekly_hours(roster);
    let monthly_hours = truck.monthly_hours(roster);
    let monthly_billable_hours = monthly_hours * efficiency_rate;
    let crew_wages = truck.crew_wages(roster);
    let vehicle_expenses = truck.vehicle_expenses();
    let total_monthly_expenses = crew_wages + vehicle_expenses;
    let monthly_revenue = monthly_billable_hours * hourly_rate;

    TruckMetrics {
        truck_id: truck.id.clone(),
        name: truck.name.clone(),
        weekly_hours,
        monthly_hours,
        monthly_billable_hours,
        monthly_revenue,
        vehicle_expenses,
        crew_wages,
        total_monthly_expenses,
        monthly_profit: monthly_revenue - total_monthly_expenses,
    }
}

/// Metrics for every truck, in input order
pub fn fleet_metrics(
    trucks: &[Truck],
    roster: &[Employee],
    efficiency_rate: f64,
    hourly_rate: f64,
) -> Vec<TruckMetrics> {
    trucks
        .iter()
        .map(|t| truck_metrics(t, roster, efficiency_rate, hourly_rate))
        .collect()
}

pub fn summarize_trucks(trucks: &[Truck], roster: &[Employee]) -> TruckSummary {
    let crew: HashSet<&str> = trucks
        .iter()
        .flat_map(|t| t.crew(roster))
        .map(|e| e.id.as_str())
        .collect();

    TruckSummary {
        total_trucks: trucks.len(),
        active_trucks: trucks.iter().filter(|t| t.is_active()).count(),
        total_weekly_hours: trucks.iter().map(|t| t.weekly_hours(roster)).sum(),
        total_monthly_expenses: trucks.iter().map(|t| t.monthly_expense(roster)).sum(),
        crew_count: crew.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fleet() -> (Vec<Truck>, Vec<Employee>) {
        let roster: Vec<Employee> = serde_json::from_value(json!([
            {"employee_id": "a", "hourly_wage": 20, "hours_per_week": 40},
            {"employee_id": "b", "hourly_wage": 30, "hours_per_week": 30}
        ]))
        .unwrap();
        let trucks: Vec<Truck> = serde_json::from_value(json!([
            {
                "truck_id": "t1",
                "name": "Truck 1",
                "loan_payment": 500,
                "insurance": 200,
                "fuel_budget": 300,
                "maintenance_budget": 100,
                "other_expenses": 50,
                "employee_ids": ["a"]
            },
            {
                "truck_id": "t2",
                "name": "Truck 2",
                "status": "maintenance",
                "effective_hours": 25,
                "fuel_budget": 400,
                "employee_ids": ["a", "b"]
            }
        ]))
        .unwrap();
        (trucks, roster)
    }

    #[test]
    fn test_truck_metrics_single() {
        let (trucks, roster) = fleet();
        let m = truck_metrics(&trucks[0], &roster, 0.5, 100.0);
        assert_eq!(m.truck_id, "t1");
        assert!((m.weekly_hours - 40.0).abs() < 1e-9);
        assert!((m.monthly_hours - 160.0).abs() < 1e-9);
        assert!((m.monthly_billable_hours - 80.0).abs() < 1e-9);
        assert!((m.monthly_revenue - 8000.0).abs() < 1e-9);
        assert!((m.vehicle_expenses - 1150.0).abs() < 1e-9);
        assert!((m.crew_wages - 3200.0).abs() < 1e-9);
        assert!((m.total_monthly_expenses - 4350.0).abs() < 1e-9);
        assert!((m.monthly_profit - 3650.0).abs() < 1e-9);
    }

    #[test]
    fn test_fleet_metrics_order() {
        let (trucks, roster) = fleet();
        let all = fleet_metrics(&trucks, &roster, 0.5, 100.0);
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].truck_id, "t2");
        assert!((all[1].weekly_hours - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary() {
        let (trucks, roster) = fleet();
        let s = summarize_trucks(&trucks, &roster);
        assert_eq!(s.total_trucks, 2);
        assert_eq!(s.active_trucks, 1);
        assert_eq!(s.crew_count, 2);
        assert!((s.total_weekly_hours - 65.0).abs() < 1e-9);
        // t1: 4350, t2: 400 + 3200 + 3600 = 7600
        assert!((s.total_monthly_expenses - 11950.0).abs() < 1e-9);
    }
}
