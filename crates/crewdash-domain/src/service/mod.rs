//! Domain services

pub mod fleet;
pub mod metrics;

pub use fleet::{fleet_metrics, summarize_trucks, truck_metrics, TruckMetrics};
pub use metrics::{
    compute_metrics, cost_per_billable_hour, filtered_overhead_total, margin_percent,
    recommended_rate, truck_expense_total, unassigned_employees, wage_total, Metrics,
};
