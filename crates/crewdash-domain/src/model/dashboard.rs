//! Dashboard payloads exchanged with the API

use serde::{Deserialize, Serialize};

use crewdash_types::money::{lenient, lenient_bool, lenient_bool_opt, lenient_count, lenient_opt};

use super::{BusinessParameters, Employee, LockState, OverheadCosts, Truck};

/// Metrics as computed by the server.
///
/// The wire format carries `"$1,234.56"` strings; they are parsed on the way
/// in and kept as plain numbers from then on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerMetrics {
    #[serde(default, deserialize_with = "lenient")]
    pub total_expenses: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub available_hours: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub billable_hours: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub cost_per_hour: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub hourly_rate: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub recommended_rate: f64,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_rate_locked: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub monthly_revenue_potential: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub yearly_revenue_potential: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub monthly_profit: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub yearly_profit: f64,
}

impl ServerMetrics {
    pub fn lock_state(&self) -> LockState {
        LockState::from(self.is_rate_locked)
    }

    pub fn monthly_margin_percent(&self) -> f64 {
        crate::service::margin_percent(self.monthly_profit, self.monthly_revenue_potential)
    }

    pub fn yearly_margin_percent(&self) -> f64 {
        crate::service::margin_percent(self.yearly_profit, self.yearly_revenue_potential)
    }
}

/// Fleet-level roll-up shown next to the metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TruckSummary {
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_trucks: usize,
    #[serde(default, deserialize_with = "lenient_count")]
    pub active_trucks: usize,
    #[serde(default, deserialize_with = "lenient")]
    pub total_weekly_hours: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub total_monthly_expenses: f64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub crew_count: usize,
}

/// Everything the metrics aggregator needs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    #[serde(default)]
    pub trucks: Vec<Truck>,
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub overhead_costs: OverheadCosts,
    #[serde(default)]
    pub business_parameters: BusinessParameters,
}

/// `GET /get_dashboard_data` response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "DashboardPayload")]
pub struct DashboardData {
    #[serde(default)]
    pub metrics: ServerMetrics,
    #[serde(default)]
    pub truck_summary: Option<TruckSummary>,
    #[serde(flatten)]
    pub snapshot: DashboardSnapshot,
}

/// `business_parameters` as sent with the dashboard.
///
/// The server usually sends only the efficiency and margin here; the rate and
/// the lock are then reported through `metrics`.
#[derive(Debug, Default, Deserialize)]
struct ReportedParameters {
    #[serde(default, deserialize_with = "lenient_opt")]
    efficiency_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt")]
    profit_margin_multiplier: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt")]
    hourly_rate: Option<f64>,
    #[serde(default, alias = "is_rate_locked", deserialize_with = "lenient_bool_opt")]
    lock_state: Option<bool>,
}

impl ReportedParameters {
    fn resolve(self, metrics: &ServerMetrics) -> BusinessParameters {
        let defaults = BusinessParameters::default();
        let reported_rate = Some(metrics.hourly_rate).filter(|rate| *rate > 0.0);
        BusinessParameters {
            efficiency_rate: self.efficiency_rate.unwrap_or(defaults.efficiency_rate),
            profit_margin_multiplier: self
                .profit_margin_multiplier
                .unwrap_or(defaults.profit_margin_multiplier),
            hourly_rate: self
                .hourly_rate
                .or(reported_rate)
                .unwrap_or(defaults.hourly_rate),
            lock_state: self
                .lock_state
                .map(LockState::from)
                .unwrap_or_else(|| metrics.lock_state()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct DashboardPayload {
    #[serde(default)]
    metrics: ServerMetrics,
    #[serde(default)]
    truck_summary: Option<TruckSummary>,
    #[serde(default)]
    trucks: Vec<Truck>,
    #[serde(default)]
    employees: Vec<Employee>,
    #[serde(default)]
    overhead_costs: OverheadCosts,
    #[serde(default)]
    business_parameters: ReportedParameters,
}

impl From<DashboardPayload> for DashboardData {
    fn from(payload: DashboardPayload) -> Self {
        let business_parameters = payload.business_parameters.resolve(&payload.metrics);
        Self {
            metrics: payload.metrics,
            truck_summary: payload.truck_summary,
            snapshot: DashboardSnapshot {
                trucks: payload.trucks,
                employees: payload.employees,
                overhead_costs: payload.overhead_costs,
                business_parameters,
            },
        }
    }
}

/// Server echo after a parameter save; authoritative over local state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedParameters {
    #[serde(default)]
    pub metrics: Option<ServerMetrics>,
    #[serde(default)]
    pub parameters: Option<BusinessParameters>,
}
