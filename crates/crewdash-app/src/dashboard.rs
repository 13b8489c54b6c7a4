//! Dashboard display state
//!
//! Server responses are authoritative: each successful round trip replaces
//! the relevant part of the state wholesale. A failed fetch leaves the state
//! exactly as it was.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crewdash_domain::model::{
    BusinessParameters, DashboardData, DashboardSnapshot, SavedParameters, ServerMetrics,
    TruckSummary,
};
use crewdash_domain::repository::DashboardSource;
use crewdash_domain::service::{compute_metrics, summarize_trucks, Metrics};
use crewdash_types::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardState {
    pub parameters: BusinessParameters,
    /// Metrics as reported by the server
    pub server_metrics: ServerMetrics,
    pub snapshot: DashboardSnapshot,
    pub truck_summary: TruckSummary,
    /// Metrics recomputed locally from `snapshot`
    pub metrics: Metrics,
    pub last_updated: Option<DateTime<Utc>>,
}

impl DashboardState {
    pub fn from_dashboard(data: DashboardData) -> Self {
        let mut state = Self::default();
        state.apply_dashboard(data);
        state
    }

    /// Replace everything with a freshly fetched snapshot
    pub fn apply_dashboard(&mut self, data: DashboardData) {
        self.truck_summary = data
            .truck_summary
            .unwrap_or_else(|| summarize_trucks(&data.snapshot.trucks, &data.snapshot.employees));
        self.parameters = data.snapshot.business_parameters;
        self.server_metrics = data.metrics;
        self.snapshot = data.snapshot;
        self.recompute();
        debug!(
            trucks = self.snapshot.trucks.len(),
            employees = self.snapshot.employees.len(),
            "dashboard snapshot applied"
        );
    }

    /// Overwrite parameters and metrics with a save echo
    pub fn apply_saved(&mut self, saved: SavedParameters) {
        if let Some(parameters) = saved.parameters {
            self.set_parameters(parameters);
        }
        if let Some(metrics) = saved.metrics {
            self.server_metrics = metrics;
        }
        self.recompute();
    }

    pub fn apply_parameters(&mut self, parameters: BusinessParameters) {
        self.set_parameters(parameters);
        self.recompute();
    }

    fn set_parameters(&mut self, parameters: BusinessParameters) {
        self.parameters = parameters;
        self.snapshot.business_parameters = parameters;
    }

    fn recompute(&mut self) {
        self.metrics = compute_metrics(&self.snapshot);
        self.last_updated = Some(Utc::now());
    }
}

/// Display state shared between the refresh task and user actions
#[derive(Debug, Clone, Default)]
pub struct SharedDashboard {
    inner: Arc<Mutex<DashboardState>>,
}

impl SharedDashboard {
    pub fn new(state: DashboardState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DashboardState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Copy of the current state
    pub fn current(&self) -> DashboardState {
        self.lock().clone()
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut DashboardState) -> R) -> R {
        f(&mut self.lock())
    }
}

/// Fetch the dashboard once and apply it; on failure the state is untouched
pub async fn refresh_dashboard(
    source: &dyn DashboardSource,
    state: &SharedDashboard,
) -> Result<()> {
    match source.fetch_dashboard().await {
        Ok(data) => {
            state.update(|s| s.apply_dashboard(data));
            info!("dashboard refreshed");
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "dashboard refresh failed, keeping previous metrics");
            Err(e)
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crewdash_domain::model::LockState;
    use crewdash_types::Error;

    #[test]
    fn test_apply_dashboard_computes_local_metrics() {
        let state = DashboardState::from_dashboard(sample_dashboard());
        assert_eq!(state.parameters.lock_state, LockState::Locked);
        assert!((state.server_metrics.total_expenses - 5950.0).abs() < 1e-9);
        assert!((state.metrics.overhead_total - 1200.0).abs() < 1e-9);
        assert!((state.metrics.truck_expense_total - 4350.0).abs() < 1e-9);
        assert!((state.metrics.unassigned_wage_total - 400.0).abs() < 1e-9);
        assert!((state.metrics.total_expenses - 5950.0).abs() < 1e-9);
        assert!((state.metrics.monthly_profit - 2050.0).abs() < 1e-9);
        assert!(state.last_updated.is_some());
    }

    #[test]
    fn test_lock_and_rate_taken_from_metrics_when_parameters_omit_them() {
        let data: DashboardData = serde_json::from_value(serde_json::json!({
            "metrics": {
                "total_expenses": "$5,950.00",
                "hourly_rate": "$150.00",
                "is_rate_locked": true
            },
            "overhead_costs": {"rent": 1000, "utilities": 200},
            "employees": [
                {"employee_id": "a", "name": "Ana", "hourly_wage": 20, "hours_per_week": 40},
                {"employee_id": "b", "name": "Ben", "hourly_wage": 10, "hours_per_week": 10}
            ],
            "trucks": [{
                "truck_id": "t1", "name": "Truck 1",
                "loan_payment": 500, "insurance": 200, "fuel_budget": 300,
                "maintenance_budget": 100, "other_expenses": 50,
                "employee_ids": ["a"]
            }],
            "business_parameters": {
                "available_hours": 160,
                "efficiency_rate": 0.5,
                "profit_margin_multiplier": 0.7
            }
        }))
        .unwrap();

        let state = DashboardState::from_dashboard(data);
        assert_eq!(state.parameters.lock_state, state.server_metrics.lock_state());
        assert_eq!(state.parameters.lock_state, LockState::Locked);
        assert!((state.parameters.hourly_rate - 150.0).abs() < 1e-9);
        assert_eq!(state.metrics.lock_state, LockState::Locked);
        assert!((state.metrics.hourly_rate - 150.0).abs() < 1e-9);
        assert!((state.metrics.billable_hours - 80.0).abs() < 1e-9);
        assert!((state.metrics.monthly_revenue - 12000.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_truck_summary_is_derived() {
        let state = DashboardState::from_dashboard(sample_dashboard());
        assert_eq!(state.truck_summary.total_trucks, 1);
        assert_eq!(state.truck_summary.active_trucks, 1);
        assert_eq!(state.truck_summary.crew_count, 1);
    }

    #[test]
    fn test_apply_saved_overwrites_not_merges() {
        let mut state = DashboardState::from_dashboard(sample_dashboard());
        let echo_params = BusinessParameters {
            efficiency_rate: 0.6,
            profit_margin_multiplier: 0.8,
            hourly_rate: 140.0,
            lock_state: LockState::Unlocked,
        };
        let echo_metrics = ServerMetrics {
            hourly_rate: 140.0,
            ..Default::default()
        };
        state.apply_saved(SavedParameters {
            metrics: Some(echo_metrics.clone()),
            parameters: Some(echo_params),
        });

        assert_eq!(state.parameters, echo_params);
        assert_eq!(state.snapshot.business_parameters, echo_params);
        // fields absent from the echo are zero, not carried over
        assert_eq!(state.server_metrics, echo_metrics);
        assert_eq!(state.server_metrics.total_expenses, 0.0);
        assert_eq!(state.metrics.lock_state, LockState::Unlocked);
    }

    #[test]
    fn test_apply_saved_without_metrics_keeps_previous_metrics() {
        let mut state = DashboardState::from_dashboard(sample_dashboard());
        let before = state.server_metrics.clone();
        state.apply_saved(SavedParameters {
            metrics: None,
            parameters: Some(BusinessParameters::default()),
        });
        assert_eq!(state.server_metrics, before);
        assert_eq!(state.parameters, BusinessParameters::default());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_state() {
        let source = ScriptedSource::new(vec![
            Ok(sample_dashboard()),
            Err(Error::Http("connection refused".into())),
        ]);
        let shared = SharedDashboard::default();

        refresh_dashboard(&source, &shared).await.unwrap();
        let before = shared.current();

        let err = refresh_dashboard(&source, &shared).await.unwrap_err();
        assert!(matches!(err, Error::Http(_)));
        assert_eq!(shared.current(), before);
        assert_eq!(source.calls(), 2);
    }
}
