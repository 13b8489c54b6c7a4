//! REST client for the crewdash backend
//!
//! Implements every gateway trait from `crewdash-domain` on top of
//! [`HttpClient`].

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crewdash_domain::model::{
    BusinessParameters, DashboardData, Employee, NewEmployee, OverheadCosts, ParameterUpdate,
    SavedParameters, ServerMetrics, Truck, TruckDraft,
};
use crewdash_domain::repository::{
    DashboardSource, EmployeeRepository, OverheadGateway, ParameterGateway, TruckRepository,
};
use crewdash_types::{Error, Result};

use crate::http::HttpClient;

fn default_success() -> bool {
    true
}

/// Reject `{success: false, error}` bodies that came back with a 2xx status
fn check_success(success: bool, error: Option<String>, action: &str) -> Result<()> {
    if success {
        return Ok(());
    }
    let message = error.unwrap_or_else(|| format!("{} failed", action));
    Err(Error::Rejected(message))
}

#[derive(Deserialize)]
struct ParametersEnvelope {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    parameters: Option<BusinessParameters>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct SaveEnvelope {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    metrics: Option<ServerMetrics>,
    #[serde(default)]
    parameters: Option<BusinessParameters>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct EmployeesEnvelope {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    employees: Vec<Employee>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct TrucksEnvelope {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    trucks: Vec<Truck>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct CreatedEnvelope {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default, alias = "employee_id", alias = "truck_id")]
    id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// `GET /get_settings`; `business_parameters` is also sent but not read here
#[derive(Deserialize)]
struct SettingsEnvelope {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    overhead_costs: OverheadCosts,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Serialize)]
struct SettingsUpdate<'a> {
    overhead_costs: &'a OverheadCosts,
}

#[derive(Deserialize)]
struct AckEnvelope {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Maps a 404 on a single-record fetch to `None`
fn found<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(Error::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: HttpClient,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(base_url, timeout)?,
        })
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }
}

#[async_trait]
impl ParameterGateway for ApiClient {
    async fn fetch_parameters(&self) -> Result<BusinessParameters> {
        let envelope: ParametersEnvelope = self.http.get(&["get_business_parameters"]).await?;
        check_success(envelope.success, envelope.error, "loading parameters")?;
        Ok(envelope.parameters.unwrap_or_default())
    }

    async fn save_parameters(&self, update: &ParameterUpdate) -> Result<SavedParameters> {
        update.validate()?;
        let envelope: SaveEnvelope = self
            .http
            .post(&["save_business_parameters"], update)
            .await?;
        check_success(envelope.success, envelope.error, "saving parameters")?;
        info!(
            preserve_lock_state = update.preserve_lock_state,
            "business parameters saved"
        );
        Ok(SavedParameters {
            metrics: envelope.metrics,
            parameters: envelope.parameters,
        })
    }
}

#[async_trait]
impl DashboardSource for ApiClient {
    async fn fetch_dashboard(&self) -> Result<DashboardData> {
        self.http.get(&["get_dashboard_data"]).await
    }
}

#[async_trait]
impl OverheadGateway for ApiClient {
    async fn fetch_overhead(&self) -> Result<OverheadCosts> {
        let envelope: SettingsEnvelope = self.http.get(&["get_settings"]).await?;
        check_success(envelope.success, envelope.error, "loading settings")?;
        Ok(envelope.overhead_costs)
    }

    async fn save_overhead(&self, costs: &OverheadCosts) -> Result<()> {
        let body = SettingsUpdate {
            overhead_costs: costs,
        };
        let envelope: AckEnvelope = self.http.post(&["update_settings"], &body).await?;
        check_success(envelope.success, envelope.error, "saving settings")?;
        info!(categories = costs.len(), "overhead costs saved");
        Ok(())
    }
}

#[async_trait]
impl EmployeeRepository for ApiClient {
    async fn find_all(&self) -> Result<Vec<Employee>> {
        let envelope: EmployeesEnvelope = self.http.get(&["get_employees"]).await?;
        check_success(envelope.success, envelope.error, "loading employees")?;
        Ok(envelope.employees)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Employee>> {
        found(self.http.get(&["get_employee", id]).await)
    }

    async fn add(&self, employee: &NewEmployee) -> Result<String> {
        employee.validate()?;
        let envelope: CreatedEnvelope = self.http.post(&["add_employee"], employee).await?;
        check_success(envelope.success, envelope.error, "adding employee")?;
        let id = envelope.id.unwrap_or_default();
        info!(employee_id = %id, name = %employee.name, "employee added");
        Ok(id)
    }

    async fn update(&self, id: &str, employee: &NewEmployee) -> Result<()> {
        employee.validate()?;
        let envelope: AckEnvelope = self
            .http
            .put(&["update_employee", id], employee)
            .await?;
        check_success(envelope.success, envelope.error, "updating employee")?;
        info!(employee_id = %id, "employee updated");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let envelope: AckEnvelope = self
            .http
            .delete(&["delete_employee", id])
            .await?;
        check_success(envelope.success, envelope.error, "deleting employee")?;
        info!(employee_id = %id, "employee deleted");
        Ok(())
    }
}

#[async_trait]
impl TruckRepository for ApiClient {
    async fn find_all(&self) -> Result<Vec<Truck>> {
        let envelope: TrucksEnvelope = self.http.get(&["get_trucks"]).await?;
        check_success(envelope.success, envelope.error, "loading trucks")?;
        Ok(envelope.trucks)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Truck>> {
        found(self.http.get(&["get_truck", id]).await)
    }

    async fn add(&self, truck: &TruckDraft) -> Result<String> {
        truck.validate()?;
        let envelope: CreatedEnvelope = self.http.post(&["add_truck"], truck).await?;
        check_success(envelope.success, envelope.error, "adding truck")?;
        let id = envelope.id.unwrap_or_default();
        info!(truck_id = %id, name = %truck.name, "truck added");
        Ok(id)
    }

    async fn update(&self, id: &str, truck: &TruckDraft) -> Result<()> {
        truck.validate()?;
        let envelope: AckEnvelope = self
            .http
            .put(&["update_truck", id], truck)
            .await?;
        check_success(envelope.success, envelope.error, "updating truck")?;
        info!(truck_id = %id, "truck updated");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let envelope: AckEnvelope = self.http.delete(&["delete_truck", id]).await?;
        check_success(envelope.success, envelope.error, "deleting truck")?;
        info!(truck_id = %id, "truck deleted");
        Ok(())
    }
}
