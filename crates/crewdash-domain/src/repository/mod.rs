//! Gateway traits for the remote API
//!
//! The backend owns persistence; these traits describe what the client needs
//! from it so the application layer can be exercised without a server.

use async_trait::async_trait;

use crate::model::{
    BusinessParameters, DashboardData, Employee, NewEmployee, OverheadCosts, ParameterUpdate,
    SavedParameters, Truck, TruckDraft,
};
use crewdash_types::Result;

/// Business parameter store (`/get_business_parameters`, `/save_business_parameters`)
#[async_trait]
pub trait ParameterGateway: Send + Sync {
    /// Load the stored parameters
    async fn fetch_parameters(&self) -> Result<BusinessParameters>;

    /// Submit a partial update; the server merges and recomputes
    async fn save_parameters(&self, update: &ParameterUpdate) -> Result<SavedParameters>;
}

/// Full dashboard snapshot (`/get_dashboard_data`)
#[async_trait]
pub trait DashboardSource: Send + Sync {
    async fn fetch_dashboard(&self) -> Result<DashboardData>;
}

/// Monthly overhead categories (`/get_settings`, `/update_settings`)
#[async_trait]
pub trait OverheadGateway: Send + Sync {
    async fn fetch_overhead(&self) -> Result<OverheadCosts>;

    /// Replaces the stored categories with `costs`
    async fn save_overhead(&self, costs: &OverheadCosts) -> Result<()>;
}

/// Employee records
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Employee>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Employee>>;

    /// Returns the id assigned by the server
    async fn add(&self, employee: &NewEmployee) -> Result<String>;

    async fn update(&self, id: &str, employee: &NewEmployee) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;
}

/// Truck records
#[async_trait]
pub trait TruckRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Truck>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Truck>>;

    /// Returns the id assigned by the server
    async fn add(&self, truck: &TruckDraft) -> Result<String>;

    async fn update(&self, id: &str, truck: &TruckDraft) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;
}
