//! Domain model types

pub mod dashboard;
pub mod employee;
pub mod overhead;
pub mod parameters;
pub mod truck;

pub use dashboard::{DashboardData, DashboardSnapshot, SavedParameters, ServerMetrics, TruckSummary};
pub use employee::{Employee, NewEmployee};
pub use overhead::{is_excluded_key, OverheadCosts};
pub use parameters::{BusinessParameters, LockState, ParameterUpdate};
pub use truck::{Truck, TruckDraft};

/// Weekly figures are scaled to months with a flat four weeks
pub const WEEKS_PER_MONTH: f64 = 4.0;
pub const MONTHS_PER_YEAR: f64 = 12.0;
