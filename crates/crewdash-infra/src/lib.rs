//! Infrastructure layer for crewdash: HTTP API client and CSV import

pub mod api;
pub mod employee_csv;
pub mod http;

pub use api::ApiClient;
pub use employee_csv::{load_employees, read_employees, EmployeeCsvError, EmployeeRow};
pub use http::{parse_base_url, HttpClient};
