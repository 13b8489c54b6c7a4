//! Bulk employee import from CSV

use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crewdash_domain::repository::EmployeeRepository;
use crewdash_infra::{load_employees, EmployeeRow};
use crewdash_types::Result;

use crate::notify::{Notification, Notifier};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportedEmployee {
    pub row: usize,
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedRow {
    pub row: usize,
    pub name: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub added: Vec<ImportedEmployee>,
    pub failed: Vec<FailedRow>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Parse `path` and add every employee; a malformed file fails before any
/// request is sent, a rejected row is recorded and the import continues
pub async fn import_employees_csv(
    repo: &dyn EmployeeRepository,
    path: &Path,
    notifier: &dyn Notifier,
) -> Result<ImportReport> {
    let rows = load_employees(path).map_err(|e| {
        notifier.notify(Notification::error(format!("Import failed: {}", e)));
        e
    })?;
    info!(path = %path.display(), rows = rows.len(), "importing employees");
    Ok(import_rows(repo, rows, notifier).await)
}

pub async fn import_rows(
    repo: &dyn EmployeeRepository,
    rows: Vec<EmployeeRow>,
    notifier: &dyn Notifier,
) -> ImportReport {
    let mut report = ImportReport::default();

    for EmployeeRow { row, employee } in rows {
        match repo.add(&employee).await {
            Ok(id) => report.added.push(ImportedEmployee {
                row,
                id,
                name: employee.name,
            }),
            Err(e) => {
                warn!(row, name = %employee.name, error = %e, "employee import row failed");
                report.failed.push(FailedRow {
                    row,
                    name: employee.name,
                    error: e.to_string(),
                });
            }
        }
    }

    let summary = format!(
        "Imported {} employee(s), {} failed",
        report.added.len(),
        report.failed.len()
    );
    if report.is_clean() {
        notifier.notify(Notification::success(summary));
    } else {
        notifier.notify(Notification::error(summary));
    }
    report
}
