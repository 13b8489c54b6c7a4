//! Truck (crew vehicle) records

use serde::{Deserialize, Serialize};

use crewdash_types::money::lenient;
use crewdash_types::{Error, Result};

use super::{Employee, WEEKS_PER_MONTH};

fn default_status() -> String {
    "active".to_string()
}

/// A crew truck with its monthly running costs and assigned crew
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Truck {
    #[serde(rename = "truck_id", alias = "id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_status")]
    pub status: String,

    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub year: String,
    #[serde(default)]
    pub license_plate: String,

    /// Usable operating hours per week; `0` means "derive from crew"
    #[serde(default, deserialize_with = "lenient")]
    pub effective_hours: f64,
    #[serde(default)]
    pub service_area: String,

    #[serde(default, deserialize_with = "lenient")]
    pub loan_payment: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub insurance: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub fuel_budget: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub maintenance_budget: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub other_expenses: f64,

    #[serde(default)]
    pub employee_ids: Vec<String>,
    /// Crew records, when the API embeds them
    #[serde(default)]
    pub employees: Vec<Employee>,

    #[serde(default)]
    pub notes: String,
}

/// `year` shows up as both a number and a string
fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

impl Truck {
    /// Sum of the five monthly cost fields
    pub fn vehicle_expenses(&self) -> f64 {
        self.loan_payment
            + self.insurance
            + self.fuel_budget
            + self.maintenance_budget
            + self.other_expenses
    }

    /// Assigned crew: embedded records when present, otherwise `employee_ids`
    /// resolved against `roster`.
    pub fn crew<'a>(&'a self, roster: &'a [Employee]) -> Vec<&'a Employee> {
        if !self.employees.is_empty() {
            return self.employees.iter().collect();
        }
        self.employee_ids
            .iter()
            .filter_map(|id| roster.iter().find(|e| &e.id == id))
            .collect()
    }

    /// Monthly wages of the assigned crew
    pub fn crew_wages(&self, roster: &[Employee]) -> f64 {
        self.crew(roster).iter().map(|e| e.monthly_wage()).sum()
    }

    /// Vehicle costs plus crew wages for one month
    pub fn monthly_expense(&self, roster: &[Employee]) -> f64 {
        self.vehicle_expenses() + self.crew_wages(roster)
    }

    /// `effective_hours` when set, otherwise the crew's combined weekly hours
    pub fn weekly_hours(&self, roster: &[Employee]) -> f64 {
        if self.effective_hours > 0.0 {
            self.effective_hours
        } else {
            self.crew(roster).iter().map(|e| e.hours_per_week).sum()
        }
    }

    pub fn monthly_hours(&self, roster: &[Employee]) -> f64 {
        self.weekly_hours(roster) * WEEKS_PER_MONTH
    }

    pub fn is_active(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case("active")
    }
}

/// Form data for adding or updating a truck
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruckDraft {
    pub name: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub license_plate: String,
    #[serde(default)]
    pub loan_payment: f64,
    #[serde(default)]
    pub insurance: f64,
    #[serde(default)]
    pub fuel_budget: f64,
    #[serde(default)]
    pub maintenance_budget: f64,
    #[serde(default)]
    pub other_expenses: f64,
    #[serde(default)]
    pub employee_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_hours: Option<f64>,
    #[serde(default)]
    pub service_area: String,
    #[serde(default)]
    pub notes: String,
}

impl Default for TruckDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            status: default_status(),
            make: String::new(),
            model: String::new(),
            year: String::new(),
            license_plate: String::new(),
            loan_payment: 0.0,
            insurance: 0.0,
            fuel_budget: 0.0,
            maintenance_budget: 0.0,
            other_expenses: 0.0,
            employee_ids: Vec::new(),
            effective_hours: None,
            service_area: String::new(),
            notes: String::new(),
        }
    }
}

impl TruckDraft {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidInput("truck name is required".to_string()));
        }
        let costs = [
            ("loan_payment", self.loan_payment),
            ("insurance", self.insurance),
            ("fuel_budget", self.fuel_budget),
            ("maintenance_budget", self.maintenance_budget),
            ("other_expenses", self.other_expenses),
        ];
        for (name, value) in costs {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidInput(format!(
                    "{} must be >= 0, got {}",
                    name, value
                )));
            }
        }
        if let Some(hours) = self.effective_hours {
            if !hours.is_finite() || hours < 0.0 {
                return Err(Error::InvalidInput(format!(
                    "effective_hours must be >= 0, got {}",
                    hours
                )));
            }
        }
        Ok(())
    }
}

impl From<&Truck> for TruckDraft {
    fn from(t: &Truck) -> Self {
        let employee_ids = if t.employee_ids.is_empty() {
            t.employees.iter().map(|e| e.id.clone()).collect()
        } else {
            t.employee_ids.clone()
        };
        Self {
            name: t.name.clone(),
            status: t.status.clone(),
            make: t.make.clone(),
            model: t.model.clone(),
            year: t.year.clone(),
            license_plate: t.license_plate.clone(),
            loan_payment: t.loan_payment,
            insurance: t.insurance,
            fuel_budget: t.fuel_budget,
            maintenance_budget: t.maintenance_budget,
            other_expenses: t.other_expenses,
            employee_ids,
            effective_hours: (t.effective_hours > 0.0).then_some(t.effective_hours),
            service_area: t.service_area.clone(),
            notes: t.notes.clone(),
        }
    }
}
