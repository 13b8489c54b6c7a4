//! Employee records

use serde::{Deserialize, Serialize};

use crewdash_types::money::lenient;
use crewdash_types::{Error, Result};

use super::WEEKS_PER_MONTH;

pub const DEFAULT_HOURS_PER_WEEK: f64 = 40.0;
pub const DEFAULT_HOURLY_WAGE: f64 = 25.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(rename = "employee_id", alias = "id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub position: String,
    #[serde(default, deserialize_with = "lenient")]
    pub hours_per_week: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub hourly_wage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Employee {
    /// `hourly_wage * hours_per_week * 4`
    pub fn monthly_wage(&self) -> f64 {
        self.hourly_wage * self.hours_per_week * WEEKS_PER_MONTH
    }
}

/// Form data for adding or updating an employee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEmployee {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub position: String,
    #[serde(default = "default_hours")]
    pub hours_per_week: f64,
    #[serde(default = "default_wage")]
    pub hourly_wage: f64,
}

fn default_hours() -> f64 {
    DEFAULT_HOURS_PER_WEEK
}

fn default_wage() -> f64 {
    DEFAULT_HOURLY_WAGE
}

impl Default for NewEmployee {
    fn default() -> Self {
        Self {
            name: String::new(),
            phone: String::new(),
            email: String::new(),
            position: String::new(),
            hours_per_week: DEFAULT_HOURS_PER_WEEK,
            hourly_wage: DEFAULT_HOURLY_WAGE,
        }
    }
}

impl NewEmployee {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidInput("employee name is required".to_string()));
        }
        if !self.hours_per_week.is_finite() || self.hours_per_week < 0.0 {
            return Err(Error::InvalidInput(format!(
                "hours_per_week must be >= 0, got {}",
                self.hours_per_week
            )));
        }
        if !self.hourly_wage.is_finite() || self.hourly_wage < 0.0 {
            return Err(Error::InvalidInput(format!(
                "hourly_wage must be >= 0, got {}",
                self.hourly_wage
            )));
        }
        Ok(())
    }
}

impl From<&Employee> for NewEmployee {
    fn from(e: &Employee) -> Self {
        Self {
            name: e.name.clone(),
            phone: e.phone.clone(),
            email: e.email.clone(),
            position: e.position.clone(),
            hours_per_week: e.hours_per_week,
            hourly_wage: e.hourly_wage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_monthly_wage() {
        let e: Employee = serde_json::from_value(json!({
            "employee_id": "e1",
            "name": "Pat",
            "hours_per_week": 40,
            "hourly_wage": 20
        }))
        .unwrap();
        assert_eq!(e.id, "e1");
        assert!((e.monthly_wage() - 3200.0).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_numbers_become_zero() {
        let e: Employee = serde_json::from_value(json!({
            "id": "e2",
            "hours_per_week": "lots",
            "hourly_wage": null
        }))
        .unwrap();
        assert_eq!(e.id, "e2");
        assert_eq!(e.monthly_wage(), 0.0);
    }

    #[test]
    fn test_new_employee_defaults_and_validation() {
        let draft: NewEmployee = serde_json::from_value(json!({"name": "Sam"})).unwrap();
        assert_eq!(draft.hours_per_week, DEFAULT_HOURS_PER_WEEK);
        assert_eq!(draft.hourly_wage, DEFAULT_HOURLY_WAGE);
        assert!(draft.validate().is_ok());

        let blank = NewEmployee::default();
        assert!(blank.validate().is_err());

        let negative = NewEmployee {
            name: "Sam".into(),
            hourly_wage: -3.0,
            ..Default::default()
        };
        assert!(negative.validate().is_err());
    }
}
