//! CSV loader for bulk employee import
//!
//! Expected header (any order, extra columns ignored):
//! `name,phone,email,position,hours_per_week,hourly_wage`
//!
//! Only `name` is required. Blank hours or wage cells fall back to the
//! employee defaults.

use std::io::Read;
use std::path::Path;

use thiserror::Error;

use crewdash_domain::model::employee::{DEFAULT_HOURLY_WAGE, DEFAULT_HOURS_PER_WEEK};
use crewdash_domain::model::NewEmployee;

#[derive(Error, Debug)]
pub enum EmployeeCsvError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse CSV: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Invalid number in row {row}, column {column}: {value}")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Invalid employee in row {row}: {message}")]
    InvalidRow { row: usize, message: String },
}

impl From<EmployeeCsvError> for crewdash_types::Error {
    fn from(e: EmployeeCsvError) -> Self {
        match e {
            EmployeeCsvError::IoError(io) => crewdash_types::Error::Io(io),
            other => crewdash_types::Error::Csv(other.to_string()),
        }
    }
}

/// A parsed employee with the CSV row it came from
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeRow {
    pub row: usize,
    pub employee: NewEmployee,
}

struct Columns {
    name: usize,
    phone: Option<usize>,
    email: Option<usize>,
    position: Option<usize>,
    hours_per_week: Option<usize>,
    hourly_wage: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, EmployeeCsvError> {
        let find = |col: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(col))
        };
        let name = find("name").ok_or_else(|| EmployeeCsvError::MissingColumn("name".into()))?;
        Ok(Self {
            name,
            phone: find("phone"),
            email: find("email"),
            position: find("position"),
            hours_per_week: find("hours_per_week"),
            hourly_wage: find("hourly_wage"),
        })
    }
}

pub fn load_employees<P: AsRef<Path>>(path: P) -> Result<Vec<EmployeeRow>, EmployeeCsvError> {
    let file = std::fs::File::open(path)?;
    read_employees(file)
}

pub fn read_employees<R: Read>(reader: R) -> Result<Vec<EmployeeRow>, EmployeeCsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let columns = Columns::from_headers(&headers)?;

    let mut rows = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result?;
        let row = row_idx + 2; // header is row 1
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let employee = parse_record(&record, &columns, row)?;
        rows.push(EmployeeRow { row, employee });
    }

    Ok(rows)
}

fn parse_record(
    record: &csv::StringRecord,
    columns: &Columns,
    row: usize,
) -> Result<NewEmployee, EmployeeCsvError> {
    let text = |idx: Option<usize>| {
        idx.and_then(|i| record.get(i))
            .unwrap_or("")
            .to_string()
    };

    let employee = NewEmployee {
        name: text(Some(columns.name)),
        phone: text(columns.phone),
        email: text(columns.email),
        position: text(columns.position),
        hours_per_week: parse_f64(
            record,
            columns.hours_per_week,
            row,
            "hours_per_week",
            DEFAULT_HOURS_PER_WEEK,
        )?,
        hourly_wage: parse_f64(
            record,
            columns.hourly_wage,
            row,
            "hourly_wage",
            DEFAULT_HOURLY_WAGE,
        )?,
    };

    employee
        .validate()
        .map_err(|e| EmployeeCsvError::InvalidRow {
            row,
            message: e.to_string(),
        })?;
    Ok(employee)
}

fn parse_f64(
    record: &csv::StringRecord,
    idx: Option<usize>,
    row: usize,
    column: &str,
    default: f64,
) -> Result<f64, EmployeeCsvError> {
    let raw = idx.and_then(|i| record.get(i)).unwrap_or("");
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    if cleaned.is_empty() {
        return Ok(default);
    }

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| EmployeeCsvError::InvalidNumber {
            row,
            column: column.to_string(),
            value: raw.to_string(),
        })
}
