//! CLI definition using clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crewdash_app::Slider;
use crewdash_types::OutputFormat;

#[derive(Parser)]
#[command(name = "crewdash")]
#[command(version)]
#[command(about = "Financial dashboard and records client for truck-based service crews")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API base URL. Uses config value if not specified.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the dashboard metrics reported by the server
    Dashboard {
        /// Keep refreshing until Ctrl-C
        #[arg(long, short = 'w')]
        watch: bool,

        /// Refresh interval in seconds. Uses config value if not specified.
        #[arg(long, short = 'i')]
        interval: Option<u64>,
    },

    /// Recompute metrics locally from the dashboard snapshot, with breakdown
    Metrics,

    /// Business parameters and the hourly-rate lock
    Params {
        #[command(subcommand)]
        action: ParamsAction,
    },

    /// Manage employees
    Employees {
        #[command(subcommand)]
        action: EmployeesAction,
    },

    /// Manage trucks
    Trucks {
        #[command(subcommand)]
        action: TrucksAction,
    },

    /// Monthly overhead categories
    Overhead {
        #[command(subcommand)]
        action: OverheadAction,
    },

    /// Export the dashboard to Excel
    Export {
        /// Output Excel file path
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set API base URL
        #[arg(long)]
        set_api_url: Option<String>,

        /// Set refresh interval in seconds
        #[arg(long)]
        set_interval: Option<u64>,

        /// Set request timeout in seconds
        #[arg(long)]
        set_timeout: Option<u64>,

        /// Set default output format
        #[arg(long)]
        set_output: Option<OutputFormat>,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },
}

#[derive(Subcommand)]
pub enum ParamsAction {
    /// Show stored parameters
    Show,

    /// Save one or more parameters
    Set {
        /// Efficiency rate as a fraction (0.0-1.0)
        #[arg(long)]
        efficiency: Option<f64>,

        /// Profit margin multiplier as a fraction (0.0-1.0)
        #[arg(long)]
        margin: Option<f64>,

        /// Hourly rate
        #[arg(long)]
        rate: Option<f64>,

        /// Flip the rate lock with this save
        #[arg(long)]
        toggle_lock: bool,
    },

    /// Toggle the hourly-rate lock, pinning the current rate when locking
    Lock,

    /// Move a slider and save that parameter
    Slide {
        /// Which slider
        #[arg(value_enum)]
        slider: Slider,

        /// Position: 0-100 for efficiency/margin, currency for rate
        position: f64,
    },
}

#[derive(Args)]
pub struct EmployeeFields {
    /// Full name
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub position: Option<String>,

    /// Hours per week
    #[arg(long)]
    pub hours: Option<f64>,

    /// Hourly wage
    #[arg(long)]
    pub wage: Option<f64>,
}

#[derive(Subcommand)]
pub enum EmployeesAction {
    /// List all employees
    List,

    /// Show one employee
    Show { id: String },

    /// Add an employee
    Add {
        #[command(flatten)]
        fields: EmployeeFields,
    },

    /// Update fields of an existing employee
    Update {
        id: String,

        #[command(flatten)]
        fields: EmployeeFields,
    },

    /// Delete an employee
    Delete { id: String },

    /// Import employees from CSV (name,phone,email,position,hours_per_week,hourly_wage)
    Import { file: PathBuf },
}

/// Truck fields; on update only the given ones change
#[derive(Args)]
pub struct TruckFields {
    #[arg(long)]
    pub name: Option<String>,

    /// active, maintenance, ...
    #[arg(long)]
    pub status: Option<String>,

    #[arg(long)]
    pub make: Option<String>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub year: Option<String>,

    #[arg(long)]
    pub plate: Option<String>,

    /// Monthly loan payment
    #[arg(long)]
    pub loan: Option<f64>,

    #[arg(long)]
    pub insurance: Option<f64>,

    #[arg(long)]
    pub fuel: Option<f64>,

    #[arg(long)]
    pub maintenance: Option<f64>,

    #[arg(long)]
    pub other: Option<f64>,

    /// Effective hours per week (defaults to the crew's hours)
    #[arg(long)]
    pub hours: Option<f64>,

    /// Crew employee ids, comma separated
    #[arg(long, value_delimiter = ',')]
    pub crew: Option<Vec<String>>,

    #[arg(long)]
    pub service_area: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Subcommand)]
pub enum TrucksAction {
    /// List all trucks with monthly figures
    List,

    /// Show one truck with its crew
    Show { id: String },

    /// Add a truck
    Add {
        #[command(flatten)]
        fields: TruckFields,
    },

    /// Update fields of an existing truck
    Update {
        id: String,

        #[command(flatten)]
        fields: TruckFields,
    },

    /// Delete a truck
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum OverheadAction {
    /// Show monthly overhead categories
    Show,

    /// Add or change a category
    Set {
        /// Category name, e.g. rent
        key: String,

        /// Monthly amount
        amount: f64,
    },

    /// Remove a category
    Remove { key: String },
}
