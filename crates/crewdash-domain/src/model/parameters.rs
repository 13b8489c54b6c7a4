//! Business parameters and the hourly-rate lock

use serde::{Deserialize, Deserializer, Serialize};

use crewdash_types::money::{lenient, lenient_bool};
use crewdash_types::{Error, Result};

pub const DEFAULT_EFFICIENCY_RATE: f64 = 0.55;
pub const DEFAULT_PROFIT_MARGIN_MULTIPLIER: f64 = 0.7;
pub const DEFAULT_HOURLY_RATE: f64 = 125.0;

/// Whether the hourly rate is pinned or recalculated from the other parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "bool", into = "bool")]
pub enum LockState {
    Locked,
    #[default]
    Unlocked,
}

impl LockState {
    pub fn is_locked(self) -> bool {
        self == LockState::Locked
    }

    pub fn toggled(self) -> Self {
        match self {
            LockState::Locked => LockState::Unlocked,
            LockState::Unlocked => LockState::Locked,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LockState::Locked => "locked",
            LockState::Unlocked => "unlocked",
        }
    }
}

impl From<bool> for LockState {
    fn from(locked: bool) -> Self {
        if locked {
            LockState::Locked
        } else {
            LockState::Unlocked
        }
    }
}

impl From<LockState> for bool {
    fn from(state: LockState) -> Self {
        state.is_locked()
    }
}

impl std::fmt::Display for LockState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

fn lenient_lock<'de, D>(deserializer: D) -> std::result::Result<LockState, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_bool(deserializer).map(LockState::from)
}

fn default_efficiency_rate() -> f64 {
    DEFAULT_EFFICIENCY_RATE
}

fn default_profit_margin_multiplier() -> f64 {
    DEFAULT_PROFIT_MARGIN_MULTIPLIER
}

fn default_hourly_rate() -> f64 {
    DEFAULT_HOURLY_RATE
}

/// The three tunable pricing parameters plus the rate lock
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BusinessParameters {
    /// Share of available hours that end up billed (0..=1)
    #[serde(default = "default_efficiency_rate", deserialize_with = "lenient")]
    pub efficiency_rate: f64,

    /// Cost share of the recommended rate (0..=1); margin is `1 - multiplier`
    #[serde(
        default = "default_profit_margin_multiplier",
        deserialize_with = "lenient"
    )]
    pub profit_margin_multiplier: f64,

    #[serde(default = "default_hourly_rate", deserialize_with = "lenient")]
    pub hourly_rate: f64,

    #[serde(default, alias = "is_rate_locked", deserialize_with = "lenient_lock")]
    pub lock_state: LockState,
}

impl Default for BusinessParameters {
    fn default() -> Self {
        Self {
            efficiency_rate: DEFAULT_EFFICIENCY_RATE,
            profit_margin_multiplier: DEFAULT_PROFIT_MARGIN_MULTIPLIER,
            hourly_rate: DEFAULT_HOURLY_RATE,
            lock_state: LockState::Unlocked,
        }
    }
}

impl BusinessParameters {
    /// Profit margin expressed as a fraction (`1 - multiplier`)
    pub fn profit_margin(&self) -> f64 {
        1.0 - self.profit_margin_multiplier
    }

    pub fn validate(&self) -> Result<()> {
        check_fraction("efficiency_rate", self.efficiency_rate)?;
        check_fraction("profit_margin_multiplier", self.profit_margin_multiplier)?;
        check_rate(self.hourly_rate)
    }
}

fn check_fraction(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "{} must be between 0 and 1, got {}",
            name, value
        )))
    }
}

fn check_rate(value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "hourly_rate must be a non-negative amount, got {}",
            value
        )))
    }
}

/// Partial parameter save request (`POST /save_business_parameters`)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParameterUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub efficiency_rate: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_margin_multiplier: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<f64>,

    /// `false` asks the server to toggle the stored lock flag
    pub preserve_lock_state: bool,
}

impl ParameterUpdate {
    /// An empty update that keeps the current lock state
    pub fn new() -> Self {
        Self {
            preserve_lock_state: true,
            ..Default::default()
        }
    }

    pub fn with_efficiency_rate(mut self, value: f64) -> Self {
        self.efficiency_rate = Some(value);
        self
    }

    pub fn with_profit_margin_multiplier(mut self, value: f64) -> Self {
        self.profit_margin_multiplier = Some(value);
        self
    }

    pub fn with_hourly_rate(mut self, value: f64) -> Self {
        self.hourly_rate = Some(value);
        self
    }

    pub fn preserving_lock(mut self, preserve: bool) -> Self {
        self.preserve_lock_state = preserve;
        self
    }

    /// True when no numeric parameter is set
    pub fn is_empty(&self) -> bool {
        self.efficiency_rate.is_none()
            && self.profit_margin_multiplier.is_none()
            && self.hourly_rate.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(v) = self.efficiency_rate {
            check_fraction("efficiency_rate", v)?;
        }
        if let Some(v) = self.profit_margin_multiplier {
            check_fraction("profit_margin_multiplier", v)?;
        }
        if let Some(v) = self.hourly_rate {
            check_rate(v)?;
        }
        Ok(())
    }
}
