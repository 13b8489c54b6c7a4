//! Monthly overhead categories
//!
//! The server stores the whole category map; every edit is a
//! fetch-modify-save of that map.

use tracing::{info, warn};

use crewdash_domain::model::{is_excluded_key, OverheadCosts};
use crewdash_domain::repository::OverheadGateway;
use crewdash_types::{format_currency, Error, Result};

use crate::notify::{Notification, Notifier};

pub struct OverheadService<'a> {
    gateway: &'a dyn OverheadGateway,
    notifier: &'a dyn Notifier,
}

fn check_key(key: &str) -> Result<&str> {
    let key = key.trim();
    if key.is_empty() {
        return Err(Error::InvalidInput("category name is required".to_string()));
    }
    Ok(key)
}

impl<'a> OverheadService<'a> {
    pub fn new(gateway: &'a dyn OverheadGateway, notifier: &'a dyn Notifier) -> Self {
        Self { gateway, notifier }
    }

    pub async fn load(&self) -> Result<OverheadCosts> {
        self.gateway.fetch_overhead().await.map_err(|e| {
            self.notifier
                .notify(Notification::error(format!("Error loading overhead: {}", e)));
            e
        })
    }

    /// Add or change one category
    pub async fn set(&self, key: &str, amount: f64) -> Result<OverheadCosts> {
        let key = check_key(key)?;
        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::InvalidInput(format!(
                "amount for {} must be a non-negative number, got {}",
                key, amount
            )));
        }

        let mut costs = self.load().await?;
        costs.insert(key, amount);
        self.store(&costs).await?;

        info!(key, amount, "overhead category set");
        let mut message = format!("{} set to {}", key, format_currency(amount));
        if is_excluded_key(key) {
            message.push_str(" (tracked per truck/employee, not added to total expenses)");
        }
        self.notifier.notify(Notification::success(message));
        Ok(costs)
    }

    /// Drop one category; unknown names are an error and nothing is sent
    pub async fn remove(&self, key: &str) -> Result<OverheadCosts> {
        let key = check_key(key)?;
        let mut costs = self.load().await?;
        if costs.remove(key).is_none() {
            return Err(Error::NotFound(format!("overhead category '{}'", key)));
        }
        self.store(&costs).await?;

        info!(key, "overhead category removed");
        self.notifier
            .notify(Notification::success(format!("{} removed", key)));
        Ok(costs)
    }

    async fn store(&self, costs: &OverheadCosts) -> Result<()> {
        self.gateway.save_overhead(costs).await.map_err(|e| {
            warn!(error = %e, "overhead save failed");
            self.notifier
                .notify(Notification::error(format!("Error saving overhead: {}", e)));
            e
        })
    }
}
