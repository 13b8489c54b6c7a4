//! Parameter update protocol: save, lock toggle, sliders

use clap::ValueEnum;
use serde::Serialize;
use tracing::{info, warn};

use crewdash_domain::model::{BusinessParameters, LockState, ParameterUpdate, SavedParameters};
use crewdash_domain::repository::ParameterGateway;
use crewdash_types::{format_currency, Error, Result};

use crate::dashboard::SharedDashboard;
use crate::notify::{Notification, Notifier};

/// Dashboard sliders. Percent sliders run 0..=100, the rate slider is raw
/// currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Slider {
    #[value(name = "efficiency")]
    Efficiency,
    #[value(name = "margin")]
    ProfitMargin,
    #[value(name = "rate")]
    HourlyRate,
}

impl Slider {
    pub fn label(self) -> &'static str {
        match self {
            Slider::Efficiency => "Efficiency rate",
            Slider::ProfitMargin => "Profit margin multiplier",
            Slider::HourlyRate => "Hourly rate",
        }
    }

    /// Convert a slider position to the parameter value it stands for
    pub fn value_at(self, position: f64) -> Result<f64> {
        if !position.is_finite() {
            return Err(Error::InvalidInput(format!(
                "{} position must be a number",
                self.label()
            )));
        }
        match self {
            Slider::Efficiency | Slider::ProfitMargin => {
                if !(0.0..=100.0).contains(&position) {
                    return Err(Error::InvalidInput(format!(
                        "{} position must be between 0 and 100, got {}",
                        self.label(),
                        position
                    )));
                }
                Ok(position / 100.0)
            }
            Slider::HourlyRate => {
                if position < 0.0 {
                    return Err(Error::InvalidInput(format!(
                        "hourly rate must be >= 0, got {}",
                        position
                    )));
                }
                Ok(position)
            }
        }
    }

    /// Slider position for the current parameters
    pub fn position(self, params: &BusinessParameters) -> f64 {
        match self {
            Slider::Efficiency => (params.efficiency_rate * 100.0).round(),
            Slider::ProfitMargin => (params.profit_margin_multiplier * 100.0).round(),
            Slider::HourlyRate => params.hourly_rate,
        }
    }

    /// Text shown next to the slider
    pub fn display(self, params: &BusinessParameters) -> String {
        match self {
            Slider::Efficiency | Slider::ProfitMargin => format!("{}%", self.position(params)),
            Slider::HourlyRate => format_currency(params.hourly_rate),
        }
    }

    /// Single-parameter update that keeps the lock as it is
    pub fn update_for(self, value: f64) -> ParameterUpdate {
        let update = ParameterUpdate::new();
        match self {
            Slider::Efficiency => update.with_efficiency_rate(value),
            Slider::ProfitMargin => update.with_profit_margin_multiplier(value),
            Slider::HourlyRate => update.with_hourly_rate(value),
        }
    }
}

/// Drives parameter round trips and writes the echo into the shared state
pub struct ParameterService<'a> {
    gateway: &'a dyn ParameterGateway,
    state: &'a SharedDashboard,
    notifier: &'a dyn Notifier,
}

impl<'a> ParameterService<'a> {
    pub fn new(
        gateway: &'a dyn ParameterGateway,
        state: &'a SharedDashboard,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            gateway,
            state,
            notifier,
        }
    }

    /// Fetch the stored parameters into the state
    pub async fn load(&self) -> Result<BusinessParameters> {
        match self.gateway.fetch_parameters().await {
            Ok(params) => {
                self.state.update(|s| s.apply_parameters(params));
                Ok(params)
            }
            Err(e) => {
                self.notifier
                    .notify(Notification::error(format!("Error loading parameters: {}", e)));
                Err(e)
            }
        }
    }

    /// Submit a partial update; on success the echo replaces local state
    pub async fn save(&self, update: &ParameterUpdate) -> Result<SavedParameters> {
        if update.is_empty() && update.preserve_lock_state {
            return Err(Error::InvalidInput(
                "nothing to save: give at least one parameter".to_string(),
            ));
        }

        let result = match update.validate() {
            Ok(()) => self.gateway.save_parameters(update).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(saved) => {
                self.state.update(|s| s.apply_saved(saved.clone()));
                info!(
                    efficiency_rate = ?update.efficiency_rate,
                    profit_margin_multiplier = ?update.profit_margin_multiplier,
                    hourly_rate = ?update.hourly_rate,
                    preserve_lock_state = update.preserve_lock_state,
                    "parameters saved"
                );
                self.notifier
                    .notify(Notification::success("Parameters saved successfully"));
                Ok(saved)
            }
            Err(e) => {
                warn!(error = %e, "parameter save failed, local state unchanged");
                self.notifier
                    .notify(Notification::error(format!("Error saving parameters: {}", e)));
                Err(e)
            }
        }
    }

    /// Flip the rate lock, sending the current rate so locking pins it
    pub async fn toggle_lock(&self) -> Result<LockState> {
        let current = self.state.current();
        let rate = current.metrics.hourly_rate;
        let rate = if rate > 0.0 {
            rate
        } else {
            current.parameters.hourly_rate
        };
        let update = ParameterUpdate::new()
            .with_hourly_rate(rate)
            .preserving_lock(false);

        let saved = self.save(&update).await?;
        let lock_state = saved
            .parameters
            .map(|p| p.lock_state)
            .or_else(|| saved.metrics.as_ref().map(|m| m.lock_state()))
            .unwrap_or_else(|| current.parameters.lock_state.toggled());

        if saved.parameters.is_none() {
            self.state.update(|s| {
                let mut params = s.parameters;
                params.lock_state = lock_state;
                s.apply_parameters(params);
            });
        }

        let message = match lock_state {
            LockState::Locked => format!("Hourly rate locked at {}", format_currency(rate)),
            LockState::Unlocked => "Hourly rate unlocked".to_string(),
        };
        self.notifier.notify(Notification::info(message));
        Ok(lock_state)
    }

    /// Release a slider at `position` and save that one parameter
    pub async fn slide(&self, slider: Slider, position: f64) -> Result<SavedParameters> {
        let value = match slider.value_at(position) {
            Ok(v) => v,
            Err(e) => {
                self.notifier.notify(Notification::error(e.to_string()));
                return Err(e);
            }
        };
        self.save(&slider.update_for(value)).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::dashboard::testing::sample_dashboard;
    use crate::dashboard::DashboardState;
    use crate::notify::testing::RecordingNotifier;
    use crate::notify::NotificationLevel;
    use crewdash_domain::model::ServerMetrics;

    /// Merges updates like the backend does and echoes the result
    struct FakeGateway {
        stored: Mutex<BusinessParameters>,
        sent: Mutex<Vec<ParameterUpdate>>,
        fail: bool,
    }

    impl FakeGateway {
        fn new(stored: BusinessParameters) -> Self {
            Self {
                stored: Mutex::new(stored),
                sent: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new(BusinessParameters::default())
            }
        }
    }

    #[async_trait]
    impl ParameterGateway for FakeGateway {
        async fn fetch_parameters(&self) -> Result<BusinessParameters> {
            if self.fail {
                return Err(Error::Http("connection refused".into()));
            }
            Ok(*self.stored.lock().unwrap())
        }

        async fn save_parameters(&self, update: &ParameterUpdate) -> Result<SavedParameters> {
            self.sent.lock().unwrap().push(update.clone());
            if self.fail {
                return Err(Error::Api {
                    status: 500,
                    message: "database unavailable".into(),
                });
            }
            let mut stored = self.stored.lock().unwrap();
            if let Some(v) = update.efficiency_rate {
                stored.efficiency_rate = v;
            }
            if let Some(v) = update.profit_margin_multiplier {
                stored.profit_margin_multiplier = v;
            }
            if let Some(v) = update.hourly_rate {
                stored.hourly_rate = v;
            }
            if !update.preserve_lock_state {
                stored.lock_state = stored.lock_state.toggled();
            }
            Ok(SavedParameters {
                metrics: Some(ServerMetrics {
                    hourly_rate: stored.hourly_rate,
                    is_rate_locked: stored.lock_state.is_locked(),
                    ..Default::default()
                }),
                parameters: Some(*stored),
            })
        }
    }

    fn unlocked() -> BusinessParameters {
        BusinessParameters {
            efficiency_rate: 0.5,
            profit_margin_multiplier: 0.7,
            hourly_rate: 100.0,
            lock_state: LockState::Unlocked,
        }
    }

    #[test]
    fn test_slider_positions_map_to_fractions() {
        assert!((Slider::Efficiency.value_at(55.0).unwrap() - 0.55).abs() < 1e-12);
        assert!((Slider::ProfitMargin.value_at(100.0).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(Slider::HourlyRate.value_at(137.5).unwrap(), 137.5);
        assert!(Slider::Efficiency.value_at(101.0).is_err());
        assert!(Slider::ProfitMargin.value_at(-1.0).is_err());
        assert!(Slider::HourlyRate.value_at(-0.01).is_err());
        assert!(Slider::HourlyRate.value_at(f64::NAN).is_err());
    }

    #[test]
    fn test_slider_display() {
        let params = unlocked();
        assert_eq!(Slider::Efficiency.position(&params), 50.0);
        assert_eq!(Slider::Efficiency.display(&params), "50%");
        assert_eq!(Slider::ProfitMargin.display(&params), "70%");
        assert_eq!(Slider::HourlyRate.display(&params), "$100.00");
    }

    #[test]
    fn test_slider_update_preserves_lock() {
        let update = Slider::ProfitMargin.update_for(0.65);
        assert!(update.preserve_lock_state);
        assert_eq!(update.profit_margin_multiplier, Some(0.65));
        assert!(update.efficiency_rate.is_none());
        assert!(update.hourly_rate.is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites_state_with_echo() {
        let gateway = FakeGateway::new(unlocked());
        let state = SharedDashboard::new(DashboardState::from_dashboard(sample_dashboard()));
        let notifier = RecordingNotifier::default();
        let service = ParameterService::new(&gateway, &state, &notifier);

        let update = ParameterUpdate::new().with_efficiency_rate(0.6);
        service.save(&update).await.unwrap();

        let current = state.current();
        // server held Unlocked/100, so the echo replaces the sample's Locked state
        assert_eq!(current.parameters.lock_state, LockState::Unlocked);
        assert!((current.parameters.efficiency_rate - 0.6).abs() < 1e-12);
        assert_eq!(current.server_metrics.total_expenses, 0.0);
        assert_eq!(notifier.levels(), vec![NotificationLevel::Success]);
    }

    #[tokio::test]
    async fn test_save_failure_leaves_state_untouched() {
        let gateway = FakeGateway::failing();
        let state = SharedDashboard::new(DashboardState::from_dashboard(sample_dashboard()));
        let before = state.current();
        let notifier = RecordingNotifier::default();
        let service = ParameterService::new(&gateway, &state, &notifier);

        let err = service
            .save(&ParameterUpdate::new().with_hourly_rate(120.0))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api { status: 500, .. }));
        assert_eq!(state.current(), before);
        let last = notifier.last().unwrap();
        assert_eq!(last.level, NotificationLevel::Error);
        assert!(last.message.contains("database unavailable"));
    }

    #[tokio::test]
    async fn test_invalid_update_not_sent() {
        let gateway = FakeGateway::new(unlocked());
        let state = SharedDashboard::default();
        let notifier = RecordingNotifier::default();
        let service = ParameterService::new(&gateway, &state, &notifier);

        let err = service
            .save(&ParameterUpdate::new().with_efficiency_rate(1.2))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(gateway.sent.lock().unwrap().is_empty());

        assert!(service.save(&ParameterUpdate::new()).await.is_err());
        assert!(gateway.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_lock_round_trip() {
        let gateway = FakeGateway::new(unlocked());
        let state = SharedDashboard::default();
        let notifier = RecordingNotifier::default();
        let service = ParameterService::new(&gateway, &state, &notifier);
        service.load().await.unwrap();

        assert_eq!(service.toggle_lock().await.unwrap(), LockState::Locked);
        {
            let sent = gateway.sent.lock().unwrap();
            assert!(!sent[0].preserve_lock_state);
            assert!(sent[0].hourly_rate.is_some());
        }
        assert_eq!(state.current().parameters.lock_state, LockState::Locked);

        assert_eq!(service.toggle_lock().await.unwrap(), LockState::Unlocked);
        assert_eq!(state.current().parameters.lock_state, LockState::Unlocked);
        assert_eq!(
            notifier.last().map(|n| n.message),
            Some("Hourly rate unlocked".to_string())
        );
    }

    #[tokio::test]
    async fn test_locking_pins_the_displayed_rate() {
        let gateway = FakeGateway::new(unlocked());
        let state = SharedDashboard::new(DashboardState::from_dashboard(sample_dashboard()));
        state.update(|s| s.apply_parameters(unlocked()));
        let shown = state.current().metrics.hourly_rate;
        let notifier = RecordingNotifier::default();
        let service = ParameterService::new(&gateway, &state, &notifier);

        service.toggle_lock().await.unwrap();
        let current = state.current();
        assert_eq!(current.parameters.lock_state, LockState::Locked);
        assert!((current.parameters.hourly_rate - shown).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_slide_sends_single_parameter() {
        let gateway = FakeGateway::new(unlocked());
        let state = SharedDashboard::default();
        let notifier = RecordingNotifier::default();
        let service = ParameterService::new(&gateway, &state, &notifier);

        service.slide(Slider::Efficiency, 65.0).await.unwrap();
        let sent = gateway.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].efficiency_rate, Some(0.65));
        assert!(sent[0].preserve_lock_state);
        assert_eq!(state.current().parameters.lock_state, LockState::Unlocked);

        assert!(service.slide(Slider::Efficiency, 150.0).await.is_err());
        assert_eq!(gateway.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_identical_saves_give_identical_state() {
        let gateway = FakeGateway::new(unlocked());
        let state = SharedDashboard::new(DashboardState::from_dashboard(sample_dashboard()));
        let notifier = RecordingNotifier::default();
        let service = ParameterService::new(&gateway, &state, &notifier);
        let update = ParameterUpdate::new()
            .with_efficiency_rate(0.6)
            .with_hourly_rate(110.0);

        service.save(&update).await.unwrap();
        let first = state.current().metrics;
        service.save(&update).await.unwrap();
        assert_eq!(state.current().metrics, first);
    }
}
