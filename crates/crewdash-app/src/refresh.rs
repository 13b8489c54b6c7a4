//! Periodic dashboard refresh

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crewdash_domain::repository::DashboardSource;

use crate::dashboard::{refresh_dashboard, SharedDashboard};
use crate::notify::{Notification, Notifier};

/// Shortest period `spawn_refresh` will tick at
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(100);

/// Handle to a running refresh task. Dropping it stops the task.
pub struct RefreshHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
    updates: watch::Receiver<u64>,
}

impl RefreshHandle {
    /// Receiver that ticks once per successful refresh
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.updates.clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop the task and wait for it to exit
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            // a cancelled task always exits cleanly; a panic has already been reported
            let _ = task.await;
        }
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Spawn a task that fetches the dashboard every `interval`, starting
/// immediately. Failed fetches are reported and the previous state is kept.
/// Intervals below [`MIN_REFRESH_INTERVAL`] are raised to it.
pub fn spawn_refresh(
    source: Arc<dyn DashboardSource>,
    state: SharedDashboard,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
) -> RefreshHandle {
    let interval = if interval < MIN_REFRESH_INTERVAL {
        warn!(
            requested_ms = interval.as_millis() as u64,
            "refresh interval too short, using minimum"
        );
        MIN_REFRESH_INTERVAL
    } else {
        interval
    };
    let token = CancellationToken::new();
    let (tx, rx) = watch::channel(0u64);
    let cancel = token.clone();

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_secs = interval.as_secs_f64(), "dashboard refresh started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let outcome = tokio::select! {
                _ = cancel.cancelled() => break,
                outcome = refresh_dashboard(source.as_ref(), &state) => outcome,
            };

            match outcome {
                Ok(()) => {
                    tx.send_modify(|generation| *generation += 1);
                }
                Err(e) => {
                    notifier.notify(Notification::error(format!("Error refreshing dashboard: {}", e)));
                }
            }
        }

        debug!("dashboard refresh stopped");
    });

    RefreshHandle {
        token,
        task: Some(task),
        updates: rx,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::testing::{sample_dashboard, ScriptedSource};
    use crate::notify::testing::RecordingNotifier;
    use crate::notify::NotificationLevel;
    use crewdash_types::Error;

    #[tokio::test]
    async fn test_refresh_applies_snapshots() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(sample_dashboard())]));
        let state = SharedDashboard::default();
        let notifier = Arc::new(RecordingNotifier::default());

        let handle = spawn_refresh(
            source.clone(),
            state.clone(),
            notifier.clone(),
            Duration::from_millis(10),
        );
        let mut updates = handle.subscribe();
        updates.changed().await.unwrap();
        assert!(handle.is_running());

        assert_eq!(state.current().snapshot.trucks.len(), 1);
        handle.shutdown().await;
        assert!(notifier.levels().is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_stops_fetching() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(sample_dashboard())]));
        let handle = spawn_refresh(
            source.clone(),
            SharedDashboard::default(),
            Arc::new(RecordingNotifier::default()),
            Duration::from_millis(5),
        );
        let mut updates = handle.subscribe();
        updates.changed().await.unwrap();

        handle.shutdown().await;
        let calls = source.calls();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(source.calls(), calls);
    }

    #[tokio::test]
    async fn test_drop_cancels_task() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(sample_dashboard())]));
        let handle = spawn_refresh(
            source.clone(),
            SharedDashboard::default(),
            Arc::new(RecordingNotifier::default()),
            Duration::from_millis(5),
        );
        let mut updates = handle.subscribe();
        updates.changed().await.unwrap();
        drop(handle);

        // let the task observe cancellation
        tokio::time::sleep(Duration::from_millis(20)).await;
        let calls = source.calls();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(source.calls(), calls);
    }

    #[tokio::test]
    async fn test_zero_interval_is_clamped() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(sample_dashboard())]));
        let handle = spawn_refresh(
            source.clone(),
            SharedDashboard::default(),
            Arc::new(RecordingNotifier::default()),
            Duration::ZERO,
        );
        let mut updates = handle.subscribe();
        updates.changed().await.unwrap();

        tokio::time::sleep(MIN_REFRESH_INTERVAL / 4).await;
        assert!(handle.is_running());
        assert_eq!(source.calls(), 1);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_failed_refresh_notifies_and_keeps_state() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(sample_dashboard()),
            Err(Error::Http("connection refused".into())),
        ]));
        let state = SharedDashboard::default();
        let notifier = Arc::new(RecordingNotifier::default());
        let handle = spawn_refresh(
            source.clone(),
            state.clone(),
            notifier.clone(),
            Duration::from_millis(5),
        );
        let mut updates = handle.subscribe();
        updates.changed().await.unwrap();
        let good = state.current();

        while notifier.levels().is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        handle.shutdown().await;

        assert_eq!(notifier.levels()[0], NotificationLevel::Error);
        assert_eq!(state.current(), good);
    }
}
