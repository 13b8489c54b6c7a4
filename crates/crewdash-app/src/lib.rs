//! Application service layer - config, dashboard state, parameters, overhead, refresh, export

pub mod config;
pub mod dashboard;
pub mod export;
pub mod import;
pub mod notify;
pub mod overhead;
pub mod parameters;
pub mod refresh;
pub mod repository;
pub mod view;

pub use config::Config;
pub use dashboard::{refresh_dashboard, DashboardState, SharedDashboard};
pub use notify::{LogNotifier, Notification, NotificationLevel, Notifier};
pub use overhead::OverheadService;
pub use parameters::{ParameterService, Slider};
pub use refresh::{spawn_refresh, RefreshHandle};
