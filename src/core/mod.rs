// Core logic: metrics, sparklines, taskbar placement

pub mod config;
pub mod dashboard;
pub mod sparkline;
pub mod taskbar;
pub mod values;
pub mod widget;

pub use config::{Settings, SettingsWatcher};
pub use dashboard::Dashboard;
pub use widget::{MenuAction, MenuCommand, WidgetApp};
