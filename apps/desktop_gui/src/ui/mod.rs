//! UI layer for the desktop dashboard: app shell, tab panels and theme.

pub mod app;
pub mod panels;
pub mod theme;

pub use app::{load_persisted_settings, DashboardApp, SETTINGS_STORAGE_KEY};
