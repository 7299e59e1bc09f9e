//! GUI panels and application state.

pub mod app;
pub mod components;
pub mod dashboard;
pub mod equipment_panel;
pub mod reports_panel;

pub use app::App;
