// UI module - TUI components

pub mod dashboard;
pub mod detail;
pub mod help;
pub mod styles;


pub use dashboard::{build_rows, DashboardAction, DashboardState, FleetRow, PendingAction};
pub use detail::{DetailAction, DetailState, DetailTab};
pub use help::HelpState;
pub use styles::*;
