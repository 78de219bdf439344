// Sysfleet - Remote Systemd Service Monitor TUI
// Library root

pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod inventory;
pub mod remote;
pub mod ui;
pub mod version;

// Test modules (only compiled during tests)
#[cfg(test)]
mod app_tests;
