//! System tray module for Lockdown Menu
//!
//! Provides the padlock icon and tray menu management

pub mod icon;
pub mod manager;

pub use manager::{TrayManager, TrayMenuAction};
