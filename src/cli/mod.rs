//! CLI module - command-line interface
//!
//! - `lockdown-menu` - defaults to the menu bar app
//! - `lockdown-menu menubar` - launch the tray icon and popup
//! - `lockdown-menu autostart` - manage launch at login
//! - `lockdown-menu account` - show or sign out the current account

pub mod account;
pub mod autostart;

use clap::{Parser, Subcommand};

pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const UNEXPECTED_FAILURE: i32 = 1;
}

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_COMMIT"),
    " ",
    env!("BUILD_DATE"),
    ")"
);

/// Lockdown Menu - tray menu for the Lockdown firewall and VPN
///
/// Defaults to launching the menu bar app when no subcommand is given.
#[derive(Parser, Debug)]
#[command(name = "lockdown-menu")]
#[command(author, version, long_version = LONG_VERSION, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit machine-readable logs (JSON) to stderr
    #[arg(long = "json-output", global = true)]
    pub json_output: bool,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(long = "log-level", global = true, value_parser = ["trace", "verbose", "debug", "info", "warning", "warn", "error", "critical"])]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the menu bar GUI application (default command)
    Menubar,

    /// Manage launch at login
    Autostart(autostart::AutostartArgs),

    /// Show the signed-in account, or sign out
    Account(account::AccountArgs),
}
