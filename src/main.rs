//! Lockdown Menu - system tray menu for the Lockdown firewall and VPN app
//!
//! Provides:
//! - System tray icon showing tunnel status (via `lockdown-menu menubar`)
//! - Popup panel: account, launch at login, links, support email, quit
//! - CLI helpers for launch at login and the signed-in account

mod autostart;
mod cli;
mod credentials;
mod host;
mod logging;
mod login;
mod panel;
mod settings;
mod single_instance;
mod support;
mod tray;
mod ui;
mod vpn;

use clap::Parser;
use cli::{exit_codes, Cli, Commands};
use logging::LogBuffer;
use settings::Settings;

fn main() {
    let exit_code = run();
    std::process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();

    let log_buffer = LogBuffer::new(Settings::load().log_buffer_capacity);

    // Initialize logging
    if let Err(e) = logging::init(cli.verbose, cli.json_output, cli.log_level.as_deref(), log_buffer.clone()) {
        eprintln!("Failed to initialize logging: {}", e);
        return exit_codes::UNEXPECTED_FAILURE;
    }

    match cli.command {
        Some(Commands::Autostart(args)) => block_on(cli::autostart::run(args)),
        Some(Commands::Account(args)) => block_on(cli::account::run(args)),
        Some(Commands::Menubar) | None => run_menubar(log_buffer),
    }
}

/// Run an async subcommand to completion and map its result to an exit code
fn block_on(command: impl std::future::Future<Output = anyhow::Result<()>>) -> i32 {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create runtime: {}", e);
            return exit_codes::UNEXPECTED_FAILURE;
        }
    };

    match rt.block_on(command) {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_codes::UNEXPECTED_FAILURE
        }
    }
}

fn run_menubar(log_buffer: LogBuffer) -> i32 {
    // Check for existing instance
    let _guard = match single_instance::SingleInstanceGuard::try_acquire() {
        Some(guard) => guard,
        None => {
            eprintln!("Lockdown is already running. Check your menu bar.");
            return exit_codes::SUCCESS;
        }
    };

    tracing::info!("Starting Lockdown Menu v{}", host::APP_VERSION);
    match ui::run(log_buffer) {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_codes::UNEXPECTED_FAILURE
        }
    }
}
