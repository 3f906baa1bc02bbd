//! Autostart command implementation
//!
//! Enables/disables launching Lockdown Menu at login, keeping the saved
//! `open_on_startup` preference in step with the OS registration

use clap::Args;

use crate::autostart;
use crate::settings::{FileSettingsStore, SettingsStore};

#[derive(Args, Debug)]
pub struct AutostartArgs {
    /// Launch at login
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,

    /// Stop launching at login
    #[arg(long, conflicts_with = "enable")]
    pub disable: bool,

    /// Show current auto-start status
    #[arg(long, conflicts_with_all = ["enable", "disable"])]
    pub status: bool,
}

fn status_line(registered: bool, preference: bool) -> String {
    let mut line = if registered {
        "Launch at login is enabled.".to_string()
    } else {
        "Launch at login is disabled.".to_string()
    };
    if registered != preference {
        line.push_str(" (saved preference disagrees; toggle it to resync)");
    }
    line
}

pub async fn run(args: AutostartArgs) -> anyhow::Result<()> {
    let store = FileSettingsStore::new()?;

    let requested = if args.enable {
        Some(true)
    } else if args.disable {
        Some(false)
    } else {
        None
    };

    match requested {
        Some(enabled) => {
            // Surface registration errors here; the store only logs them
            autostart::set_enabled(enabled)?;
            store.without_login_item().set_open_on_startup(enabled);
            if enabled {
                println!("Launch at login enabled.");
            } else {
                println!("Launch at login disabled.");
            }
        }
        None => {
            if !args.status {
                tracing::debug!("No autostart flag given, showing status");
            }
            println!("{}", status_line(autostart::is_enabled(), store.open_on_startup()));
        }
    }
    Ok(())
}
