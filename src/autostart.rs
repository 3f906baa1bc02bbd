//! Launch-at-login registration
//!
//! - Windows: `HKCU\Software\Microsoft\Windows\CurrentVersion\Run` value
//! - macOS: `~/Library/LaunchAgents/com.confirmed.lockdown.menu.plist`
//! - Linux: `$XDG_CONFIG_HOME/autostart/lockdown-menu.desktop`

use std::io;
use std::path::PathBuf;

const APP_NAME: &str = "Lockdown";

#[derive(Debug, thiserror::Error)]
pub enum AutostartError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Could not determine autostart location")]
    PathNotAvailable,
}

/// Command line registered to run at login
fn launch_command() -> Result<(PathBuf, Vec<&'static str>), AutostartError> {
    let exe = std::env::current_exe()?;
    Ok((exe, vec!["menubar"]))
}

#[cfg(target_os = "windows")]
const RUN_KEY: &str = r"Software\Microsoft\Windows\CurrentVersion\Run";

/// Register the app to start at login
#[cfg(target_os = "windows")]
pub fn enable() -> Result<(), AutostartError> {
    use winreg::enums::*;
    use winreg::RegKey;

    let (exe, args) = launch_command()?;
    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    let (run_key, _) = hkcu.create_subkey(RUN_KEY)?;
    let cmd = format!("\"{}\" {}", exe.display(), args.join(" "));
    run_key.set_value(APP_NAME, &cmd)?;
    Ok(())
}

/// Remove the login registration
#[cfg(target_os = "windows")]
pub fn disable() -> Result<(), AutostartError> {
    use winreg::enums::*;
    use winreg::RegKey;

    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    let run_key = match hkcu.open_subkey_with_flags(RUN_KEY, KEY_READ | KEY_WRITE) {
        Ok(key) => key,
        // Key doesn't exist, already disabled
        Err(_) => return Ok(()),
    };
    match run_key.delete_value(APP_NAME) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(target_os = "windows")]
pub fn is_enabled() -> bool {
    use winreg::enums::*;
    use winreg::RegKey;

    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    hkcu.open_subkey(RUN_KEY)
        .and_then(|key| key.get_value::<String, _>(APP_NAME))
        .is_ok()
}

#[cfg(not(target_os = "windows"))]
fn entry_path() -> Result<PathBuf, AutostartError> {
    #[cfg(target_os = "macos")]
    let path = dirs::home_dir().map(|home| {
        home.join("Library")
            .join("LaunchAgents")
            .join("com.confirmed.lockdown.menu.plist")
    });

    #[cfg(not(target_os = "macos"))]
    let path = dirs::config_dir().map(|config| config.join("autostart").join("lockdown-menu.desktop"));

    path.ok_or(AutostartError::PathNotAvailable)
}

#[cfg(target_os = "macos")]
fn entry_contents() -> Result<String, AutostartError> {
    let (exe, args) = launch_command()?;
    let arguments: String = std::iter::once(exe.display().to_string())
        .chain(args.iter().map(|a| a.to_string()))
        .map(|a| format!("        <string>{}</string>\n", a))
        .collect();

    Ok(format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Label</key>
    <string>com.confirmed.lockdown.menu</string>
    <key>ProgramArguments</key>
    <array>
{}    </array>
    <key>RunAtLoad</key>
    <true/>
</dict>
</plist>
"#,
        arguments
    ))
}

#[cfg(all(not(target_os = "windows"), not(target_os = "macos")))]
fn entry_contents() -> Result<String, AutostartError> {
    let (exe, args) = launch_command()?;
    Ok(format!(
        "[Desktop Entry]\nType=Application\nName={}\nExec=\"{}\" {}\nX-GNOME-Autostart-enabled=true\n",
        APP_NAME,
        exe.display(),
        args.join(" ")
    ))
}

/// Register the app to start at login
#[cfg(not(target_os = "windows"))]
pub fn enable() -> Result<(), AutostartError> {
    let path = entry_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, entry_contents()?)?;
    Ok(())
}

/// Remove the login registration
#[cfg(not(target_os = "windows"))]
pub fn disable() -> Result<(), AutostartError> {
    let path = entry_path()?;
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(not(target_os = "windows"))]
pub fn is_enabled() -> bool {
    entry_path().map(|p| p.exists()).unwrap_or(false)
}

/// Enable or disable in one call
pub fn set_enabled(enabled: bool) -> Result<(), AutostartError> {
    if enabled {
        enable()
    } else {
        disable()
    }
}
