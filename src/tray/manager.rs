//! System tray manager
//!
//! Creates the tray icon with its "Open Lockdown" / "Quit" menu and keeps the
//! padlock in sync with the VPN status

use crate::vpn::ConnectionStatus;

use super::icon;

/// Tray menu actions
#[cfg_attr(not(any(windows, target_os = "macos")), allow(dead_code))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayMenuAction {
    Open,
    Quit,
}

#[cfg(any(windows, target_os = "macos"))]
mod native {
    use tray_icon::{
        menu::{Menu, MenuEvent, MenuId, MenuItem, PredefinedMenuItem},
        Icon, TrayIcon, TrayIconBuilder,
    };

    use super::{icon, ConnectionStatus, TrayMenuAction};

    /// System tray manager
    pub struct TrayManager {
        tray_icon: TrayIcon,
        open_id: MenuId,
        quit_id: MenuId,
        shown_status: Option<ConnectionStatus>,
    }

    fn build_icon(status: ConnectionStatus) -> anyhow::Result<Icon> {
        let img = icon::render_status_icon(status);
        Ok(Icon::from_rgba(img.into_raw(), icon::ICON_SIZE, icon::ICON_SIZE)?)
    }

    impl TrayManager {
        /// Create a new tray manager with the disconnected icon
        pub fn new() -> anyhow::Result<Self> {
            let menu = Menu::new();
            let open_item = MenuItem::new("Open Lockdown", true, None);
            let separator = PredefinedMenuItem::separator();
            let quit_item = MenuItem::new("Quit", true, None);

            menu.append(&open_item)?;
            menu.append(&separator)?;
            menu.append(&quit_item)?;

            let status = ConnectionStatus::Disconnected;
            let tray_icon = TrayIconBuilder::new()
                .with_menu(Box::new(menu))
                .with_tooltip(icon::tooltip(status))
                .with_icon(build_icon(status)?)
                .build()?;

            Ok(Self {
                tray_icon,
                open_id: open_item.id().clone(),
                quit_id: quit_item.id().clone(),
                shown_status: Some(status),
            })
        }

        /// Redraw the icon if the status changed
        pub fn update_status(&mut self, status: ConnectionStatus) {
            if self.shown_status == Some(status) {
                return;
            }
            match build_icon(status) {
                Ok(icon) => {
                    let _ = self.tray_icon.set_icon(Some(icon));
                    let _ = self.tray_icon.set_tooltip(Some(icon::tooltip(status)));
                    self.shown_status = Some(status);
                }
                Err(e) => tracing::warn!("Failed to build tray icon: {}", e),
            }
        }

        /// Check for menu events
        pub fn check_events(&self) -> Option<TrayMenuAction> {
            let event = MenuEvent::receiver().try_recv().ok()?;
            if event.id == self.quit_id {
                Some(TrayMenuAction::Quit)
            } else if event.id == self.open_id {
                Some(TrayMenuAction::Open)
            } else {
                None
            }
        }
    }
}

#[cfg(any(windows, target_os = "macos"))]
pub use native::TrayManager;

/// Without a native tray the popup window is the whole UI
#[cfg(not(any(windows, target_os = "macos")))]
pub struct TrayManager {
    _private: (),
}

#[cfg(not(any(windows, target_os = "macos")))]
impl TrayManager {
    pub fn new() -> anyhow::Result<Self> {
        Err(anyhow::anyhow!("System tray is not supported on this platform"))
    }

    pub fn update_status(&mut self, status: ConnectionStatus) {
        tracing::trace!("{}", icon::tooltip(status));
    }

    pub fn check_events(&self) -> Option<TrayMenuAction> {
        None
    }
}
